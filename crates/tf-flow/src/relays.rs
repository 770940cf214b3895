//! The relay list served by the `/nodes` endpoint.
//!
//! ```json
//! { "objects": [ { "circle": { "id": "relay-a", "coordinates": [51.5, -0.1], "bandwidth": 0.02 } } ] }
//! ```
//!
//! `coordinates` is `[lat, lng]`; `bandwidth` is the relay's share of the
//! network total for the selected date.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tf_core::GeoPoint;

use crate::FlowResult;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RelayDocument {
    pub objects: Vec<NodeObject>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeObject {
    pub circle: Circle,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Circle {
    pub id:          String,
    pub coordinates: [f64; 2],
    pub bandwidth:   f64,
}

/// One relay, ready for clustering.
#[derive(Clone, Debug, PartialEq)]
pub struct Relay {
    pub id:        String,
    pub position:  GeoPoint,
    pub bandwidth: f64,
}

impl RelayDocument {
    pub fn from_json_str(json: &str) -> FlowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> FlowResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Convert to [`Relay`]s.  Entries with an invalid coordinate or a
    /// negative or non-finite bandwidth are dropped with a warning.
    pub fn into_relays(self) -> Vec<Relay> {
        let total = self.objects.len();
        let relays: Vec<Relay> = self
            .objects
            .into_iter()
            .filter_map(|NodeObject { circle }| {
                let [lat, lng] = circle.coordinates;
                let position = GeoPoint::new(lat, lng);
                if !position.is_valid() || !circle.bandwidth.is_finite() || circle.bandwidth < 0.0 {
                    warn!(
                        id = %circle.id,
                        %position,
                        bandwidth = circle.bandwidth,
                        "dropping malformed relay"
                    );
                    return None;
                }
                Some(Relay { id: circle.id, position, bandwidth: circle.bandwidth })
            })
            .collect();
        debug!(total, kept = relays.len(), "relay document loaded");
        relays
    }
}
