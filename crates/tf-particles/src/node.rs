//! Weighted source nodes.

use tf_core::GeoPoint;

/// A geographic point carrying its share of total bandwidth.
///
/// Across one node set the weights sum to 1.  A node set is immutable once
/// handed to a simulation; a new cluster generation builds a new simulation.
///
/// With the `serde` feature this deserializes the upstream wire shape
/// `{ "bandwidth": 0.25, "latLng": { "lat": .., "lng": .. } }`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedNode {
    #[cfg_attr(feature = "serde", serde(rename = "latLng"))]
    pub position: GeoPoint,

    #[cfg_attr(feature = "serde", serde(rename = "bandwidth", alias = "weight"))]
    pub weight: f64,
}

impl WeightedNode {
    #[inline]
    pub fn new(position: GeoPoint, weight: f64) -> Self {
        Self { position, weight }
    }

    /// `true` if the position is a valid coordinate and the weight a finite,
    /// non-negative number.
    pub fn is_valid(&self) -> bool {
        self.position.is_valid() && self.weight.is_finite() && self.weight >= 0.0
    }
}
