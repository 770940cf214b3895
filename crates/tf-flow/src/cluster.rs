//! Relay clusters and the per-zoom cluster index.
//!
//! The map merges nearby relays into clusters, and the merge differs per zoom
//! level.  [`ClusterIndex`] records one cluster list per zoom so a new
//! simulation can be built for whatever zoom the map settles on.

use std::collections::BTreeMap;

use tracing::debug;

use tf_core::{GeoPoint, MapProjection, Viewport, Zoom};
use tf_particles::WeightedNode;

use crate::{FlowError, FlowResult, Relay};

/// Icon radius of a cluster with no bandwidth, in pixels.
pub const MIN_RADIUS: f64 = 15.0;
/// Icon radius of a cluster carrying all of the network's bandwidth.
pub const MAX_RADIUS: f64 = 30.0;

// ── Cluster ───────────────────────────────────────────────────────────────────

/// A group of relays drawn as one marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub position: GeoPoint,
    pub relays:   Vec<Relay>,
}

impl Cluster {
    pub fn new(position: GeoPoint, relays: Vec<Relay>) -> Self {
        Self { position, relays }
    }

    /// A cluster at the mean position of `relays`.  `None` if empty.
    pub fn from_relays(relays: Vec<Relay>) -> Option<Self> {
        if relays.is_empty() {
            return None;
        }
        let n = relays.len() as f64;
        let (lat, lng) = relays
            .iter()
            .fold((0.0, 0.0), |(lat, lng), r| (lat + r.position.lat, lng + r.position.lng));
        Some(Self::new(GeoPoint::new(lat / n, lng / n), relays))
    }

    /// Sum of member bandwidths.
    pub fn bandwidth(&self) -> f64 {
        self.relays.iter().map(|r| r.bandwidth).sum()
    }

    /// Marker size: `MIN_RADIUS` plus the bandwidth share of the remaining
    /// range, capped at `MAX_RADIUS`.
    pub fn icon_radius(&self) -> f64 {
        let share = self.bandwidth().clamp(0.0, 1.0);
        MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * share
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }
}

// ── ClusterIndex ──────────────────────────────────────────────────────────────

/// Zoom level → cluster list, for every zoom in `min ..= max`.
#[derive(Clone, Debug)]
pub struct ClusterIndex {
    min_zoom: Zoom,
    max_zoom: Zoom,
    /// `by_zoom[z - min_zoom]`.
    by_zoom:  Vec<Vec<Cluster>>,
}

impl ClusterIndex {
    /// An index with an empty list for each zoom in `min ..= max`
    /// (`min > max` is swapped).
    pub fn new(min: Zoom, max: Zoom) -> Self {
        let (min, max) = (min.min(max), max.max(min));
        Self {
            min_zoom: min,
            max_zoom: max,
            by_zoom:  vec![Vec::new(); usize::from(max.0 - min.0) + 1],
        }
    }

    /// Cluster `relays` at every zoom by bucketing them into square cells of
    /// `cell_px` world pixels.
    ///
    /// Relays sharing a cell become one cluster at the cell members' mean
    /// position.  Cells grow in geographic size as the zoom decreases, so low
    /// zooms yield few large clusters and high zooms approach one cluster
    /// per relay.
    ///
    /// # Errors
    ///
    /// `Core(Config)` if `cell_px` is not a positive finite number.
    pub fn from_grid(relays: &[Relay], min: Zoom, max: Zoom, cell_px: f64) -> FlowResult<Self> {
        if !(cell_px.is_finite() && cell_px > 0.0) {
            return Err(FlowError::Core(tf_core::CoreError::Config(format!(
                "cluster cell size must be finite and > 0, got {cell_px}"
            ))));
        }
        let mut index = Self::new(min, max);
        for z in index.min_zoom.0..=index.max_zoom.0 {
            let zoom = Zoom(z);
            // A zero-sized viewport on (0, 0) yields world pixels relative
            // to the world centre.
            let world = Viewport::new(GeoPoint::new(0.0, 0.0), zoom, 0.0, 0.0);
            let mut cells: BTreeMap<(i64, i64), Vec<Relay>> = BTreeMap::new();
            for relay in relays {
                let Some(px) = world.project(relay.position) else {
                    continue;
                };
                let cell = ((px.x / cell_px).floor() as i64, (px.y / cell_px).floor() as i64);
                cells.entry(cell).or_default().push(relay.clone());
            }
            let clusters: Vec<Cluster> = cells.into_values().filter_map(Cluster::from_relays).collect();
            debug!(%zoom, relays = relays.len(), clusters = clusters.len(), "grid clustering");
            index.replace(zoom, clusters)?;
        }
        Ok(index)
    }

    pub fn min_zoom(&self) -> Zoom {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> Zoom {
        self.max_zoom
    }

    fn slot(&self, zoom: Zoom) -> FlowResult<usize> {
        if zoom < self.min_zoom || zoom > self.max_zoom {
            return Err(FlowError::ZoomOutOfRange { zoom, min: self.min_zoom, max: self.max_zoom });
        }
        Ok(usize::from(zoom.0 - self.min_zoom.0))
    }

    /// Record one more cluster at `zoom`.
    pub fn push(&mut self, zoom: Zoom, cluster: Cluster) -> FlowResult<()> {
        let i = self.slot(zoom)?;
        self.by_zoom[i].push(cluster);
        Ok(())
    }

    /// Replace the whole cluster list at `zoom`.
    pub fn replace(&mut self, zoom: Zoom, clusters: Vec<Cluster>) -> FlowResult<()> {
        let i = self.slot(zoom)?;
        self.by_zoom[i] = clusters;
        Ok(())
    }

    /// Clusters recorded at `zoom` (empty outside the range).
    pub fn clusters(&self, zoom: Zoom) -> &[Cluster] {
        match self.slot(zoom) {
            Ok(i) => &self.by_zoom[i],
            Err(_) => &[],
        }
    }

    /// One node per cluster at `zoom`, weighted by the cluster's share of the
    /// zoom's total bandwidth.
    ///
    /// # Errors
    ///
    /// `ZoomOutOfRange`, `NoClusters` if nothing was recorded at `zoom`, or
    /// `ZeroBandwidth` if the clusters' bandwidths sum to zero.
    pub fn weighted_nodes(&self, zoom: Zoom) -> FlowResult<Vec<WeightedNode>> {
        let clusters = &self.by_zoom[self.slot(zoom)?];
        if clusters.is_empty() {
            return Err(FlowError::NoClusters(zoom));
        }
        let bandwidths: Vec<f64> = clusters.iter().map(Cluster::bandwidth).collect();
        let total: f64 = bandwidths.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(FlowError::ZeroBandwidth(zoom));
        }
        Ok(clusters
            .iter()
            .zip(bandwidths)
            .map(|(c, bw)| WeightedNode::new(c.position, bw / total))
            .collect())
    }
}
