//! `CumulativeDistribution` — weighted node sampling.
//!
//! # Layout
//!
//! Weights `w₀ … wₙ₋₁` are normalized by their total and stored as running
//! sums `c_i = (w₀ + … + w_i) / W`, with the tail pinned to exactly `1.0`.
//! A draw takes `u ∈ [0, 1)` and returns the first index with `c_i > u`
//! (`partition_point`, O(log n)).
//!
//! A zero-weight node has `c_i == c_{i-1}`, so no `u` can land on it: the
//! first index whose running sum exceeds `u` always carries positive weight.

use tf_core::{NodeId, SimRng};

use crate::{SimError, SimResult};

#[derive(Clone, Debug)]
pub struct CumulativeDistribution {
    /// Normalized running sums; last element is `1.0`.
    cumulative: Vec<f64>,
    /// Sum of the raw weights before normalization.
    raw_total: f64,
    /// Highest index with positive weight.  Fallback for `u` values that
    /// round onto the top boundary.
    last_positive: usize,
}

impl CumulativeDistribution {
    /// Build from raw weights.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `weights` is empty, contains a negative or
    /// non-finite weight, or sums to zero (no valid sampling distribution).
    pub fn new<I>(weights: I) -> SimResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let weights: Vec<f64> = weights.into_iter().collect();
        if weights.is_empty() {
            return Err(SimError::InvalidConfiguration("node set is empty".into()));
        }
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SimError::InvalidConfiguration(format!(
                "node {i} has invalid weight {w}"
            )));
        }

        let raw_total: f64 = weights.iter().sum();
        if raw_total == 0.0 {
            return Err(SimError::InvalidConfiguration(
                "total node weight is zero".into(),
            ));
        }
        if !raw_total.is_finite() {
            return Err(SimError::InvalidConfiguration(format!(
                "total node weight {raw_total} is not finite"
            )));
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / raw_total
            })
            .collect();
        // Exists because raw_total > 0.  Pinning the tail to exactly 1.0 keeps
        // rounding in the running sum from opening a gap in front of trailing
        // zero-weight nodes.
        let last_positive = weights
            .iter()
            .rposition(|w| *w > 0.0)
            .unwrap_or(cumulative.len() - 1);
        cumulative[last_positive..].fill(1.0);

        Ok(Self { cumulative, raw_total, last_positive })
    }

    /// Node for a uniform draw `u ∈ [0, 1)`.  Out-of-range `u` is clamped.
    #[inline]
    pub fn sample(&self, u: f64) -> NodeId {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let i = self.cumulative.partition_point(|&c| c <= u);
        NodeId(i.min(self.last_positive) as u32)
    }

    /// Draw a node using `rng`.
    #[inline]
    pub fn sample_with(&self, rng: &mut SimRng) -> NodeId {
        self.sample(rng.unit())
    }

    /// Normalized probability of `node`.
    pub fn probability(&self, node: NodeId) -> f64 {
        let i = node.index();
        match i {
            _ if i >= self.cumulative.len() => 0.0,
            0 => self.cumulative[0],
            _ => self.cumulative[i] - self.cumulative[i - 1],
        }
    }

    /// Sum of the raw input weights.
    pub fn raw_total(&self) -> f64 {
        self.raw_total
    }

    /// Sum of the normalized weights used for sampling (1 up to rounding).
    pub fn total(&self) -> f64 {
        (0..self.len()).map(|i| self.probability(NodeId(i as u32))).sum()
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}
