//! Piecewise-linear trend with rate changes at fixed changepoints
//!
//! Time is scaled so the history spans `[0, 1]`. The trend is
//! `g(t) = k + m·t + Σ δⱼ·max(t − cⱼ, 0)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseLinearTrend {
    pub intercept: f64,
    pub slope: f64,
    pub changepoints: Vec<f64>,
    pub deltas: Vec<f64>,
}

impl PiecewiseLinearTrend {
    pub fn value(&self, t: f64) -> f64 {
        let adjustments: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(c, d)| d * (t - c).max(0.0))
            .sum();
        self.intercept + self.slope * t + adjustments
    }

    /// Rate after the last changepoint
    pub fn final_slope(&self) -> f64 {
        self.slope + self.deltas.iter().sum::<f64>()
    }

    /// Mean absolute rate change, the scale of simulated future changes
    pub fn mean_abs_delta(&self) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.deltas.len() as f64
    }
}

/// Potential changepoints spread evenly over the first `range` share of the
/// observations (`ts` must be ascending). The first observation never hosts one.
pub fn changepoint_positions(ts: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (ts.len() as f64 * range).floor() as usize;
    if hist_size < 2 || n_changepoints == 0 {
        return Vec::new();
    }

    let n = n_changepoints.min(hist_size - 1);
    let step = (hist_size - 1) as f64 / n as f64;

    let mut positions: Vec<f64> = (1..=n)
        .map(|i| ts[((i as f64 * step).round() as usize).min(hist_size - 1)])
        .collect();
    positions.dedup();
    positions
}

/// Append the hinge column `max(t − c, 0)` for every changepoint
pub fn push_hinge_features(t: f64, changepoints: &[f64], out: &mut Vec<f64>) {
    out.extend(changepoints.iter().map(|c| (t - c).max(0.0)));
}
