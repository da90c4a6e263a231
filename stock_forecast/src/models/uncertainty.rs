//! Monte-Carlo prediction intervals
//!
//! Each sample path adds observation noise to every row. Rows past the end of
//! the history also accumulate a simulated trend: on every future day the
//! rate may change with the historical changepoint frequency, by a
//! Laplace-distributed amount scaled to the fitted rate changes.

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};

/// Sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySettings {
    pub samples: usize,
    pub interval_width: f64,
    /// Fixed seed for reproducible intervals; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for UncertaintySettings {
    fn default() -> Self {
        Self {
            samples: 1000,
            interval_width: 0.8,
            seed: None,
        }
    }
}

/// How the trend may move beyond the history, in scaled units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendUncertainty {
    /// Probability of a rate change on any one day
    pub change_probability: f64,
    /// Laplace scale of a rate change
    pub delta_scale: f64,
    /// Scaled time covered by one day
    pub dt_per_day: f64,
}

impl TrendUncertainty {
    /// No simulated rate changes; future rows only get observation noise
    pub fn none(dt_per_day: f64) -> Self {
        Self {
            change_probability: 0.0,
            delta_scale: 0.0,
            dt_per_day,
        }
    }
}

/// Lower and upper interval bounds per row, in the same scale as `yhat`.
///
/// `ts` are the scaled times of the rows (ascending); rows with `t > history_end`
/// receive trend simulation. `sigma` is the observation noise standard deviation.
pub fn simulate_bounds(
    yhat: &[f64],
    ts: &[f64],
    history_end: f64,
    sigma: f64,
    trend: &TrendUncertainty,
    settings: &UncertaintySettings,
) -> Result<Vec<(f64, f64)>> {
    if yhat.len() != ts.len() {
        return Err(ForecastError::InvalidInput(format!(
            "{} predictions for {} time points",
            yhat.len(),
            ts.len()
        )));
    }
    if !(settings.interval_width > 0.0 && settings.interval_width < 1.0) {
        return Err(ForecastError::InvalidInput(format!(
            "interval width must be in (0, 1), got {}",
            settings.interval_width
        )));
    }
    if settings.samples == 0 {
        return Ok(yhat.iter().map(|&y| (y, y)).collect());
    }

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let change_probability = trend.change_probability.clamp(0.0, 1.0);
    let simulate_trend = change_probability > 0.0 && trend.delta_scale > 0.0;

    let mut draws: Vec<Vec<f64>> = vec![Vec::with_capacity(settings.samples); yhat.len()];

    for _ in 0..settings.samples {
        let mut rate = 0.0;
        let mut deviation = 0.0;
        let mut clock = history_end;

        for (i, (&y, &t)) in yhat.iter().zip(ts).enumerate() {
            if simulate_trend && t > clock {
                let days = ((t - clock) / trend.dt_per_day).round().max(1.0) as usize;
                let step = (t - clock) / days as f64;
                for _ in 0..days {
                    deviation += rate * step;
                    if rng.gen_bool(change_probability) {
                        let a: f64 = rng.sample(Exp1);
                        let b: f64 = rng.sample(Exp1);
                        rate += trend.delta_scale * (a - b);
                    }
                }
                clock = t;
            }

            let z: f64 = rng.sample(StandardNormal);
            draws[i].push(y + deviation + sigma * z);
        }
    }

    let lower_q = (1.0 - settings.interval_width) / 2.0;
    let upper_q = (1.0 + settings.interval_width) / 2.0;

    Ok(draws
        .into_iter()
        .map(|row| {
            let mut data = Data::new(row);
            (data.quantile(lower_q), data.quantile(upper_q))
        })
        .collect())
}
