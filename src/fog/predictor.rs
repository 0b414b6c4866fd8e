//! Autoregressive entropy forecasting.
//!
//! The predictor holds an ordered history of window entropies and forecasts
//! the next window from the three most recent values; with fewer than three
//! recorded windows it falls back to a one-step linear model on the latest
//! value. Only the recent tail ever feeds the forecast, so the history is a
//! bounded ring.

use std::collections::VecDeque;

use crate::config::FogConfig;

/// Maximum number of window entropies retained.
const HISTORY_CAPACITY: usize = 32;

/// AR(3) forecaster with an AR(1) short-history fallback.
#[derive(Debug)]
pub struct EntropyPredictor {
    history: VecDeque<f64>,
    weights: [f64; 3],
    bias: f64,
    alpha: f64,
    beta: f64,
}

impl EntropyPredictor {
    pub fn new(config: &FogConfig) -> Self {
        EntropyPredictor {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            weights: config.ar3_weights,
            bias: config.ar3_bias,
            alpha: config.ar1_alpha,
            beta: config.ar1_beta,
        }
    }

    /// Append a window entropy to the history, popping the oldest entry if at
    /// capacity.
    pub fn record(&mut self, entropy: f64) {
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(entropy);
    }

    /// Forecast the next window entropy.
    ///
    /// With at least three recorded windows this is the weighted AR(3) model;
    /// otherwise the AR(1) fallback on the most recent value (or the bare
    /// intercept when nothing has been recorded yet).
    pub fn forecast(&self) -> f64 {
        let n = self.history.len();
        if n >= 3 {
            self.weights[0] * self.history[n - 1]
                + self.weights[1] * self.history[n - 2]
                + self.weights[2] * self.history[n - 3]
                + self.bias
        } else if n >= 1 {
            self.alpha * self.history[n - 1] + self.beta
        } else {
            self.beta
        }
    }

    /// Number of recorded window entropies.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
