use std::collections::VecDeque;

use crate::estimation::domain::heart_rate_estimator::HeartRateEstimate;
use crate::estimation::domain::kalman_filter::ScalarKalmanFilter;
use crate::shared::estimator_config::{SmoothingConfig, SmoothingMode};

/// SNR-gated, recency-weighted smoothing of raw heart-rate estimates.
///
/// Only estimates that pass the gate enter the history. The output is a
/// weighted mean of the history with weights rising linearly from 1
/// (oldest) to 2 (newest). In [`SmoothingMode::Kalman`] every accepted
/// output is additionally passed through a scalar Kalman step. A rejected
/// estimate yields the most recent accepted raw value in either mode.
pub struct AdaptiveSmoother {
    config: SmoothingConfig,
    history: VecDeque<f64>,
    kalman: ScalarKalmanFilter,
}

impl AdaptiveSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        let kalman =
            ScalarKalmanFilter::new(config.kalman_process_noise, config.kalman_measurement_noise);
        Self {
            history: VecDeque::with_capacity(config.history_len.max(1)),
            config,
            kalman,
        }
    }

    /// Accepted raw values, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn kalman(&self) -> &ScalarKalmanFilter {
        &self.kalman
    }

    pub fn accepts(&self, estimate: &HeartRateEstimate) -> bool {
        let [low, high] = self.config.bpm_range;
        estimate.snr > self.config.min_snr && estimate.bpm > low && estimate.bpm < high
    }

    pub fn update(&mut self, estimate: HeartRateEstimate) -> f64 {
        if !self.accepts(&estimate) {
            return self.history.back().copied().unwrap_or(0.0);
        }

        if self.history.len() == self.config.history_len.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(estimate.bpm);

        let weighted = weighted_mean(&self.history);
        match self.config.mode {
            SmoothingMode::WeightedHistory => weighted,
            SmoothingMode::Kalman => self.kalman.step(weighted),
        }
    }
}

impl Default for AdaptiveSmoother {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}

fn weighted_mean(values: &VecDeque<f64>) -> f64 {
    let n = values.len();
    let weights: Vec<f64> = if n == 1 {
        vec![1.0]
    } else {
        (0..n).map(|i| 1.0 + i as f64 / (n - 1) as f64).collect()
    };
    let total: f64 = weights.iter().sum();
    values.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>() / total
}
