use crate::shared::constants::SPO2_PLACEHOLDER;
use crate::shared::estimator_config::Spo2Config;
use crate::shared::stats::{mean, std_dev};

const MIN_SPO2: f64 = 85.0;
const MAX_SPO2: f64 = 100.0;

/// Ratio-of-ratios oxygen saturation heuristic over raw red and blue means.
///
/// Uncalibrated: the output is an indicative percentage, not a clinical
/// pulse-oximetry reading.
pub struct Spo2Estimator {
    config: Spo2Config,
}

impl Spo2Estimator {
    pub fn new(config: Spo2Config) -> Self {
        Self { config }
    }

    pub fn estimate(&self, red: &[f64], blue: &[f64]) -> f64 {
        if red.len() < self.config.min_samples {
            return SPO2_PLACEHOLDER;
        }
        let (Some(red_mean), Some(blue_mean)) = (mean(red), mean(blue)) else {
            return SPO2_PLACEHOLDER;
        };
        if red_mean == 0.0 || blue_mean == 0.0 {
            return 0.0;
        }

        let red_ac = std_dev(red) / red_mean;
        let blue_ac = std_dev(blue) / blue_mean;
        let ratio = red_ac / blue_ac;
        if !ratio.is_finite() {
            return SPO2_PLACEHOLDER;
        }
        (104.0 - 17.0 * ratio).clamp(MIN_SPO2, MAX_SPO2)
    }
}

impl Default for Spo2Estimator {
    fn default() -> Self {
        Self::new(Spo2Config::default())
    }
}
