use crate::estimation::domain::butterworth::BandPassFilter;
use crate::estimation::domain::spectrum::{detrend, rfft, rfft_frequencies};
use crate::shared::constants::RESPIRATION_PLACEHOLDER;
use crate::shared::estimator_config::RespirationConfig;
use crate::shared::stats::argmax;

/// Breaths per minute from slow intensity modulation of the green channel.
pub struct RespirationEstimator {
    config: RespirationConfig,
}

impl RespirationEstimator {
    pub fn new(config: RespirationConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, green: &[f64], fps: f64) -> f64 {
        if green.len() < (self.config.min_window_secs * fps) as usize {
            return RESPIRATION_PLACEHOLDER;
        }
        let window = (green.len() as f64).min((self.config.max_window_secs * fps).max(1.0)) as usize;
        let recent = &green[green.len() - window..];

        let [low, high] = self.config.band_hz;
        let filtered = match BandPassFilter::butterworth(low, high, fps)
            .and_then(|filter| filter.filtfilt(&detrend(recent)))
        {
            Ok(filtered) => filtered,
            Err(e) => {
                log::debug!("Respiration band-pass unavailable: {e}");
                return RESPIRATION_PLACEHOLDER;
            }
        };

        let magnitudes: Vec<f64> = rfft(&filtered).iter().skip(1).map(|c| c.norm()).collect();
        let freqs = rfft_frequencies(filtered.len(), fps);
        match argmax(&magnitudes) {
            Some(peak) => freqs[peak + 1] * 60.0,
            None => 0.0,
        }
    }
}

impl Default for RespirationEstimator {
    fn default() -> Self {
        Self::new(RespirationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn breathing(n: usize, hz: f64, fps: f64) -> Vec<f64> {
        (0..n)
            .map(|i| 120.0 + 0.8 * (2.0 * PI * hz * i as f64 / fps).sin())
            .collect()
    }

    #[test]
    fn test_short_window_returns_placeholder() {
        let estimator = RespirationEstimator::default();
        assert_eq!(estimator.estimate(&breathing(299, 0.25, 30.0), 30.0), 16.0);
    }

    #[test]
    fn test_recovers_breathing_rate() {
        // 20 s at 30 fps: bins are 0.05 Hz apart, 0.25 Hz lands on bin 5.
        let estimator = RespirationEstimator::default();
        let rate = estimator.estimate(&breathing(600, 0.25, 30.0), 30.0);
        assert_relative_eq!(rate, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uses_only_most_recent_window() {
        // The first 300 samples breathe at 0.4 Hz, the last 600 at 0.2 Hz.
        let estimator = RespirationEstimator::default();
        let mut green = breathing(300, 0.4, 30.0);
        green.extend(breathing(600, 0.2, 30.0));
        let rate = estimator.estimate(&green, 30.0);
        assert_relative_eq!(rate, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_filter_failure_returns_placeholder() {
        // At 0.8 fps the 0.5 Hz upper edge lies above Nyquist.
        let estimator = RespirationEstimator::default();
        assert_eq!(estimator.estimate(&breathing(40, 0.1, 0.8), 0.8), 16.0);
    }

    #[test]
    fn test_flat_signal_is_finite() {
        let estimator = RespirationEstimator::default();
        let rate = estimator.estimate(&[90.0; 400], 30.0);
        assert!(rate.is_finite());
    }
}
