use crate::estimation::domain::butterworth::BandPassFilter;
use crate::estimation::domain::spectrum::{detrend, hann, rfft, rfft_frequencies};
use crate::shared::estimator_config::HeartRateConfig;
use crate::shared::stats::argmax;

const POWER_EPSILON: f64 = 1e-12;

/// Raw spectral heart-rate estimate.
///
/// `snr` is a 0-100 score, not decibels. Both fields are zero when no
/// estimate could be made.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeartRateEstimate {
    pub bpm: f64,
    pub snr: f64,
}

/// Dominant-frequency heart rate from a pulse waveform.
pub struct HeartRateEstimator {
    config: HeartRateConfig,
}

impl HeartRateEstimator {
    pub fn new(config: HeartRateConfig) -> Self {
        Self { config }
    }

    /// Number of samples needed before an estimate is attempted.
    pub fn min_samples(&self, fps: f64) -> usize {
        (self.config.min_window_secs * fps) as usize
    }

    pub fn estimate(&self, pulse: &[f64], fps: f64) -> HeartRateEstimate {
        let n = pulse.len();
        if n == 0 || n < self.min_samples(fps) {
            return HeartRateEstimate::default();
        }

        let [low, high] = self.config.band_hz;
        let filtered = match BandPassFilter::butterworth(low, high, fps)
            .and_then(|filter| filter.filtfilt(&detrend(pulse)))
        {
            Ok(filtered) => filtered,
            Err(e) => {
                log::warn!("Heart-rate band-pass unavailable at {fps:.1} fps: {e}");
                return HeartRateEstimate::default();
            }
        };
        if filtered.iter().any(|v| !v.is_finite()) {
            return HeartRateEstimate::default();
        }

        let windowed: Vec<f64> = filtered.iter().zip(hann(n)).map(|(v, w)| v * w).collect();
        let power: Vec<f64> = rfft(&windowed).iter().map(|c| c.norm_sqr()).collect();
        let freqs = rfft_frequencies(n, fps);

        let (band_freqs, band_power): (Vec<f64>, Vec<f64>) = freqs
            .iter()
            .zip(&power)
            .filter(|(&f, _)| f >= low && f <= high)
            .map(|(&f, &p)| (f, p))
            .unzip();
        let Some(peak) = argmax(&band_power) else {
            return HeartRateEstimate::default();
        };
        let peak_freq = band_freqs[peak];

        let (mut signal, mut noise) = (0.0, 0.0);
        for (&f, &p) in band_freqs.iter().zip(&band_power) {
            if (f - peak_freq).abs() <= self.config.peak_half_width_hz {
                signal += p;
            } else {
                noise += p;
            }
        }

        HeartRateEstimate {
            bpm: peak_freq * 60.0,
            snr: snr_score((signal + POWER_EPSILON) / (noise + POWER_EPSILON)),
        }
    }
}

impl Default for HeartRateEstimator {
    fn default() -> Self {
        Self::new(HeartRateConfig::default())
    }
}

/// Maps a signal/noise power ratio onto 0-100: -5 dB and below scores 0,
/// +10 dB and above scores 100.
pub fn snr_score(power_ratio: f64) -> f64 {
    let db = 10.0 * power_ratio.log10();
    if db.is_nan() {
        return 0.0;
    }
    ((db + 5.0) / 15.0 * 100.0).clamp(0.0, 100.0)
}
