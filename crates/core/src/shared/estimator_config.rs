use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_FPS, HEART_RATE_HISTORY_LEN, MAX_FRAME_WIDTH,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every empirical constant of the estimation pipeline.
///
/// Missing keys in a config file fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Samples retained per color channel.
    pub buffer_size: usize,
    pub max_frame_width: u32,
    pub skin: SkinConfig,
    pub heart_rate: HeartRateConfig,
    pub smoothing: SmoothingConfig,
    pub respiration: RespirationConfig,
    pub quality: QualityThresholds,
    pub spo2: Spo2Config,
    pub frame_rate: FrameRateConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_frame_width: MAX_FRAME_WIDTH,
            skin: SkinConfig::default(),
            heart_rate: HeartRateConfig::default(),
            smoothing: SmoothingConfig::default(),
            respiration: RespirationConfig::default(),
            quality: QualityThresholds::default(),
            spo2: Spo2Config::default(),
            frame_rate: FrameRateConfig::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Chroma bounds (inclusive) of the skin segmentation in YCrCb space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinConfig {
    pub cr_range: [u8; 2],
    pub cb_range: [u8; 2],
    /// Below this mask coverage the unmasked region mean is used instead.
    pub min_coverage: f64,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            cr_range: [133, 173],
            cb_range: [77, 127],
            min_coverage: 0.10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateConfig {
    pub band_hz: [f64; 2],
    pub min_window_secs: f64,
    /// Spectral power within this distance of the peak counts as signal.
    pub peak_half_width_hz: f64,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            band_hz: [0.7, 4.0],
            min_window_secs: 6.0,
            peak_half_width_hz: 0.2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    #[default]
    WeightedHistory,
    /// Weighted history followed by a scalar Kalman step.
    Kalman,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub mode: SmoothingMode,
    pub history_len: usize,
    /// Estimates are accepted only when their SNR score exceeds this.
    pub min_snr: f64,
    /// Exclusive BPM bounds for accepted estimates.
    pub bpm_range: [f64; 2],
    pub kalman_process_noise: f64,
    pub kalman_measurement_noise: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            mode: SmoothingMode::WeightedHistory,
            history_len: HEART_RATE_HISTORY_LEN,
            min_snr: 8.0,
            bpm_range: [40.0, 200.0],
            kalman_process_noise: 1e-4,
            kalman_measurement_noise: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespirationConfig {
    pub band_hz: [f64; 2],
    pub min_window_secs: f64,
    pub max_window_secs: f64,
}

impl Default for RespirationConfig {
    fn default() -> Self {
        Self {
            band_hz: [0.1, 0.5],
            min_window_secs: 10.0,
            max_window_secs: 20.0,
        }
    }
}

/// SNR score thresholds for the quality label (both exclusive).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub good: f64,
    pub fair: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            good: 20.0,
            fair: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spo2Config {
    pub min_samples: usize,
}

impl Default for Spo2Config {
    fn default() -> Self {
        Self { min_samples: 30 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameRateConfig {
    pub initial_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    /// Weight of the newest instantaneous rate in the moving average.
    pub smoothing: f64,
}

impl Default for FrameRateConfig {
    fn default() -> Self {
        Self {
            initial_fps: DEFAULT_FPS,
            min_fps: 5.0,
            max_fps: 60.0,
            smoothing: 0.1,
        }
    }
}
