use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::estimator_config::QualityThresholds;
use crate::shared::face_region::FaceRegion;

/// Quality label attached to every result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalQuality {
    #[serde(rename = "No Face")]
    NoFace,
    #[serde(rename = "ROI Error")]
    RoiError,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    /// Buckets an SNR score; both thresholds are exclusive.
    pub fn from_snr(snr: f64, thresholds: &QualityThresholds) -> Self {
        if snr > thresholds.good {
            Self::Good
        } else if snr > thresholds.fair {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFace => "No Face",
            Self::RoiError => "ROI Error",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame output record.
///
/// All numeric fields are rounded to one decimal. `roi` is the forehead
/// sampling box and is absent when no face was located.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsResult {
    pub bpm: f64,
    pub spo2: f64,
    #[serde(alias = "resp_rate")]
    pub respiration_rate: f64,
    pub snr: f64,
    pub lighting: f64,
    pub quality: SignalQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<FaceRegion>,
}

impl VitalsResult {
    pub fn no_face() -> Self {
        Self::sentinel(SignalQuality::NoFace, None)
    }

    pub fn roi_error(roi: FaceRegion) -> Self {
        Self::sentinel(SignalQuality::RoiError, Some(roi))
    }

    fn sentinel(quality: SignalQuality, roi: Option<FaceRegion>) -> Self {
        Self {
            bpm: 0.0,
            spo2: 0.0,
            respiration_rate: 0.0,
            snr: 0.0,
            lighting: 0.0,
            quality,
            roi,
        }
    }

    /// Rounds every numeric field to one decimal, mapping non-finite
    /// values to zero.
    pub fn rounded(self) -> Self {
        Self {
            bpm: round1(self.bpm),
            spo2: round1(self.spo2),
            respiration_rate: round1(self.respiration_rate),
            snr: round1(self.snr),
            lighting: round1(self.lighting),
            ..self
        }
    }
}

fn round1(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10.0).round() / 10.0
    } else {
        0.0
    }
}
