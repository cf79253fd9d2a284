use thiserror::Error;

use crate::sampling::domain::color_sample::ColorSample;
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("no sampling sub-region of face {face:?} overlaps the {width}x{height} frame")]
    NoUsableRegion {
        face: FaceRegion,
        width: u32,
        height: u32,
    },
}

/// Domain interface for turning a face region into one fused color sample.
///
/// Implementations are pure: the same frame and region always produce the
/// same sample.
pub trait RegionSampler: Send {
    fn sample(&self, frame: &Frame, face: &FaceRegion) -> Result<ColorSample, SamplingError>;
}
