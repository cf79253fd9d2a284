use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;

/// Domain interface for face localization.
///
/// Reports at most one face per frame; when several are visible the
/// implementation picks which one to track. Implementations may be
/// stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceRegion>, Box<dyn std::error::Error>>;
}
