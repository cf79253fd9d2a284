use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;

/// Reports the same region for every frame.
///
/// Suits fixed-camera setups where the subject's position is known up front.
pub struct FixedFaceDetector {
    region: Option<FaceRegion>,
}

impl FixedFaceDetector {
    pub fn new(region: Option<FaceRegion>) -> Self {
        Self { region }
    }
}

impl FaceDetector for FixedFaceDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<FaceRegion>, Box<dyn std::error::Error>> {
        Ok(self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_configured_region_for_any_frame() {
        let region = FaceRegion::new(5, 6, 40, 50);
        let mut detector = FixedFaceDetector::new(Some(region));

        assert_eq!(detector.detect(&Frame::filled(10, 10, [0; 3], 0)).unwrap(), Some(region));
        assert_eq!(detector.detect(&Frame::filled(20, 20, [0; 3], 9)).unwrap(), Some(region));
    }

    #[test]
    fn test_none_never_detects() {
        let mut detector = FixedFaceDetector::new(None);
        assert_eq!(detector.detect(&Frame::filled(10, 10, [0; 3], 0)).unwrap(), None);
    }
}
