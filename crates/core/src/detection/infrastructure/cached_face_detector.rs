use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;

pub type DetectionCache = HashMap<usize, Option<FaceRegion>>;

/// Replays pre-computed detection results by frame index.
///
/// Used when faces were located by an earlier pass (or an external tool):
/// the estimation run sees exactly those regions. Frames missing from the
/// cache have no face.
pub struct CachedFaceDetector {
    cache: Arc<DetectionCache>,
}

impl CachedFaceDetector {
    pub fn new(cache: Arc<DetectionCache>) -> Self {
        Self { cache }
    }

    /// Loads a cache from JSON of the form `{"0": [x, y, w, h], "1": null}`.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        let cache: DetectionCache = serde_json::from_str(&json)?;
        Ok(Self::new(Arc::new(cache)))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl FaceDetector for CachedFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceRegion>, Box<dyn std::error::Error>> {
        Ok(self.cache.get(&frame.index()).copied().flatten())
    }
}
