use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame pixel coordinates.
///
/// Produced by a face detector for one frame; also used for the sampling
/// sub-regions derived from it. Serializes as `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A sub-region expressed as fractions of the enclosing face box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionFraction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub const FOREHEAD: RegionFraction = RegionFraction {
    x: 0.25,
    y: 0.10,
    width: 0.50,
    height: 0.20,
};

pub const LEFT_CHEEK: RegionFraction = RegionFraction {
    x: 0.10,
    y: 0.55,
    width: 0.20,
    height: 0.20,
};

pub const RIGHT_CHEEK: RegionFraction = RegionFraction {
    x: 0.70,
    y: 0.55,
    width: 0.20,
    height: 0.20,
};

/// Sampling layout in fusion order; the forehead comes first and doubles as
/// the reported ROI.
pub const SAMPLING_LAYOUT: [RegionFraction; 3] = [FOREHEAD, LEFT_CHEEK, RIGHT_CHEEK];

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Sub-region at the given fractions of this box, with each coordinate
    /// truncated toward zero. The result may extend outside the frame.
    pub fn sub_region(&self, fraction: RegionFraction) -> FaceRegion {
        let (x, y) = (self.x as f64, self.y as f64);
        let (w, h) = (self.width as f64, self.height as f64);
        FaceRegion {
            x: (x + w * fraction.x) as i32,
            y: (y + h * fraction.y) as i32,
            width: (w * fraction.width) as i32,
            height: (h * fraction.height) as i32,
        }
    }

    pub fn forehead(&self) -> FaceRegion {
        self.sub_region(FOREHEAD)
    }

    /// Intersection with a `frame_width` x `frame_height` frame, or `None`
    /// when nothing of the region lies inside it.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<FaceRegion> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(frame_width as i32);
        let y1 = self.y.saturating_add(self.height).min(frame_height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(FaceRegion::new(x0, y0, x1 - x0, y1 - y0))
    }
}

impl From<[i32; 4]> for FaceRegion {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<FaceRegion> for [i32; 4] {
    fn from(r: FaceRegion) -> Self {
        [r.x, r.y, r.width, r.height]
    }
}
