use ndarray::{s, ArrayView3};

use crate::sampling::domain::color_sample::ColorSample;
use crate::sampling::domain::region_sampler::{RegionSampler, SamplingError};
use crate::shared::estimator_config::SkinConfig;
use crate::shared::face_region::{FaceRegion, SAMPLING_LAYOUT};
use crate::shared::frame::Frame;

use super::skin_mask::skin_mask;

/// Samples forehead and both cheeks, averaging skin-masked pixels.
///
/// Each sub-region is derived from the full face box and then clipped to
/// the frame; sub-regions with nothing left are skipped. When the skin mask
/// covers too little of a sub-region its plain mean is used instead.
pub struct SkinRegionSampler {
    config: SkinConfig,
}

impl SkinRegionSampler {
    pub fn new(config: SkinConfig) -> Self {
        Self { config }
    }

    /// Mean `[r, g, b]` of one clipped sub-region.
    fn region_mean(&self, pixels: &ArrayView3<'_, u8>, region: FaceRegion) -> [f64; 3] {
        let (x, y) = (region.x as usize, region.y as usize);
        let (w, h) = (region.width as usize, region.height as usize);
        let patch = pixels.slice(s![y..y + h, x..x + w, ..]);
        let mask = skin_mask(&patch, &self.config);

        let total = w * h;
        let skin = mask.iter().filter(|&&v| v).count();
        let use_mask = skin > 0 && skin as f64 >= total as f64 * self.config.min_coverage;

        let mut sums = [0.0f64; 3];
        let mut count = 0usize;
        for ((py, px), &is_skin) in mask.indexed_iter() {
            if use_mask && !is_skin {
                continue;
            }
            for (c, sum) in sums.iter_mut().enumerate() {
                *sum += patch[[py, px, c]] as f64;
            }
            count += 1;
        }
        sums.map(|sum| sum / count as f64)
    }
}

impl Default for SkinRegionSampler {
    fn default() -> Self {
        Self::new(SkinConfig::default())
    }
}

impl RegionSampler for SkinRegionSampler {
    fn sample(&self, frame: &Frame, face: &FaceRegion) -> Result<ColorSample, SamplingError> {
        let pixels = frame.as_ndarray();
        let means: Vec<[f64; 3]> = SAMPLING_LAYOUT
            .iter()
            .filter_map(|&fraction| face.sub_region(fraction).clamp_to(frame.width(), frame.height()))
            .map(|region| self.region_mean(&pixels, region))
            .collect();

        if means.is_empty() {
            return Err(SamplingError::NoUsableRegion {
                face: *face,
                width: frame.width(),
                height: frame.height(),
            });
        }

        let n = means.len() as f64;
        let fused = means.iter().fold([0.0; 3], |acc, m| {
            [acc[0] + m[0], acc[1] + m[1], acc[2] + m[2]]
        });
        Ok(ColorSample::from_rgb(fused[0] / n, fused[1] / n, fused[2] / n))
    }
}
