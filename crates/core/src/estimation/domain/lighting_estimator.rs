use crate::shared::stats::{mean, std_dev};

const MIN_MEAN_LUMINANCE: f64 = 1e-6;

/// Lighting stability score in `[0, 100]` from the luminance history.
///
/// Needs at least one second of samples; steadier illumination (lower
/// coefficient of variation) scores higher.
pub fn lighting_score(luminance: &[f64], fps: f64) -> f64 {
    if luminance.is_empty() || luminance.len() < fps as usize {
        return 0.0;
    }
    let Some(mu) = mean(luminance) else {
        return 0.0;
    };
    if mu <= MIN_MEAN_LUMINANCE {
        return 0.0;
    }
    let cv = std_dev(luminance) / mu;
    if !cv.is_finite() {
        return 0.0;
    }
    (100.0 - cv * 300.0).clamp(0.0, 100.0)
}
