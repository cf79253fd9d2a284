//! Chrominance-based skin segmentation of a small RGB patch.
//!
//! Pixels are converted to YCrCb and kept when both chroma components fall
//! inside fixed bounds. A single erode-then-dilate pass with a 3x3 cross
//! removes isolated speckles before the mask is used for averaging.

use ndarray::{Array2, ArrayView3};

use crate::shared::estimator_config::SkinConfig;

/// Offsets of the 3x3 cross structuring element, center included.
const CROSS: [(isize, isize); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Chroma components `(cr, cb)` of an 8-bit RGB pixel, rounded and saturated.
pub fn chroma(r: u8, g: u8, b: u8) -> (u8, u8) {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.0;
    let cb = (b - y) * 0.564 + 128.0;
    (saturate(cr), saturate(cb))
}

fn saturate(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Skin mask for an `(height, width, 3)` RGB patch.
pub fn skin_mask(patch: &ArrayView3<'_, u8>, config: &SkinConfig) -> Array2<bool> {
    let (h, w, _) = patch.dim();
    let [cr_lo, cr_hi] = config.cr_range;
    let [cb_lo, cb_hi] = config.cb_range;

    let raw = Array2::from_shape_fn((h, w), |(y, x)| {
        let (cr, cb) = chroma(patch[[y, x, 0]], patch[[y, x, 1]], patch[[y, x, 2]]);
        (cr_lo..=cr_hi).contains(&cr) && (cb_lo..=cb_hi).contains(&cb)
    });
    dilate(&erode(&raw))
}

/// A pixel survives when every in-bounds cross neighbour is set.
pub fn erode(mask: &Array2<bool>) -> Array2<bool> {
    morph(mask, true)
}

/// A pixel is set when any in-bounds cross neighbour is set.
pub fn dilate(mask: &Array2<bool>) -> Array2<bool> {
    morph(mask, false)
}

fn morph(mask: &Array2<bool>, all: bool) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        let mut neighbours = CROSS.iter().filter_map(|&(dy, dx)| {
            let ny = y.checked_add_signed(dy)?;
            let nx = x.checked_add_signed(dx)?;
            mask.get((ny, nx)).copied()
        });
        if all {
            neighbours.all(|v| v)
        } else {
            neighbours.any(|v| v)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use rstest::rstest;

    fn patch(h: usize, w: usize, rgb: [u8; 3]) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 3), |(_, _, c)| rgb[c])
    }

    fn mask_from(rows: &[&str]) -> Array2<bool> {
        let h = rows.len();
        let w = rows[0].len();
        Array2::from_shape_fn((h, w), |(y, x)| rows[y].as_bytes()[x] == b'#')
    }

    // ── Chroma ────────────────────────────────────────────────────

    #[rstest]
    #[case::gray([128, 128, 128], (128, 128))]
    #[case::white([255, 255, 255], (128, 128))]
    #[case::pure_red([255, 0, 0], (255, 85))]
    #[case::pure_blue([0, 0, 255], (107, 255))]
    fn test_chroma(#[case] rgb: [u8; 3], #[case] expected: (u8, u8)) {
        assert_eq!(chroma(rgb[0], rgb[1], rgb[2]), expected);
    }

    #[test]
    fn test_typical_skin_tone_is_in_range() {
        let (cr, cb) = chroma(200, 150, 120);
        let config = SkinConfig::default();
        assert!((config.cr_range[0]..=config.cr_range[1]).contains(&cr));
        assert!((config.cb_range[0]..=config.cb_range[1]).contains(&cb));
    }

    // ── Mask ──────────────────────────────────────────────────────

    #[test]
    fn test_uniform_skin_patch_fully_masked() {
        let p = patch(6, 8, [200, 150, 120]);
        let mask = skin_mask(&p.view(), &SkinConfig::default());
        assert!(mask.iter().all(|&v| v));
    }

    #[test]
    fn test_gray_patch_not_masked() {
        let p = patch(6, 8, [128, 128, 128]);
        let mask = skin_mask(&p.view(), &SkinConfig::default());
        assert!(mask.iter().all(|&v| !v));
    }

    // ── Morphology ────────────────────────────────────────────────

    #[test]
    fn test_open_removes_speckle() {
        let mask = mask_from(&[".....", "..#..", "....."]);
        assert!(dilate(&erode(&mask)).iter().all(|&v| !v));
    }

    #[test]
    fn test_open_keeps_solid_block() {
        let mask = mask_from(&["#####", "#####", "#####", "#####"]);
        assert_eq!(dilate(&erode(&mask)), mask);
    }

    #[test]
    fn test_erode_ignores_out_of_bounds() {
        // Border pixels only see in-bounds neighbours.
        let mask = mask_from(&["###", "###"]);
        assert_eq!(erode(&mask), mask);
    }

    #[test]
    fn test_erode_cross_shape() {
        let mask = mask_from(&["####", "###.", "####"]);
        let expected = mask_from(&["###.", "##..", "###."]);
        assert_eq!(erode(&mask), expected);
    }

    #[test]
    fn test_dilate_cross_shape() {
        let mask = mask_from(&[".....", "..#..", "....."]);
        let expected = mask_from(&["..#..", ".###.", "..#.."]);
        assert_eq!(dilate(&mask), expected);
    }
}
