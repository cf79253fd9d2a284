//! Plane-Orthogonal-to-Skin pulse extraction.
//!
//! Projects temporally normalized RGB traces onto two chrominance axes
//! orthogonal to the skin tone and combines them with a data-driven
//! weight, leaving the pulsatile component.

use ndarray::ArrayView1;

use crate::shared::stats::{mean, std_dev};

/// Pulse waveform from the full current window of red, green and blue means.
///
/// The output always has the input length. When any channel mean is zero
/// (or the window is empty) the normalization is undefined and an all-zero
/// signal is returned instead.
pub fn project(red: &[f64], green: &[f64], blue: &[f64]) -> Vec<f64> {
    let n = red.len();
    debug_assert!(green.len() == n && blue.len() == n, "channel lengths differ");

    let (Some(r_mean), Some(g_mean), Some(b_mean)) = (mean(red), mean(green), mean(blue)) else {
        return vec![0.0; n];
    };
    if r_mean == 0.0 || g_mean == 0.0 || b_mean == 0.0 {
        return vec![0.0; n];
    }

    let rn = ArrayView1::from(red).mapv(|v| v / r_mean);
    let gn = ArrayView1::from(green).mapv(|v| v / g_mean);
    let bn = ArrayView1::from(blue).mapv(|v| v / b_mean);

    let s1 = &gn - &bn;
    let s2 = &gn + &bn - &rn * 2.0;

    let std_s2 = std_dev(s2.as_slice().unwrap_or_default());
    let alpha = if std_s2 == 0.0 {
        0.0
    } else {
        std_dev(s1.as_slice().unwrap_or_default()) / std_s2
    };

    let h = s1 + s2 * alpha;
    if h.iter().all(|v| v.is_finite()) {
        h.to_vec()
    } else {
        vec![0.0; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::PI;

    fn sine(n: usize, base: f64, amp: f64, hz: f64, fps: f64) -> Vec<f64> {
        (0..n)
            .map(|i| base + amp * (2.0 * PI * hz * i as f64 / fps).sin())
            .collect()
    }

    #[test]
    fn test_output_length_matches_input() {
        let r = sine(120, 150.0, 1.0, 1.2, 30.0);
        let g = sine(120, 120.0, 3.0, 1.2, 30.0);
        let b = sine(120, 100.0, 0.5, 1.2, 30.0);
        assert_eq!(project(&r, &g, &b).len(), 120);
    }

    #[rstest]
    #[case::red(0)]
    #[case::green(1)]
    #[case::blue(2)]
    fn test_zero_mean_channel_gives_zero_signal(#[case] zero_channel: usize) {
        let mut channels = [vec![100.0; 50], vec![100.0; 50], vec![100.0; 50]];
        channels[zero_channel] = vec![0.0; 50];
        let h = project(&channels[0], &channels[1], &channels[2]);
        assert_eq!(h, vec![0.0; 50]);
    }

    #[test]
    fn test_empty_window() {
        assert!(project(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_constant_channels_give_flat_signal() {
        // s1 and s2 are identically zero, so alpha falls back to 0.
        let h = project(&[80.0; 40], &[90.0; 40], &[70.0; 40]);
        for v in h {
            assert_relative_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_recovers_pulse_frequency_shape() {
        let n = 300;
        let r = sine(n, 170.0, 2.0, 1.2, 30.0);
        let g = sine(n, 120.0, 6.0, 1.2, 30.0);
        let b = sine(n, 100.0, 2.0, 1.2, 30.0);
        let h = project(&r, &g, &b);

        // In-phase components add up: the pulse tracks the injected sine.
        let reference = sine(n, 0.0, 1.0, 1.2, 30.0);
        let dot: f64 = h.iter().zip(&reference).map(|(a, b)| a * b).sum();
        assert!(dot > 0.0);
        let peak = h.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > 0.04);
    }
}
