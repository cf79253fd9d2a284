use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Removes the least-squares straight line from `signal`.
pub fn detrend(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let t_mean = (n - 1) as f64 / 2.0;
    let y_mean = signal.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var) = (0.0, 0.0);
    for (i, &y) in signal.iter().enumerate() {
        let dt = i as f64 - t_mean;
        cov += dt * (y - y_mean);
        var += dt * dt;
    }
    let slope = cov / var;
    signal
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - t_mean)))
        .collect()
}

/// Symmetric Hann window of length `n`.
pub fn hann(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..n)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
            .collect(),
    }
}

/// One-sided discrete Fourier spectrum of a real signal: bins `0..=n/2`.
pub fn rfft(signal: &[f64]) -> Vec<Complex<f64>> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);
    buffer.truncate(n / 2 + 1);
    buffer
}

/// Center frequency (Hz) of each [`rfft`] bin.
pub fn rfft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    (0..=n / 2)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}
