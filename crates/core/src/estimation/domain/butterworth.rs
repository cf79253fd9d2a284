//! Butterworth band-pass design and zero-phase (forward-backward) filtering.
//!
//! The design follows the classic analog route: normalized low-pass
//! prototype, low-pass to band-pass transform, then the bilinear transform
//! with frequency pre-warping. Coefficients are returned in transfer
//! function form with `a[0] == 1`.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use thiserror::Error;

/// Prototype order. The band-pass transform doubles it.
const PROTOTYPE_ORDER: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("band {low}-{high} Hz does not fit inside (0, {nyquist}) Hz")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },
    #[error("signal of {len} samples is too short for zero-phase filtering (need more than {required})")]
    SignalTooShort { len: usize, required: usize },
    #[error("filter initial conditions are singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandPassFilter {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl BandPassFilter {
    /// Second-order Butterworth band-pass between `low_hz` and `high_hz`.
    pub fn butterworth(low_hz: f64, high_hz: f64, sample_rate: f64) -> Result<Self, FilterError> {
        let nyquist = sample_rate / 2.0;
        let valid = low_hz.is_finite()
            && high_hz.is_finite()
            && sample_rate.is_finite()
            && low_hz > 0.0
            && low_hz < high_hz
            && high_hz < nyquist;
        if !valid {
            return Err(FilterError::InvalidBand {
                low: low_hz,
                high: high_hz,
                nyquist,
            });
        }

        let fs2 = 2.0 * sample_rate;
        let w_low = fs2 * (PI * low_hz / sample_rate).tan();
        let w_high = fs2 * (PI * high_hz / sample_rate).tan();
        let bandwidth = w_high - w_low;
        let center_sq = w_low * w_high;

        let order = PROTOTYPE_ORDER as f64;
        let prototype = (0..PROTOTYPE_ORDER).map(|k| {
            let m = 1.0 - order + 2.0 * k as f64;
            -Complex::from_polar(1.0, PI * m / (2.0 * order))
        });

        // Each prototype pole splits into a pair of band-pass poles.
        let mut analog_poles = Vec::with_capacity(2 * PROTOTYPE_ORDER);
        for p in prototype {
            let scaled = p * (bandwidth / 2.0);
            let root = (scaled * scaled - center_sq).sqrt();
            analog_poles.push(scaled + root);
            analog_poles.push(scaled - root);
        }
        let analog_gain = bandwidth.powi(PROTOTYPE_ORDER as i32);

        // Bilinear transform: the band-pass zeros at s = 0 land on z = 1,
        // the ones at infinity on z = -1.
        let fs2c = Complex::new(fs2, 0.0);
        let poles: Vec<Complex<f64>> = analog_poles
            .iter()
            .map(|&p| (fs2c + p) / (fs2c - p))
            .collect();
        let mut zeros = vec![Complex::new(1.0, 0.0); PROTOTYPE_ORDER];
        zeros.extend(std::iter::repeat(Complex::new(-1.0, 0.0)).take(PROTOTYPE_ORDER));

        let denominator: Complex<f64> = analog_poles.iter().map(|&p| fs2c - p).product();
        let gain = analog_gain * (fs2c.powu(PROTOTYPE_ORDER as u32) / denominator).re;

        let b = poly(&zeros).into_iter().map(|c| gain * c.re).collect();
        let a = poly(&poles).into_iter().map(|c| c.re).collect();
        Ok(Self { b, a })
    }

    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// Samples of odd extension added at each end before filtering.
    pub fn pad_len(&self) -> usize {
        3 * self.a.len().max(self.b.len())
    }

    /// Forward-backward filtering with odd edge extension and steady-state
    /// initial conditions, cancelling the filter's phase delay.
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
        let pad = self.pad_len();
        if signal.len() <= pad {
            return Err(FilterError::SignalTooShort {
                len: signal.len(),
                required: pad,
            });
        }

        let zi = self.steady_state()?;
        let extended = odd_extend(signal, pad);

        let forward = self.lfilter(&extended, &scaled(&zi, extended[0]));
        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        let y0 = reversed[0];
        reversed = self.lfilter(&reversed, &scaled(&zi, y0));
        reversed.reverse();

        Ok(reversed[pad..reversed.len() - pad].to_vec())
    }

    /// Direct form II transposed, starting from state `zi`.
    fn lfilter(&self, x: &[f64], zi: &[f64]) -> Vec<f64> {
        let order = self.a.len() - 1;
        let mut z = zi.to_vec();
        let mut y = Vec::with_capacity(x.len());
        for &xn in x {
            let yn = self.b[0] * xn + z[0];
            for i in 0..order - 1 {
                z[i] = self.b[i + 1] * xn + z[i + 1] - self.a[i + 1] * yn;
            }
            z[order - 1] = self.b[order] * xn - self.a[order] * yn;
            y.push(yn);
        }
        y
    }

    /// Filter state for a unit step input already in steady state.
    fn steady_state(&self) -> Result<Vec<f64>, FilterError> {
        let m = self.a.len() - 1;
        let mut matrix = vec![vec![0.0; m]; m];
        let mut rhs = vec![0.0; m];
        for i in 0..m {
            matrix[i][i] = 1.0;
            matrix[i][0] += self.a[i + 1];
            if i + 1 < m {
                matrix[i][i + 1] -= 1.0;
            }
            rhs[i] = self.b[i + 1] - self.a[i + 1] * self.b[0];
        }
        solve(matrix, rhs).ok_or(FilterError::Singular)
    }
}

/// Monic polynomial coefficients (highest power first) with the given roots.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs
}

fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let (first, last) = (x[0], x[n - 1]);
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    out
}

fn scaled(v: &[f64], k: f64) -> Vec<f64> {
    v.iter().map(|x| x * k).collect()
}

/// Gaussian elimination with partial pivoting.
fn solve(mut m: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot][col].abs() < 1e-300 {
            return None;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);
        for row in col + 1..n {
            let factor = m[row][col] / m[col][col];
            for k in col..n {
                m[row][k] -= factor * m[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| m[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / m[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
