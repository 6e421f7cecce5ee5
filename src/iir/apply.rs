//! Filter Application
//!
//! Runs a transfer function over a signal in Direct Form II Transposed and
//! implements zero-phase forward-backward filtering with odd extension and
//! steady-state initial conditions.

use super::design::TransferFunction;
use crate::error::{FilterError, Result};
use nalgebra::{DMatrix, DVector};

/// Direct Form II Transposed filter with its delay line
#[derive(Debug, Clone)]
pub struct DirectFormFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    state: Vec<f64>,
}

impl DirectFormFilter {
    /// Build from normalized coefficients (`a[0] == 1`); the shorter
    /// polynomial is zero-padded.
    pub fn new(tf: &TransferFunction) -> Self {
        let taps = tf.len().max(1);
        let mut b = vec![0.0; taps];
        let mut a = vec![0.0; taps];
        b[..tf.b.len()].copy_from_slice(&tf.b);
        a[..tf.a.len()].copy_from_slice(&tf.a);
        Self {
            b,
            a,
            state: vec![0.0; taps - 1],
        }
    }

    /// Replace the delay line. `state` must have `taps - 1` entries.
    pub fn with_state(mut self, state: Vec<f64>) -> Self {
        debug_assert_eq!(state.len(), self.state.len());
        self.state = state;
        self
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.state.first().copied().unwrap_or(0.0);
        let last = self.state.len();
        for i in 0..last {
            let carry = if i + 1 < last { self.state[i + 1] } else { 0.0 };
            self.state[i] = self.b[i + 1] * input - self.a[i + 1] * output + carry;
        }
        output
    }

    /// Process a signal and return a new array (original unchanged)
    pub fn filter(&mut self, signal: &[f64]) -> Vec<f64> {
        signal.iter().map(|&s| self.process(s)).collect()
    }
}

/// Steady-state delay line for a unit step input.
///
/// Solves `(I - A^T) zi = b[1..] - a[1..] * b[0]`, where `A` is the companion
/// matrix of the denominator.
pub fn lfilter_zi(tf: &TransferFunction) -> Result<Vec<f64>> {
    let taps = tf.len();
    if taps < 2 {
        return Ok(Vec::new());
    }
    let mut b = vec![0.0; taps];
    let mut a = vec![0.0; taps];
    b[..tf.b.len()].copy_from_slice(&tf.b);
    a[..tf.a.len()].copy_from_slice(&tf.a);

    let m = taps - 1;
    let mut system = DMatrix::<f64>::identity(m, m);
    for i in 0..m {
        system[(i, 0)] += a[i + 1];
        if i + 1 < m {
            system[(i, i + 1)] -= 1.0;
        }
    }
    let rhs = DVector::from_iterator(m, (0..m).map(|i| b[i + 1] - a[i + 1] * b[0]));

    let zi = system
        .lu()
        .solve(&rhs)
        .ok_or_else(|| FilterError::invalid("Filter has no steady state (singular system)"))?;
    if zi.iter().any(|v| !v.is_finite()) {
        return Err(FilterError::invalid("Filter steady state is not finite"));
    }
    Ok(zi.iter().copied().collect())
}

/// Default edge padding for `filtfilt`
pub fn default_padlen(tf: &TransferFunction) -> usize {
    3 * tf.b.len().max(tf.a.len())
}

/// Extend both ends by point reflection about the end samples.
/// Requires `pad < signal.len()`.
pub fn odd_extension(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    extended
}

/// Zero-phase forward-backward filtering.
///
/// The output has the same length as `signal` and no phase shift; the
/// effective magnitude response is the square of the filter's.
pub fn filtfilt(tf: &TransferFunction, signal: &[f64]) -> Result<Vec<f64>> {
    let padlen = default_padlen(tf);
    let n = signal.len();
    if n <= padlen {
        return Err(FilterError::InvalidParameter(format!(
            "Signal has {} samples; zero-phase filtering needs more than {}",
            n, padlen
        )));
    }

    let zi = lfilter_zi(tf)?;
    let extended = odd_extension(signal, padlen);

    let x0 = extended[0];
    let mut forward = DirectFormFilter::new(tf).with_state(zi.iter().map(|z| z * x0).collect());
    let mut y = forward.filter(&extended);

    y.reverse();
    let y0 = y[0];
    let mut backward = DirectFormFilter::new(tf).with_state(zi.iter().map(|z| z * y0).collect());
    let mut y = backward.filter(&y);
    y.reverse();

    Ok(y[padlen..padlen + n].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iir::design::{butter, BandType};

    #[test]
    fn test_direct_form_impulse_response() {
        // y[n] = x[n] + 0.5 y[n-1]
        let tf = TransferFunction {
            b: vec![1.0],
            a: vec![1.0, -0.5],
        };
        let mut filter = DirectFormFilter::new(&tf);
        let out = filter.filter(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(out, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_zi_gives_steady_step_response() {
        let tf = butter(4, &[0.1], BandType::Lowpass).unwrap();
        let zi = lfilter_zi(&tf).unwrap();
        let mut filter = DirectFormFilter::new(&tf).with_state(zi);
        for y in filter.filter(&[1.0; 50]) {
            assert!((y - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_odd_extension() {
        let ext = odd_extension(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_filtfilt_requires_padding_room() {
        let tf = butter(4, &[0.1], BandType::Lowpass).unwrap();
        assert_eq!(default_padlen(&tf), 15);
        assert!(filtfilt(&tf, &[0.0; 15]).is_err());
        assert_eq!(filtfilt(&tf, &[0.0; 16]).unwrap().len(), 16);
    }

    #[test]
    fn test_filtfilt_preserves_ramp() {
        // Forward and backward group delays cancel away from the edges
        let tf = butter(4, &[0.1], BandType::Lowpass).unwrap();
        let ramp: Vec<f64> = (0..400).map(|i| 0.5 * i as f64 - 3.0).collect();
        let out = filtfilt(&tf, &ramp).unwrap();
        for i in 150..250 {
            assert!((ramp[i] - out[i]).abs() < 1e-6, "{} vs {}", ramp[i], out[i]);
        }
    }

    #[test]
    fn test_filtfilt_attenuates_high_frequency() {
        let tf = butter(4, &[0.1], BandType::Lowpass).unwrap();
        let signal: Vec<f64> = (0..400)
            .map(|i| (std::f64::consts::PI * 0.8 * i as f64).sin())
            .collect();
        let out = filtfilt(&tf, &signal).unwrap();
        let rms = (out[50..350].iter().map(|y| y * y).sum::<f64>() / 300.0).sqrt();
        assert!(rms < 1e-3, "residual rms {}", rms);
    }

    fn reference_input() -> Vec<f64> {
        (0..40)
            .map(|i| {
                let t = i as f64;
                (0.3 * t).sin() + 0.5 * (1.7 * t).cos() + 0.01 * t
            })
            .collect()
    }

    fn assert_samples(out: &[f64], expected: &[(usize, f64)]) {
        for &(i, value) in expected {
            assert!((out[i] - value).abs() < 1e-8, "sample {}: {} vs {}", i, out[i], value);
        }
    }

    #[test]
    fn test_filtfilt_lowpass_reference_output() {
        let tf = butter(4, &[0.1], BandType::Lowpass).unwrap();
        let out = filtfilt(&tf, &reference_input()).unwrap();
        assert_samples(
            &out,
            &[
                (0, 0.5467650849793791),
                (5, 0.7087122690871542),
                (10, 0.11544259435695517),
                (20, -0.0035514713964594044),
                (30, 0.739695180160932),
                (39, -0.9646153889293121),
            ],
        );
    }

    #[test]
    fn test_filtfilt_bandpass_reference_output() {
        let tf = butter(4, &[0.1, 0.3], BandType::Bandpass).unwrap();
        let out = filtfilt(&tf, &reference_input()).unwrap();
        assert_samples(
            &out,
            &[
                (0, -0.02370323927080422),
                (5, 0.3087654358900351),
                (10, 0.08285158695082812),
                (20, -0.05311615733927867),
                (30, -0.014364109762729772),
                (39, 0.027932413737369214),
            ],
        );
    }
}
