//! Time-domain smoothing filters.
//!
//! All routines take a validated window length and return a new vector of the
//! same length as the input.

use crate::error::{FilterError, Result};
use nalgebra::{DMatrix, DVector};

/// Trailing rolling mean. The first `window - 1` outputs average only the
/// samples seen so far. Runs in one pass with a running window sum.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = 0.0;
    signal
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            sum += x;
            if i >= window {
                sum -= signal[i - window];
            }
            sum / (i + 1).min(window) as f64
        })
        .collect()
}

/// Recursive exponential smoothing with span `span` (alpha = 2 / (span + 1)),
/// seeded with the first sample.
pub fn exponential_moving_average(signal: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut output = Vec::with_capacity(signal.len());
    let mut prev = match signal.first() {
        Some(&x) => x,
        None => return output,
    };
    output.push(prev);
    for &x in &signal[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        output.push(prev);
    }
    output
}

/// Centered sliding median of odd length `window`. Positions past either end
/// repeat the nearest edge sample.
///
/// Only the in-range part of each window is materialized; the repeated edge
/// samples are counted rather than stored, so memory stays bounded by the
/// signal length for any window.
pub fn median_filter(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let half = window / 2;
    let mut buf: Vec<f64> = Vec::with_capacity(window.min(n));
    let mut weighted: Vec<(f64, usize)> = Vec::new();

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = i.saturating_add(half).min(n - 1);
            let head = half.saturating_sub(i);
            let tail = i.saturating_add(half).saturating_sub(n - 1);

            buf.clear();
            buf.extend_from_slice(&signal[lo..=hi]);
            if head == 0 && tail == 0 {
                let (_, median, _) = buf.select_nth_unstable_by(half, f64::total_cmp);
                return *median;
            }

            weighted.clear();
            weighted.extend(buf.iter().map(|&v| (v, 1)));
            weighted.push((signal[0], head));
            weighted.push((signal[n - 1], tail));
            weighted_rank(&mut weighted, half)
        })
        .collect()
}

/// Value at 0-based `rank` of a multiset given as (value, count) pairs
fn weighted_rank(items: &mut [(f64, usize)], rank: usize) -> f64 {
    items.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
    let mut seen = 0usize;
    for &(value, count) in items.iter() {
        seen = seen.saturating_add(count);
        if seen > rank {
            return value;
        }
    }
    items.last().map(|&(value, _)| value).unwrap_or(f64::NAN)
}

/// Savitzky-Golay smoother: least-squares polynomial of degree `polyorder`
/// over a centered window of odd length `window`.
///
/// The first and last `window / 2` outputs come from a polynomial fitted to the
/// first and last full window, evaluated at the edge positions.
pub fn savitzky_golay(signal: &[f64], window: usize, polyorder: usize) -> Result<Vec<f64>> {
    let n = signal.len();
    if window % 2 == 0 || window <= polyorder {
        return Err(FilterError::InvalidParameter(format!(
            "Savitzky-Golay window must be odd and larger than the polynomial order {}, got {}",
            polyorder, window
        )));
    }
    if window > n {
        return Err(FilterError::InvalidParameter(format!(
            "Savitzky-Golay window {} exceeds signal length {}",
            window, n
        )));
    }

    let fit = LocalFit::new(window, polyorder)?;
    let half = window / 2;
    let mut output = vec![0.0; n];

    for i in half..n - half {
        let span = &signal[i - half..=i + half];
        output[i] = fit.center.iter().zip(span).map(|(c, x)| c * x).sum();
    }

    let head = fit.coefficients(&signal[..window])?;
    for (i, slot) in output.iter_mut().take(half).enumerate() {
        *slot = fit.evaluate(&head, i);
    }

    let tail = fit.coefficients(&signal[n - window..])?;
    for i in window - half..window {
        output[n - window + i] = fit.evaluate(&tail, i);
    }

    Ok(output)
}

/// Least-squares polynomial fit over one window, in coordinates scaled to [-1, 1]
struct LocalFit {
    /// Vandermonde matrix, one row per window position
    vandermonde: DMatrix<f64>,
    /// Normal-equation matrix A^T A
    gram: DMatrix<f64>,
    /// Smoothing weights for the window center
    center: Vec<f64>,
}

impl LocalFit {
    fn new(window: usize, polyorder: usize) -> Result<Self> {
        let half = window / 2;
        let scale = half.max(1) as f64;
        let vandermonde = DMatrix::from_fn(window, polyorder + 1, |i, j| {
            ((i as f64 - half as f64) / scale).powi(j as i32)
        });
        let gram = vandermonde.transpose() * &vandermonde;

        let mut unit = DVector::<f64>::zeros(polyorder + 1);
        unit[0] = 1.0;
        let solved = gram
            .clone()
            .lu()
            .solve(&unit)
            .ok_or_else(|| FilterError::invalid("Savitzky-Golay fit is singular"))?;
        let center = (&vandermonde * solved).iter().copied().collect();

        Ok(Self {
            vandermonde,
            gram,
            center,
        })
    }

    /// Polynomial coefficients fitted to one full window of samples
    fn coefficients(&self, values: &[f64]) -> Result<DVector<f64>> {
        let rhs = self.vandermonde.transpose() * DVector::from_column_slice(values);
        self.gram
            .clone()
            .lu()
            .solve(&rhs)
            .ok_or_else(|| FilterError::invalid("Savitzky-Golay edge fit is singular"))
    }

    /// Fitted value at window position `pos`
    fn evaluate(&self, coeffs: &DVector<f64>, pos: usize) -> f64 {
        self.vandermonde.row(pos).transpose().dot(coeffs)
    }
}
