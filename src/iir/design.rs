//! IIR Filter Design
//!
//! Designs Butterworth and Chebyshev type I filters from their analog lowpass
//! prototypes. The prototype is moved to the requested band in zero/pole/gain
//! form, mapped to the z-plane with the bilinear transform and expanded into
//! transfer-function coefficients `(b, a)`.
//!
//! Frequencies are normalized to the Nyquist frequency, so the design works at
//! a sampling rate of 2 and prewarps with `4 * tan(pi * wn / 2)`.

use crate::error::{FilterError, Result};
use nalgebra::Complex;
use std::f64::consts::PI;

type C64 = Complex<f64>;

/// Normalized sampling rate used by the bilinear transform
const FS: f64 = 2.0;

/// Band type of a digital design
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl BandType {
    fn edge_count(&self) -> usize {
        match self {
            BandType::Lowpass | BandType::Highpass => 1,
            BandType::Bandpass | BandType::Bandstop => 2,
        }
    }
}

/// Analog lowpass prototype family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prototype {
    Butterworth,
    ChebyshevI { ripple_db: f64 },
}

/// Zeros, poles and gain of a filter
#[derive(Debug, Clone)]
pub struct Zpk {
    pub zeros: Vec<C64>,
    pub poles: Vec<C64>,
    pub gain: f64,
}

/// Transfer function coefficients, highest power first
/// H(z) = (b0 + b1*z^-1 + ... ) / (a0 + a1*z^-1 + ...)
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl TransferFunction {
    /// Scale so that `a[0] == 1`
    pub fn normalized(mut self) -> Result<Self> {
        let a0 = self.a.first().copied().unwrap_or(0.0);
        if !a0.is_finite() || a0.abs() < 1e-30 {
            return Err(FilterError::invalid(
                "Leading denominator coefficient must be non-zero",
            ));
        }
        for c in self.b.iter_mut().chain(self.a.iter_mut()) {
            *c /= a0;
        }
        if self.b.iter().chain(self.a.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::invalid("Filter design produced non-finite coefficients"));
        }
        Ok(self)
    }

    /// Number of taps of the longer polynomial
    pub fn len(&self) -> usize {
        self.b.len().max(self.a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Magnitude of the frequency response at normalized frequency `w` (0..1, 1 = Nyquist)
    pub fn magnitude_at(&self, w: f64) -> f64 {
        let omega = PI * w;
        let eval = |coeffs: &[f64]| -> C64 {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| C64::from_polar(c, -omega * k as f64))
                .fold(C64::new(0.0, 0.0), |acc, v| acc + v)
        };
        (eval(&self.b) / eval(&self.a)).norm()
    }
}

/// Design a Butterworth filter
pub fn butter(order: usize, wn: &[f64], band: BandType) -> Result<TransferFunction> {
    design(Prototype::Butterworth, order, wn, band)
}

/// Design a Chebyshev type I filter with `ripple_db` of passband ripple
pub fn cheby1(order: usize, ripple_db: f64, wn: &[f64], band: BandType) -> Result<TransferFunction> {
    design(Prototype::ChebyshevI { ripple_db }, order, wn, band)
}

/// Design a digital IIR filter in transfer-function form
pub fn design(
    prototype: Prototype,
    order: usize,
    wn: &[f64],
    band: BandType,
) -> Result<TransferFunction> {
    validate_wn(wn, band)?;

    let proto = match prototype {
        Prototype::Butterworth => buttap(order)?,
        Prototype::ChebyshevI { ripple_db } => cheb1ap(order, ripple_db)?,
    };

    let warped: Vec<f64> = wn.iter().map(|&w| 2.0 * FS * (PI * w / FS).tan()).collect();

    let analog = match band {
        BandType::Lowpass => lp2lp(proto, warped[0]),
        BandType::Highpass => lp2hp(proto, warped[0]),
        BandType::Bandpass => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lp2bp(proto, wo, bw)
        }
        BandType::Bandstop => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lp2bs(proto, wo, bw)
        }
    };

    let digital = bilinear(analog, FS);
    log::debug!(
        "Designed {:?} {:?} order {} at {:?}: {} zeros, {} poles, gain {:e}",
        prototype,
        band,
        order,
        wn,
        digital.zeros.len(),
        digital.poles.len(),
        digital.gain
    );

    zpk_to_tf(&digital).normalized()
}

fn validate_wn(wn: &[f64], band: BandType) -> Result<()> {
    if wn.len() != band.edge_count() {
        return Err(FilterError::InvalidParameter(format!(
            "{:?} design needs {} critical frequencies, got {}",
            band,
            band.edge_count(),
            wn.len()
        )));
    }
    if let Some(bad) = wn.iter().find(|&&w| !(w > 0.0 && w < 1.0)) {
        return Err(FilterError::InvalidParameter(format!(
            "Critical frequency {} must lie strictly between 0 and 1",
            bad
        )));
    }
    if wn.len() == 2 && wn[0] >= wn[1] {
        return Err(FilterError::InvalidParameter(format!(
            "Band edges must be increasing, got [{}, {}]",
            wn[0], wn[1]
        )));
    }
    Ok(())
}

/// Angles pi*m/(2n) for m = -n+1, -n+3, ..., n-1
fn prototype_angles(order: usize) -> impl Iterator<Item = f64> {
    let n = order as i64;
    (0..n).map(move |i| PI * (2 * i - n + 1) as f64 / (2 * n) as f64)
}

/// Butterworth analog prototype: poles evenly spaced on the left half of the unit circle
fn buttap(order: usize) -> Result<Zpk> {
    if order == 0 {
        return Err(FilterError::invalid("Filter order must be greater than zero"));
    }
    let poles = prototype_angles(order)
        .map(|theta| -C64::new(theta.cos(), theta.sin()))
        .collect();
    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    })
}

/// Chebyshev type I analog prototype with equiripple passband
fn cheb1ap(order: usize, ripple_db: f64) -> Result<Zpk> {
    if order == 0 {
        return Err(FilterError::invalid("Filter order must be greater than zero"));
    }
    if !(ripple_db > 0.0 && ripple_db.is_finite()) {
        return Err(FilterError::InvalidParameter(format!(
            "Passband ripple must be > 0 dB, got {}",
            ripple_db
        )));
    }

    let eps = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / order as f64;

    // p = -sinh(mu + j*theta)
    let poles: Vec<C64> = prototype_angles(order)
        .map(|theta| -C64::new(mu.sinh() * theta.cos(), mu.cosh() * theta.sin()))
        .collect();

    let mut gain = product(poles.iter().map(|p| -p)).re;
    if order % 2 == 0 {
        // Even orders start the passband at the bottom of the ripple
        gain /= (1.0 + eps * eps).sqrt();
    }

    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain,
    })
}

fn relative_degree(zpk: &Zpk) -> usize {
    zpk.poles.len().saturating_sub(zpk.zeros.len())
}

fn product<I: Iterator<Item = C64>>(values: I) -> C64 {
    values.fold(C64::new(1.0, 0.0), |acc, v| acc * v)
}

/// Ratio prod(-z) / prod(-p), the gain correction for inverting transforms
fn inversion_gain(zpk: &Zpk) -> f64 {
    let num = product(zpk.zeros.iter().map(|z| -z));
    let den = product(zpk.poles.iter().map(|p| -p));
    (num / den).re
}

fn lp2lp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = relative_degree(&zpk);
    Zpk {
        zeros: zpk.zeros.iter().map(|z| z * wo).collect(),
        poles: zpk.poles.iter().map(|p| p * wo).collect(),
        gain: zpk.gain * wo.powi(degree as i32),
    }
}

fn lp2hp(zpk: Zpk, wo: f64) -> Zpk {
    let degree = relative_degree(&zpk);
    let w = C64::new(wo, 0.0);
    let mut zeros: Vec<C64> = zpk.zeros.iter().map(|z| w / z).collect();
    zeros.extend(std::iter::repeat(C64::new(0.0, 0.0)).take(degree));
    Zpk {
        poles: zpk.poles.iter().map(|p| w / p).collect(),
        gain: zpk.gain * inversion_gain(&zpk),
        zeros,
    }
}

/// Split each root r into r ± sqrt(r^2 - wo^2)
fn split_roots(roots: &[C64], wo: f64) -> Vec<C64> {
    let wo2 = C64::new(wo * wo, 0.0);
    let plus = roots.iter().map(|r| r + (r * r - wo2).sqrt());
    let minus = roots.iter().map(|r| r - (r * r - wo2).sqrt());
    plus.chain(minus).collect()
}

fn lp2bp(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = relative_degree(&zpk);
    let half = bw / 2.0;
    let z_lp: Vec<C64> = zpk.zeros.iter().map(|z| z * half).collect();
    let p_lp: Vec<C64> = zpk.poles.iter().map(|p| p * half).collect();

    let mut zeros = split_roots(&z_lp, wo);
    zeros.extend(std::iter::repeat(C64::new(0.0, 0.0)).take(degree));

    Zpk {
        zeros,
        poles: split_roots(&p_lp, wo),
        gain: zpk.gain * bw.powi(degree as i32),
    }
}

fn lp2bs(zpk: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = relative_degree(&zpk);
    let half = C64::new(bw / 2.0, 0.0);
    let z_hp: Vec<C64> = zpk.zeros.iter().map(|z| half / z).collect();
    let p_hp: Vec<C64> = zpk.poles.iter().map(|p| half / p).collect();

    let mut zeros = split_roots(&z_hp, wo);
    zeros.extend(std::iter::repeat(C64::new(0.0, wo)).take(degree));
    zeros.extend(std::iter::repeat(C64::new(0.0, -wo)).take(degree));

    Zpk {
        zeros,
        poles: split_roots(&p_hp, wo),
        gain: zpk.gain * inversion_gain(&zpk),
    }
}

/// Bilinear transform from the s-plane to the z-plane
fn bilinear(zpk: Zpk, fs: f64) -> Zpk {
    let degree = relative_degree(&zpk);
    let fs2 = C64::new(2.0 * fs, 0.0);

    let mut zeros: Vec<C64> = zpk.zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
    zeros.extend(std::iter::repeat(C64::new(-1.0, 0.0)).take(degree));

    let num = product(zpk.zeros.iter().map(|z| fs2 - z));
    let den = product(zpk.poles.iter().map(|p| fs2 - p));

    Zpk {
        zeros,
        poles: zpk.poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect(),
        gain: zpk.gain * (num / den).re,
    }
}

/// Expand roots into monic polynomial coefficients, highest power first
fn poly(roots: &[C64]) -> Vec<C64> {
    let mut coeffs = vec![C64::new(1.0, 0.0)];
    for root in roots {
        let mut next = vec![C64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

/// Zeros and poles come in conjugate pairs, so the imaginary parts cancel
fn zpk_to_tf(zpk: &Zpk) -> TransferFunction {
    TransferFunction {
        b: poly(&zpk.zeros).iter().map(|c| c.re * zpk.gain).collect(),
        a: poly(&zpk.poles).iter().map(|c| c.re).collect(),
    }
}
