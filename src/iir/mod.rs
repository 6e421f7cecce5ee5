//! IIR Filters
//!
//! Butterworth and Chebyshev type I designs applied with zero phase:
//! - `design`: analog prototypes, band transforms, bilinear transform
//! - `apply`: Direct Form II Transposed, steady-state initial conditions, `filtfilt`

mod apply;
mod design;

pub use apply::{default_padlen, filtfilt, lfilter_zi, odd_extension, DirectFormFilter};
pub use design::{butter, cheby1, design, BandType, Prototype, TransferFunction, Zpk};
