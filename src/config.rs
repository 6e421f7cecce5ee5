//! Fixed design settings for the filter engine.
//!
//! The frequency-domain kinds do not take user parameters; they use the values
//! below. Defaults reproduce the reference outputs and should only be changed
//! deliberately.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ORDER: usize = 4;
pub const DEFAULT_CUTOFF: f64 = 0.1;
pub const DEFAULT_BAND: [f64; 2] = [0.1, 0.3];
pub const DEFAULT_RIPPLE_DB: f64 = 0.1;
pub const DEFAULT_SAVGOL_POLYORDER: usize = 2;

/// Design settings shared by every call of one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// IIR prototype order (band designs double it)
    #[serde(default = "default_order")]
    pub order: usize,

    /// Normalized cutoff for low-pass, high-pass, Butterworth and Chebyshev (fraction of Nyquist)
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,

    /// Normalized band edges for band-pass and band-stop
    #[serde(default = "default_band")]
    pub band: [f64; 2],

    /// Chebyshev type I passband ripple in dB
    #[serde(default = "default_ripple_db")]
    pub ripple_db: f64,

    /// Savitzky-Golay polynomial degree
    #[serde(default = "default_savgol_polyorder")]
    pub savgol_polyorder: usize,
}

fn default_order() -> usize {
    DEFAULT_ORDER
}
fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}
fn default_band() -> [f64; 2] {
    DEFAULT_BAND
}
fn default_ripple_db() -> f64 {
    DEFAULT_RIPPLE_DB
}
fn default_savgol_polyorder() -> usize {
    DEFAULT_SAVGOL_POLYORDER
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            cutoff: DEFAULT_CUTOFF,
            band: DEFAULT_BAND,
            ripple_db: DEFAULT_RIPPLE_DB,
            savgol_polyorder: DEFAULT_SAVGOL_POLYORDER,
        }
    }
}

impl FilterSettings {
    /// Load settings from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings: FilterSettings = serde_json::from_str(&text)?;
        settings.validate()?;
        log::debug!("Loaded filter settings from {}: {:?}", path.as_ref().display(), settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(FilterError::invalid("Filter order must be greater than zero"));
        }
        check_normalized("cutoff", self.cutoff)?;
        check_normalized("band low edge", self.band[0])?;
        check_normalized("band high edge", self.band[1])?;
        if self.band[0] >= self.band[1] {
            return Err(FilterError::InvalidParameter(format!(
                "Band edges must be increasing, got [{}, {}]",
                self.band[0], self.band[1]
            )));
        }
        if !(self.ripple_db > 0.0 && self.ripple_db.is_finite()) {
            return Err(FilterError::InvalidParameter(format!(
                "Passband ripple must be > 0 dB, got {}",
                self.ripple_db
            )));
        }
        Ok(())
    }
}

fn check_normalized(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidParameter(format!(
            "Normalized {} must lie in (0, 1), got {}",
            name, value
        )))
    }
}
