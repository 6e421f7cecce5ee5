use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter kind selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    MovingAverage,
    SavitzkyGolay,
    LowPass,
    HighPass,
    BandPass,
    BandStop,
    ExponentialMovingAverage,
    Median,
    Butterworth,
    Chebyshev,
}

impl FilterKind {
    /// All kinds, in menu order
    pub const ALL: [FilterKind; 10] = [
        FilterKind::MovingAverage,
        FilterKind::SavitzkyGolay,
        FilterKind::LowPass,
        FilterKind::HighPass,
        FilterKind::BandPass,
        FilterKind::BandStop,
        FilterKind::ExponentialMovingAverage,
        FilterKind::Median,
        FilterKind::Butterworth,
        FilterKind::Chebyshev,
    ];

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterKind::MovingAverage => "Moving Average",
            FilterKind::SavitzkyGolay => "Savitzky-Golay",
            FilterKind::LowPass => "Low-pass Filter",
            FilterKind::HighPass => "High-pass Filter",
            FilterKind::BandPass => "Band-pass Filter",
            FilterKind::BandStop => "Band-stop Filter",
            FilterKind::ExponentialMovingAverage => "Exponential Moving Average",
            FilterKind::Median => "Median Filter",
            FilterKind::Butterworth => "Butterworth Filter",
            FilterKind::Chebyshev => "Chebyshev Filter",
        }
    }

    /// Identifier used on the command line and in JSON
    pub fn id(&self) -> &'static str {
        match self {
            FilterKind::MovingAverage => "moving-average",
            FilterKind::SavitzkyGolay => "savitzky-golay",
            FilterKind::LowPass => "low-pass",
            FilterKind::HighPass => "high-pass",
            FilterKind::BandPass => "band-pass",
            FilterKind::BandStop => "band-stop",
            FilterKind::ExponentialMovingAverage => "exponential-moving-average",
            FilterKind::Median => "median",
            FilterKind::Butterworth => "butterworth",
            FilterKind::Chebyshev => "chebyshev",
        }
    }

    /// Whether the kind reads `window_size`. Frequency-domain kinds use the
    /// fixed design settings instead.
    pub fn uses_window(&self) -> bool {
        matches!(
            self,
            FilterKind::MovingAverage
                | FilterKind::SavitzkyGolay
                | FilterKind::ExponentialMovingAverage
                | FilterKind::Median
        )
    }

    /// Whether the kind is applied forward-backward through an IIR design
    pub fn is_zero_phase(&self) -> bool {
        !self.uses_window()
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        FilterKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.id().eq_ignore_ascii_case(needle)
                    || kind.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| FilterError::UnsupportedFilterKind(needle.to_string()))
    }
}

/// A filter selection plus the window parameter.
///
/// `window_size` is signed so that zero and negative input reach the engine
/// and are rejected there rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    #[serde(default = "default_window_size")]
    pub window_size: i64,
}

fn default_window_size() -> i64 {
    1
}

impl FilterSpec {
    pub fn new(kind: FilterKind, window_size: i64) -> Self {
        Self { kind, window_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_id_and_label() {
        assert_eq!("moving-average".parse::<FilterKind>().unwrap(), FilterKind::MovingAverage);
        assert_eq!("Median Filter".parse::<FilterKind>().unwrap(), FilterKind::Median);
        assert_eq!("  CHEBYSHEV ".parse::<FilterKind>().unwrap(), FilterKind::Chebyshev);
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = "kalman".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedFilterKind(ref k) if k == "kalman"));
    }

    #[test]
    fn test_window_usage_split() {
        let windowed = FilterKind::ALL.iter().filter(|k| k.uses_window()).count();
        assert_eq!(windowed, 4);
        assert!(FilterKind::BandStop.is_zero_phase());
        assert!(!FilterKind::Median.is_zero_phase());
    }

    #[test]
    fn test_spec_serde() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"kind":"savitzky-golay","window_size":7}"#).unwrap();
        assert_eq!(spec, FilterSpec::new(FilterKind::SavitzkyGolay, 7));

        let spec: FilterSpec = serde_json::from_str(r#"{"kind":"low-pass"}"#).unwrap();
        assert_eq!(spec.window_size, 1);
    }
}
