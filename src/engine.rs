//! Filter Engine
//!
//! Maps a `FilterSpec` onto one of the ten filter routines. Every call is a
//! pure function of its inputs: the signal is borrowed, a new vector of the
//! same length is returned, and nothing is kept between calls.

use crate::config::FilterSettings;
use crate::error::{FilterError, Result};
use crate::iir::{self, BandType, TransferFunction};
use crate::smoothing;
use crate::types::{FilterKind, FilterSpec};

/// Apply a filter with the default design settings
pub fn apply_filter(signal: &[f64], spec: &FilterSpec) -> Result<Vec<f64>> {
    apply_filter_with(signal, spec, &FilterSettings::default())
}

/// Apply a filter selected by name (identifier or display label)
pub fn apply_filter_named(signal: &[f64], kind: &str, window_size: i64) -> Result<Vec<f64>> {
    let kind: FilterKind = kind.parse()?;
    apply_filter(signal, &FilterSpec::new(kind, window_size))
}

/// Apply a filter with explicit design settings
pub fn apply_filter_with(
    signal: &[f64],
    spec: &FilterSpec,
    settings: &FilterSettings,
) -> Result<Vec<f64>> {
    validate_signal(signal)?;
    settings.validate()?;

    log::debug!(
        "Applying {} (window {}) to {} samples",
        spec.kind,
        spec.window_size,
        signal.len()
    );

    let output = match spec.kind {
        FilterKind::MovingAverage => {
            let window = positive_window(spec)?;
            smoothing::moving_average(signal, window)
        }
        FilterKind::ExponentialMovingAverage => {
            let span = positive_window(spec)?;
            smoothing::exponential_moving_average(signal, span)
        }
        FilterKind::Median => {
            let window = odd_window(spec)?;
            smoothing::median_filter(signal, window)
        }
        FilterKind::SavitzkyGolay => {
            let window = odd_window(spec)?;
            smoothing::savitzky_golay(signal, window, settings.savgol_polyorder)?
        }
        FilterKind::LowPass
        | FilterKind::HighPass
        | FilterKind::BandPass
        | FilterKind::BandStop
        | FilterKind::Butterworth
        | FilterKind::Chebyshev => {
            let tf = design_for(spec.kind, settings)?;
            iir::filtfilt(&tf, signal)?
        }
    };

    debug_assert_eq!(output.len(), signal.len());
    Ok(output)
}

/// Transfer function used by a frequency-domain kind
pub fn design_for(kind: FilterKind, settings: &FilterSettings) -> Result<TransferFunction> {
    let cutoff = [settings.cutoff];
    match kind {
        FilterKind::LowPass | FilterKind::Butterworth => {
            iir::butter(settings.order, &cutoff, BandType::Lowpass)
        }
        FilterKind::HighPass => iir::butter(settings.order, &cutoff, BandType::Highpass),
        FilterKind::BandPass => iir::butter(settings.order, &settings.band, BandType::Bandpass),
        FilterKind::BandStop => iir::butter(settings.order, &settings.band, BandType::Bandstop),
        FilterKind::Chebyshev => {
            iir::cheby1(settings.order, settings.ripple_db, &cutoff, BandType::Lowpass)
        }
        other => Err(FilterError::UnsupportedFilterKind(format!(
            "{} has no IIR design",
            other
        ))),
    }
}

/// Smallest signal length a kind accepts under `settings` and `window_size`
pub fn min_signal_len(spec: &FilterSpec, settings: &FilterSettings) -> Result<usize> {
    match spec.kind {
        FilterKind::SavitzkyGolay => odd_window(spec),
        kind if kind.is_zero_phase() => {
            let tf = design_for(kind, settings)?;
            Ok(iir::default_padlen(&tf) + 1)
        }
        _ => Ok(1),
    }
}

fn validate_signal(signal: &[f64]) -> Result<()> {
    if signal.is_empty() {
        return Err(FilterError::invalid("Signal is empty"));
    }
    if let Some(idx) = signal.iter().position(|x| !x.is_finite()) {
        return Err(FilterError::InvalidParameter(format!(
            "Signal sample {} is not finite ({})",
            idx, signal[idx]
        )));
    }
    Ok(())
}

fn positive_window(spec: &FilterSpec) -> Result<usize> {
    if spec.window_size < 1 {
        return Err(FilterError::InvalidParameter(format!(
            "{} needs a window size of at least 1, got {}",
            spec.kind, spec.window_size
        )));
    }
    usize::try_from(spec.window_size)
        .map_err(|_| FilterError::InvalidParameter(format!("Window size {} is too large", spec.window_size)))
}

fn odd_window(spec: &FilterSpec) -> Result<usize> {
    let window = positive_window(spec)?;
    if window % 2 == 0 {
        return Err(FilterError::InvalidParameter(format!(
            "{} needs an odd window size, got {}",
            spec.kind, window
        )));
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (1..=n).map(|v| v as f64).collect()
    }

    #[test]
    fn test_moving_average_scenario() {
        let out = apply_filter(&ramp(10), &FilterSpec::new(FilterKind::MovingAverage, 3)).unwrap();
        assert_eq!(out, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_non_positive_windows_rejected() {
        for w in [0, -1, -50] {
            for kind in [
                FilterKind::MovingAverage,
                FilterKind::ExponentialMovingAverage,
                FilterKind::Median,
                FilterKind::SavitzkyGolay,
            ] {
                let err = apply_filter(&ramp(20), &FilterSpec::new(kind, w)).unwrap_err();
                assert!(matches!(err, FilterError::InvalidParameter(_)), "{} w={}", kind, w);
            }
        }
    }

    #[test]
    fn test_even_windows_rejected() {
        for kind in [FilterKind::Median, FilterKind::SavitzkyGolay] {
            let err = apply_filter(&ramp(20), &FilterSpec::new(kind, 4)).unwrap_err();
            assert!(matches!(err, FilterError::InvalidParameter(_)));
        }
    }

    #[test]
    fn test_window_ignored_by_iir_kinds() {
        let signal: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
        let a = apply_filter(&signal, &FilterSpec::new(FilterKind::LowPass, 1)).unwrap();
        let b = apply_filter(&signal, &FilterSpec::new(FilterKind::LowPass, -7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_butterworth_matches_low_pass() {
        let signal: Vec<f64> = (0..64).map(|i| (i as f64 * 0.7).cos()).collect();
        let low = apply_filter(&signal, &FilterSpec::new(FilterKind::LowPass, 1)).unwrap();
        let butter = apply_filter(&signal, &FilterSpec::new(FilterKind::Butterworth, 1)).unwrap();
        assert_eq!(low, butter);
    }

    #[test]
    fn test_short_signal_rejected_for_iir() {
        let err = apply_filter(&ramp(15), &FilterSpec::new(FilterKind::HighPass, 1)).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameter(_)));
        let err = apply_filter(&ramp(27), &FilterSpec::new(FilterKind::BandStop, 1)).unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameter(_)));
        assert!(apply_filter(&ramp(28), &FilterSpec::new(FilterKind::BandStop, 1)).is_ok());
    }

    #[test]
    fn test_min_signal_len() {
        let settings = FilterSettings::default();
        let len = |kind, w| min_signal_len(&FilterSpec::new(kind, w), &settings).unwrap();
        assert_eq!(len(FilterKind::LowPass, 1), 16);
        assert_eq!(len(FilterKind::BandPass, 1), 28);
        assert_eq!(len(FilterKind::SavitzkyGolay, 7), 7);
        assert_eq!(len(FilterKind::Median, 7), 1);
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        let spec = FilterSpec::new(FilterKind::MovingAverage, 2);
        assert!(matches!(apply_filter(&[], &spec), Err(FilterError::InvalidParameter(_))));
        let err = apply_filter(&[1.0, f64::NAN, 2.0], &spec).unwrap_err();
        assert!(err.to_string().contains("sample 1"));
    }

    #[test]
    fn test_named_dispatch() {
        let out = apply_filter_named(&ramp(5), "Moving Average", 1).unwrap();
        assert_eq!(out, ramp(5));
        assert!(matches!(
            apply_filter_named(&ramp(5), "wavelet", 3),
            Err(FilterError::UnsupportedFilterKind(_))
        ));
    }

    #[test]
    fn test_custom_settings_change_design() {
        let signal: Vec<f64> = (0..128).map(|i| (i as f64 * 0.5).sin()).collect();
        let spec = FilterSpec::new(FilterKind::LowPass, 1);
        let default = apply_filter(&signal, &spec).unwrap();
        let wider = FilterSettings {
            cutoff: 0.4,
            ..Default::default()
        };
        let custom = apply_filter_with(&signal, &spec, &wider).unwrap();
        assert_ne!(default, custom);

        let broken = FilterSettings {
            order: 0,
            ..Default::default()
        };
        assert!(apply_filter_with(&signal, &spec, &broken).is_err());
    }

    #[test]
    fn test_huge_windows_return_results() {
        let signal = [1.0, 2.0, 3.0];
        let huge = i64::MAX;
        let median = apply_filter(&signal, &FilterSpec::new(FilterKind::Median, huge)).unwrap();
        assert_eq!(median, vec![1.0, 2.0, 3.0]);
        let mean = apply_filter(&signal, &FilterSpec::new(FilterKind::MovingAverage, huge)).unwrap();
        assert_eq!(mean, vec![1.0, 1.5, 2.0]);
        assert!(apply_filter(&signal, &FilterSpec::new(FilterKind::ExponentialMovingAverage, huge)).is_ok());
        assert!(matches!(
            apply_filter(&signal, &FilterSpec::new(FilterKind::SavitzkyGolay, huge)),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_chebyshev_uses_cheby1_design() {
        let settings = FilterSettings::default();
        let tf = design_for(FilterKind::Chebyshev, &settings).unwrap();
        let direct = iir::cheby1(4, 0.1, &[0.1], BandType::Lowpass).unwrap();
        assert_eq!(tf, direct);
    }
}
