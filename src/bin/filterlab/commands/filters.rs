use crate::cli::FiltersArgs;
use crate::exit_codes;
use crate::output;
use filterlab::config::{
    DEFAULT_BAND, DEFAULT_CUTOFF, DEFAULT_ORDER, DEFAULT_RIPPLE_DB, DEFAULT_SAVGOL_POLYORDER,
};
use filterlab::engine::min_signal_len;
use filterlab::{FilterKind, FilterSettings, FilterSpec};
use serde::Serialize;

#[derive(Serialize)]
struct FilterInfo {
    id: &'static str,
    name: &'static str,
    uses_window: bool,
    zero_phase: bool,
    window_rule: &'static str,
    design: String,
    /// Fewest samples accepted with the default settings, for kinds whose
    /// minimum does not depend on the window
    min_samples: Option<usize>,
}

fn describe(kind: FilterKind) -> FilterInfo {
    let (window_rule, design) = match kind {
        FilterKind::MovingAverage => (">= 1", "trailing mean".to_string()),
        FilterKind::ExponentialMovingAverage => (">= 1 (span)", "alpha = 2 / (span + 1)".to_string()),
        FilterKind::Median => ("odd, >= 1", "centered median, edge samples repeated".to_string()),
        FilterKind::SavitzkyGolay => (
            "odd, > polyorder, <= signal length",
            format!("polynomial order {}", DEFAULT_SAVGOL_POLYORDER),
        ),
        FilterKind::LowPass | FilterKind::Butterworth => (
            "unused",
            format!("Butterworth order {}, cutoff {}", DEFAULT_ORDER, DEFAULT_CUTOFF),
        ),
        FilterKind::HighPass => (
            "unused",
            format!("Butterworth high-pass order {}, cutoff {}", DEFAULT_ORDER, DEFAULT_CUTOFF),
        ),
        FilterKind::BandPass => (
            "unused",
            format!("Butterworth band-pass order {}, band {:?}", DEFAULT_ORDER, DEFAULT_BAND),
        ),
        FilterKind::BandStop => (
            "unused",
            format!("Butterworth band-stop order {}, band {:?}", DEFAULT_ORDER, DEFAULT_BAND),
        ),
        FilterKind::Chebyshev => (
            "unused",
            format!(
                "Chebyshev I order {}, ripple {} dB, cutoff {}",
                DEFAULT_ORDER, DEFAULT_RIPPLE_DB, DEFAULT_CUTOFF
            ),
        ),
    };

    let min_samples = if kind.is_zero_phase() {
        min_signal_len(&FilterSpec::new(kind, 1), &FilterSettings::default()).ok()
    } else {
        None
    };

    FilterInfo {
        id: kind.id(),
        name: kind.display_name(),
        uses_window: kind.uses_window(),
        zero_phase: kind.is_zero_phase(),
        window_rule,
        design,
        min_samples,
    }
}

pub fn execute(args: FiltersArgs) -> i32 {
    let filters: Vec<FilterInfo> = FilterKind::ALL.iter().copied().map(describe).collect();

    if args.json {
        return output::print_json(&filters, false);
    }

    println!("Available filters:\n");
    println!("  {:<28} {:<28} {:<36}", "Id", "Name", "Window");
    println!("  {}", "-".repeat(92));
    for f in &filters {
        println!("  {:<28} {:<28} {:<36}", f.id, f.name, f.window_rule);
        match f.min_samples {
            Some(min) => println!("  {:<28} {} (needs at least {} samples)", "", f.design, min),
            None => println!("  {:<28} {}", "", f.design),
        }
    }
    println!();
    println!("Frequency-domain filters run forward and backward (zero phase).");

    exit_codes::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_samples_only_for_zero_phase_kinds() {
        assert_eq!(describe(FilterKind::Median).min_samples, None);
        assert_eq!(describe(FilterKind::LowPass).min_samples, Some(16));
        assert_eq!(describe(FilterKind::BandStop).min_samples, Some(28));
    }
}
