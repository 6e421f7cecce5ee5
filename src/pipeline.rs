//! Column Filtering Pipeline
//!
//! Applies one filter to several columns of a table:
//! 1. Each selected column is filtered on the rayon pool (calls share nothing)
//! 2. The filtered columns are appended to a copy of the table as `<name>_Filtered`
//!
//! Either every column succeeds or the whole call fails.

use crate::config::FilterSettings;
use crate::engine::apply_filter_with;
use crate::error::{FilterError, Result};
use crate::table::Table;
use crate::types::FilterSpec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the output column for a filtered source column
pub fn filtered_column_name(source: &str) -> String {
    format!("{}_Filtered", source)
}

/// Summary of one filtered column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub source: String,
    pub output: String,
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ColumnSummary {
    fn new(source: &str, data: &[f64]) -> Self {
        let (min, max) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let mean = if data.is_empty() {
            0.0
        } else {
            data.iter().sum::<f64>() / data.len() as f64
        };
        Self {
            source: source.to_string(),
            output: filtered_column_name(source),
            samples: data.len(),
            min,
            max,
            mean,
        }
    }
}

/// Result of filtering a set of columns
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Input table with the filtered columns appended
    pub table: Table,
    pub spec: FilterSpec,
    pub settings: FilterSettings,
    pub columns: Vec<ColumnSummary>,
    /// Processing time in milliseconds
    pub processing_time_ms: f64,
}

/// Filter `columns` of `table` and return a new table holding the results
pub fn filter_columns(
    table: &Table,
    columns: &[String],
    spec: &FilterSpec,
    settings: &FilterSettings,
) -> Result<FilterOutcome> {
    if columns.is_empty() {
        return Err(FilterError::invalid("No columns selected"));
    }
    let start = std::time::Instant::now();

    // Resolve every column before spending time on any filter
    let sources: Vec<(&String, &[f64])> = columns
        .iter()
        .map(|name| table.column(name).map(|data| (name, data)))
        .collect::<Result<_>>()?;

    let filtered: Vec<(String, Vec<f64>)> = sources
        .par_iter()
        .map(|(name, data)| {
            apply_filter_with(data, spec, settings)
                .map(|out| (name.to_string(), out))
                .map_err(|e| annotate(name, e))
        })
        .collect::<Result<_>>()?;

    let summaries: Vec<ColumnSummary> = filtered
        .iter()
        .map(|(name, data)| ColumnSummary::new(name, data))
        .collect();

    let merged = table.with_columns(
        filtered
            .into_iter()
            .map(|(name, data)| (filtered_column_name(&name), data))
            .collect(),
    )?;

    let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    log::info!(
        "Filtered {} column(s) with {} in {:.2}ms",
        summaries.len(),
        spec.kind,
        processing_time_ms
    );

    Ok(FilterOutcome {
        table: merged,
        spec: *spec,
        settings: settings.clone(),
        columns: summaries,
        processing_time_ms,
    })
}

/// Prefix the failing column to the engine's message
fn annotate(column: &str, err: FilterError) -> FilterError {
    match err {
        FilterError::InvalidParameter(msg) => {
            FilterError::InvalidParameter(format!("column '{}': {}", column, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterKind;

    fn sample_table() -> Table {
        let time: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let a: Vec<f64> = time.iter().map(|t| (t * 0.2).sin()).collect();
        let b: Vec<f64> = time.iter().map(|t| (t * 0.05).cos() * 3.0).collect();
        Table::from_columns(
            vec!["Time (min)".to_string(), "A".to_string(), "B".to_string()],
            vec![time, a, b],
        )
        .unwrap()
    }

    #[test]
    fn test_filter_columns_appends_outputs() {
        let table = sample_table();
        let spec = FilterSpec::new(FilterKind::LowPass, 1);
        let outcome = filter_columns(
            &table,
            &["A".to_string(), "B".to_string()],
            &spec,
            &FilterSettings::default(),
        )
        .unwrap();

        assert_eq!(
            outcome.table.headers(),
            &["Time (min)", "A", "B", "A_Filtered", "B_Filtered"]
        );
        assert_eq!(outcome.columns.len(), 2);
        assert_eq!(outcome.columns[1].output, "B_Filtered");
        assert_eq!(outcome.columns[1].samples, 100);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = sample_table();
        let spec = FilterSpec::new(FilterKind::SavitzkyGolay, 9);
        let settings = FilterSettings::default();
        let outcome =
            filter_columns(&table, &["A".to_string(), "B".to_string()], &spec, &settings).unwrap();

        for name in ["A", "B"] {
            let expected = apply_filter_with(table.column(name).unwrap(), &spec, &settings).unwrap();
            let actual = outcome.table.column(&filtered_column_name(name)).unwrap();
            assert_eq!(actual, expected.as_slice());
        }
    }

    #[test]
    fn test_unknown_column_fails_whole_call() {
        let table = sample_table();
        let err = filter_columns(
            &table,
            &["A".to_string(), "Missing".to_string()],
            &FilterSpec::new(FilterKind::MovingAverage, 3),
            &FilterSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::ColumnNotFound(ref c) if c == "Missing"));
    }

    #[test]
    fn test_engine_error_names_column() {
        let table = sample_table();
        let err = filter_columns(
            &table,
            &["B".to_string()],
            &FilterSpec::new(FilterKind::Median, 4),
            &FilterSettings::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("column 'B'"));
    }

    #[test]
    fn test_text_columns_pass_through() {
        let table = Table::parse_csv("Sample,A\nS1,1\nS2,2\nS3,3\n").unwrap();
        let spec = FilterSpec::new(FilterKind::MovingAverage, 3);
        let settings = FilterSettings::default();

        let outcome = filter_columns(&table, &["A".to_string()], &spec, &settings).unwrap();
        assert_eq!(outcome.table.text_columns(), vec!["Sample"]);
        assert_eq!(outcome.table.column("A_Filtered").unwrap(), &[1.0, 1.5, 2.0]);

        let err = filter_columns(&table, &["Sample".to_string()], &spec, &settings).unwrap_err();
        assert!(matches!(err, FilterError::Parse(_)));
    }

    #[test]
    fn test_no_columns_selected() {
        let table = sample_table();
        assert!(filter_columns(
            &table,
            &[],
            &FilterSpec::new(FilterKind::MovingAverage, 3),
            &FilterSettings::default()
        )
        .is_err());
    }
}
