pub mod config;
pub mod engine;
pub mod error;
pub mod iir;
pub mod pipeline;
pub mod smoothing;
pub mod table;
pub mod types;

pub use config::FilterSettings;
pub use engine::{apply_filter, apply_filter_named, apply_filter_with};
pub use error::{FilterError, Result};
pub use pipeline::{filter_columns, filtered_column_name, ColumnSummary, FilterOutcome};
pub use table::{Table, TableFormat};
pub use types::*;
