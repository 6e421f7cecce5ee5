use crate::exit_codes;
use filterlab::{FilterError, FilterKind, FilterSettings, FilterSpec, TableFormat};
use std::path::Path;

/// Resolve the filter kind and window into a spec.
pub fn build_spec(filter: &str, window: i64) -> Result<FilterSpec, String> {
    let kind: FilterKind = filter.parse().map_err(|e: FilterError| {
        format!(
            "{}. Valid filters: {}",
            e,
            FilterKind::ALL
                .iter()
                .map(|k| k.id())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    Ok(FilterSpec::new(kind, window))
}

/// Load design settings from a JSON file, or the defaults.
pub fn load_settings(config: Option<&str>) -> Result<FilterSettings, String> {
    match config {
        Some(path) => FilterSettings::from_json_file(path)
            .map_err(|e| format!("Failed to load settings '{}': {}", path, e)),
        None => Ok(FilterSettings::default()),
    }
}

/// Validate a single input path: existence and a readable table extension.
pub fn validate_file(file_path: &str) -> Result<TableFormat, String> {
    let path = Path::new(file_path);
    if !path.is_file() {
        return Err(format!("Input file not found: {}", file_path));
    }

    TableFormat::from_path(path).map_err(|e| match e {
        FilterError::Parse(msg) => msg,
        other => other.to_string(),
    })
}

/// Exit code for a library error.
pub fn exit_code_for(err: &FilterError) -> i32 {
    match err {
        FilterError::Io(_) | FilterError::Json(_) | FilterError::Xlsx(_) => {
            exit_codes::EXECUTION_ERROR
        }
        _ => exit_codes::INPUT_ERROR,
    }
}
