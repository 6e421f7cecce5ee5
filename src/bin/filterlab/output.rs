use crate::exit_codes;
use serde::Serialize;
use std::io::Write;

/// Render a value as JSON, indented unless `compact`.
pub fn render_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Print a value as JSON on stdout and return the exit code.
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> i32 {
    let json = match render_json(value, compact) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: JSON serialization failed: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let mut stdout = std::io::stdout().lock();
    match writeln!(stdout, "{}", json) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: Failed to write to stdout: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_compact_and_pretty() {
        let value = serde_json::json!({ "filter": "median", "rows": 3 });
        assert_eq!(render_json(&value, true).unwrap(), r#"{"filter":"median","rows":3}"#);
        assert!(render_json(&value, false).unwrap().contains("\n  \"rows\": 3"));
    }
}
