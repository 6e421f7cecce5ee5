use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;
use filterlab::Table;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    exists: bool,
    parsed: bool,
    columns: Vec<String>,
    rows: usize,
    text_columns: Vec<String>,
    missing_values: usize,
    error: Option<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let path = Path::new(&args.file);
    let exists = path.is_file();

    let parsed = if exists {
        Table::read(path).map_err(|e| e.to_string())
    } else {
        Err(format!("File not found: {}", args.file))
    };

    let result = match parsed {
        Ok(table) => {
            // Gaps in text columns are kept as-is, not counted
            let missing_values = table
                .headers()
                .iter()
                .filter_map(|h| table.column(h).ok())
                .map(|c| c.iter().filter(|v| v.is_nan()).count())
                .sum();
            ValidateOutput {
                file: args.file.clone(),
                exists,
                parsed: true,
                columns: table.headers().to_vec(),
                rows: table.num_rows(),
                text_columns: table.text_columns().into_iter().map(str::to_string).collect(),
                missing_values,
                error: None,
            }
        }
        Err(msg) => ValidateOutput {
            file: args.file.clone(),
            exists,
            parsed: false,
            columns: Vec::new(),
            rows: 0,
            text_columns: Vec::new(),
            missing_values: 0,
            error: Some(msg),
        },
    };

    if args.json {
        let code = output::print_json(&result, false);
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else if let Some(ref err) = result.error {
        eprintln!("Error: {}", err);
    } else {
        println!(
            "File '{}' is valid ({} columns, {} rows)",
            result.file,
            result.columns.len(),
            result.rows
        );
        println!("Columns: {}", result.columns.join(", "));
        if !result.text_columns.is_empty() {
            println!("Text columns: {}", result.text_columns.join(", "));
        }
        if result.missing_values > 0 {
            println!("Missing values: {}", result.missing_values);
        }
    }

    if result.error.is_some() {
        exit_codes::INPUT_ERROR
    } else {
        exit_codes::SUCCESS
    }
}
