use crate::cli::RunArgs;
use crate::exit_codes;
use crate::filter_params;
use crate::output;
use filterlab::{filter_columns, ColumnSummary, FilterOutcome, FilterSettings, Table};
use serde::Serialize;

#[derive(Serialize)]
struct RunReport {
    file: String,
    output: Option<String>,
    filter: &'static str,
    window_size: i64,
    settings: FilterSettings,
    rows: usize,
    columns: Vec<ColumnSummary>,
    processing_time_ms: f64,
    created_at: String,
}

impl RunReport {
    fn new(args: &RunArgs, outcome: &FilterOutcome) -> Self {
        Self {
            file: args.file.clone(),
            output: args.output.clone(),
            filter: outcome.spec.kind.id(),
            window_size: outcome.spec.window_size,
            settings: outcome.settings.clone(),
            rows: outcome.table.num_rows(),
            columns: outcome.columns.clone(),
            processing_time_ms: outcome.processing_time_ms,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn execute(args: RunArgs) -> i32 {
    if args.json && args.output.is_none() {
        eprintln!("Error: --json prints the summary on stdout, so --output is required");
        return exit_codes::INPUT_ERROR;
    }

    if let Err(msg) = filter_params::validate_file(&args.file) {
        eprintln!("Error: {}", msg);
        return exit_codes::INPUT_ERROR;
    }

    let spec = match filter_params::build_spec(&args.filter, args.window) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let settings = match filter_params::load_settings(args.config.as_deref()) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let table = match Table::read(&args.file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: Failed to read '{}': {}", args.file, e);
            return exit_codes::INPUT_ERROR;
        }
    };

    if !args.quiet {
        eprintln!("Filtering {}...", args.file);
        eprintln!("  Filter: {}", spec.kind);
        if spec.kind.uses_window() {
            eprintln!("  Window: {}", spec.window_size);
        }
        eprintln!("  Columns: {}", args.columns.join(", "));
    }

    let outcome = match filter_columns(&table, &args.columns, &spec, &settings) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return filter_params::exit_code_for(&e);
        }
    };

    let written = match args.output {
        Some(ref path) => outcome.table.write(path),
        None => outcome.table.write_to(std::io::stdout().lock()),
    };
    if let Err(e) = written {
        eprintln!("Error: Failed to write output: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if args.json {
        return output::print_json(&RunReport::new(&args, &outcome), args.compact);
    }

    if !args.quiet {
        for col in &outcome.columns {
            eprintln!(
                "  {} -> {} ({} samples, min {:.4}, max {:.4}, mean {:.4})",
                col.source, col.output, col.samples, col.min, col.max, col.mean
            );
        }
        if let Some(ref path) = args.output {
            eprintln!("Results written to {}", path);
        }
    }

    exit_codes::SUCCESS
}
