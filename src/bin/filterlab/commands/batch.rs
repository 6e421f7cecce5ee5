use crate::cli::BatchArgs;
use crate::exit_codes;
use crate::filter_params;
use filterlab::{filter_columns, FilterSettings, FilterSpec, Table};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn execute(args: BatchArgs) -> i32 {
    let files = match resolve_files(&args) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if files.is_empty() {
        eprintln!("Error: No matching files found");
        return exit_codes::INPUT_ERROR;
    }

    if args.dry_run {
        for f in &files {
            println!("{}", f);
        }
        if !args.quiet {
            eprintln!("Found {} file(s)", files.len());
        }
        return exit_codes::SUCCESS;
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

    if let Err(e) = std::fs::create_dir_all(&args.output_dir) {
        eprintln!(
            "Error: Failed to create output directory '{}': {}",
            args.output_dir, e
        );
        return exit_codes::EXECUTION_ERROR;
    }

    let started = Instant::now();
    let mut tally = BatchTally::default();

    for (i, file_path) in files.iter().enumerate() {
        if !args.quiet {
            eprintln!("[{}/{}] {}", i + 1, files.len(), file_path);
        }

        match process_file(file_path, &args, &spec, &settings) {
            Ok(out_path) => {
                log::info!("Wrote {}", out_path.display());
                tally.succeeded += 1;
            }
            Err(msg) => {
                eprintln!("  Error: {}", msg);
                log::warn!("Skipping {}: {}", file_path, msg);
                tally.failed += 1;
                if !args.continue_on_error {
                    break;
                }
            }
        }
    }

    if !args.quiet {
        let skipped = files.len() - tally.succeeded - tally.failed;
        eprintln!(
            "Filtered {} of {} file(s) ({} failed, {} not attempted) in {:.1}s",
            tally.succeeded,
            files.len(),
            tally.failed,
            skipped,
            started.elapsed().as_secs_f64()
        );
    }

    tally.exit_code()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchTally {
    succeeded: usize,
    failed: usize,
}

impl BatchTally {
    /// Partial failure only when some files made it through
    fn exit_code(&self) -> i32 {
        match (self.succeeded, self.failed) {
            (_, 0) => exit_codes::SUCCESS,
            (0, _) => exit_codes::EXECUTION_ERROR,
            _ => exit_codes::PARTIAL_FAILURE,
        }
    }
}

fn process_file(
    file_path: &str,
    args: &BatchArgs,
    spec: &FilterSpec,
    settings: &FilterSettings,
) -> Result<PathBuf, String> {
    filter_params::validate_file(file_path)?;

    let table = Table::read(file_path).map_err(|e| format!("Failed to read: {}", e))?;
    let outcome =
        filter_columns(&table, &args.columns, spec, settings).map_err(|e| e.to_string())?;

    let out_path = output_path(&args.output_dir, file_path, args.format.extension());
    outcome
        .table
        .write(&out_path)
        .map_err(|e| format!("Failed to write '{}': {}", out_path.display(), e))?;
    Ok(out_path)
}

/// `<output_dir>/<stem>_filtered.<extension>`
fn output_path(output_dir: &str, file_path: &str, extension: &str) -> PathBuf {
    let stem = Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    Path::new(output_dir).join(format!("{}_filtered.{}", stem, extension))
}

fn resolve_files(args: &BatchArgs) -> Result<Vec<String>, String> {
    if let Some(ref pattern) = args.glob {
        resolve_glob(pattern)
    } else if let Some(ref files) = args.files {
        Ok(files.clone())
    } else {
        Err("One of --glob or --files must be specified".to_string())
    }
}

fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let entries =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = entries
        .filter_map(|entry| {
            entry
                .map_err(|e| log::warn!("Skipping unreadable path: {}", e))
                .ok()
        })
        .filter(|path| path.is_file())
        .filter_map(|path| path.to_str().map(str::to_string))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;

    fn batch_args() -> BatchArgs {
        BatchArgs {
            glob: None,
            files: None,
            columns: vec!["A".to_string()],
            filter: "moving-average".to_string(),
            window: 3,
            config: None,
            output_dir: "/tmp".to_string(),
            format: OutputFormat::Csv,
            continue_on_error: false,
            dry_run: false,
            quiet: true,
        }
    }

    #[test]
    fn test_tally_exit_codes() {
        let tally = |succeeded, failed| BatchTally { succeeded, failed }.exit_code();
        assert_eq!(tally(3, 0), exit_codes::SUCCESS);
        assert_eq!(tally(0, 0), exit_codes::SUCCESS);
        assert_eq!(tally(2, 1), exit_codes::PARTIAL_FAILURE);
        assert_eq!(tally(0, 2), exit_codes::EXECUTION_ERROR);
    }

    #[test]
    fn test_missing_input_source() {
        let err = resolve_files(&batch_args()).unwrap_err();
        assert!(err.contains("--glob or --files"));
    }

    #[test]
    fn test_explicit_files_keep_order() {
        let mut args = batch_args();
        args.files = Some(vec!["/tmp/z.csv".to_string(), "/tmp/a.csv".to_string()]);
        assert_eq!(resolve_files(&args).unwrap(), vec!["/tmp/z.csv", "/tmp/a.csv"]);
    }

    #[test]
    fn test_glob_without_matches_is_empty() {
        assert!(resolve_glob("/nonexistent_dir_12345/*.csv").unwrap().is_empty());
    }

    #[test]
    fn test_glob_sorts_and_skips_other_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("b.csv"), "").unwrap();
        fs::write(tmp.path().join("a.csv"), "").unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();

        let pattern = format!("{}/*.csv", tmp.path().to_str().unwrap());
        let result = resolve_glob(&pattern).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result[0].ends_with("a.csv"));
    }

    #[test]
    fn test_output_path() {
        let path = output_path("/out", "/data/run 1.csv", "csv");
        assert_eq!(path, PathBuf::from("/out/run 1_filtered.csv"));
        let path = output_path("/out", "/data/run 1.xlsx", OutputFormat::Xlsx.extension());
        assert_eq!(path, PathBuf::from("/out/run 1_filtered.xlsx"));
    }

    #[test]
    fn test_process_file_writes_output() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("sample.csv");
        fs::write(&input, "Time (min),A\n0,1\n1,2\n2,3\n").unwrap();

        let mut args = batch_args();
        args.output_dir = tmp.path().join("out").to_str().unwrap().to_string();
        fs::create_dir_all(&args.output_dir).unwrap();

        let spec = filter_params::build_spec(&args.filter, args.window).unwrap();
        let out = process_file(
            input.to_str().unwrap(),
            &args,
            &spec,
            &FilterSettings::default(),
        )
        .unwrap();

        let table = Table::read(&out).unwrap();
        assert_eq!(table.column("A_Filtered").unwrap(), &[1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_process_file_writes_xlsx_with_text_column() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("sample.csv");
        fs::write(&input, "Well,A\nW1,1\nW2,2\nW3,3\n").unwrap();

        let mut args = batch_args();
        args.format = OutputFormat::Xlsx;
        args.output_dir = tmp.path().to_str().unwrap().to_string();

        let spec = filter_params::build_spec(&args.filter, args.window).unwrap();
        let out = process_file(
            input.to_str().unwrap(),
            &args,
            &spec,
            &FilterSettings::default(),
        )
        .unwrap();
        assert!(out.ends_with("sample_filtered.xlsx"));

        let table = Table::read(&out).unwrap();
        assert_eq!(table.headers(), &["Well", "A", "A_Filtered"]);
        assert_eq!(table.text_columns(), vec!["Well"]);
        assert_eq!(table.column("A_Filtered").unwrap(), &[1.0, 1.5, 2.0]);
    }
}
