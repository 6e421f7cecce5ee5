use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "filterlab",
    version,
    about = "Apply smoothing and zero-phase IIR filters to CSV and spreadsheet time series",
    long_about = "Filter selected columns of CSV or spreadsheet time-series files and export the result.\n\
                  Filtered columns are appended as <column>_Filtered."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter columns of one CSV or spreadsheet file
    Run(RunArgs),
    /// Apply the same filter to many files
    Batch(BatchArgs),
    /// List available filter kinds
    Filters(FiltersArgs),
    /// Validate a CSV or spreadsheet file
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Input file: CSV (ISO-8859-1) or spreadsheet (xlsx, xlsm, xls, xlsb, ods)
    #[arg(long)]
    pub file: String,

    /// Columns to filter
    #[arg(long, num_args = 1.., required = true)]
    pub columns: Vec<String>,

    /// Filter kind (e.g. moving-average, savitzky-golay, low-pass, chebyshev)
    #[arg(long)]
    pub filter: String,

    /// Window size in samples (ignored by frequency-domain filters)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub window: i64,

    /// JSON file overriding the filter design settings
    #[arg(long, env = "FILTERLAB_CONFIG")]
    pub config: Option<String>,

    /// Output file, xlsx when the extension is .xlsx and CSV otherwise (default: CSV on stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print a JSON run summary on stdout (requires --output)
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern selecting input files (e.g. "data/*.csv")
    #[arg(long, conflicts_with = "files")]
    pub glob: Option<String>,

    /// Explicit list of input files
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Columns to filter in every file
    #[arg(long, num_args = 1.., required = true)]
    pub columns: Vec<String>,

    /// Filter kind
    #[arg(long)]
    pub filter: String,

    /// Window size in samples
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub window: i64,

    /// JSON file overriding the filter design settings
    #[arg(long, env = "FILTERLAB_CONFIG")]
    pub config: Option<String>,

    /// Directory for <stem>_filtered.<format> outputs
    #[arg(long)]
    pub output_dir: String,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Keep going after a file fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Only list the files that would be processed
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

#[derive(Args)]
pub struct FiltersArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Input CSV or spreadsheet file
    #[arg(long)]
    pub file: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
