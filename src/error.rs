use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported filter kind: {0}")]
    UnsupportedFilterKind(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Failed to parse input: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        FilterError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
