// Tabular time-series data (CSV and spreadsheets)
// - CSV input is decoded as ISO-8859-1: every byte maps to the code point of the same value
// - First row holds column names
// - Each column is one signal, each row one time point
// - Columns with any non-numeric cell are kept as text and written back unchanged
// - CSV output is written as UTF-8

use crate::error::{FilterError, Result};
use std::collections::HashMap;
use std::path::Path;

/// File format, selected by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

impl TableFormat {
    /// Extensions accepted for reading
    pub fn supported_extensions() -> &'static [&'static str] {
        &["csv", "xlsx", "xlsm", "xls", "xlsb", "ods"]
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Spreadsheet),
            other => Err(FilterError::Parse(format!(
                "Unsupported file extension '{}'. Supported: {}",
                other,
                Self::supported_extensions().join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    fn cell_text(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) => format_cell(values[row]),
            ColumnData::Text(values) => values[row].clone(),
        }
    }
}

/// One cell as read from a file, before the column type is known
#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    number: Option<f64>,
}

impl RawCell {
    fn from_text(text: &str) -> Self {
        let number = if text.is_empty() {
            None
        } else {
            text.parse::<f64>().ok()
        };
        Self {
            text: text.to_string(),
            number,
        }
    }

    fn from_number(value: f64) -> Self {
        Self {
            text: value.to_string(),
            number: Some(value),
        }
    }

    fn is_numeric(&self) -> bool {
        self.text.is_empty() || self.number.is_some()
    }
}

/// Numeric when every non-empty cell parses; empty cells become NaN
fn classify(cells: Vec<RawCell>) -> ColumnData {
    if cells.iter().all(RawCell::is_numeric) {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|c| c.number.unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        ColumnData::Text(cells.into_iter().map(|c| c.text).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<ColumnData>,
}

impl Table {
    /// Build a table from named numeric columns of equal length
    pub fn from_columns(headers: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_data(headers, columns.into_iter().map(ColumnData::Numeric).collect())
    }

    fn from_data(headers: Vec<String>, columns: Vec<ColumnData>) -> Result<Self> {
        if headers.len() != columns.len() {
            return Err(FilterError::Parse(format!(
                "{} headers for {} columns",
                headers.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            if let Some((idx, col)) = columns
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != first.len())
            {
                return Err(FilterError::Parse(format!(
                    "Column '{}' has {} rows, expected {}",
                    headers[idx],
                    col.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { headers, columns })
    }

    fn from_cells(headers: Vec<String>, cells: Vec<Vec<RawCell>>) -> Result<Self> {
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(FilterError::Parse("File has no header row".to_string()));
        }
        Self::from_data(headers, cells.into_iter().map(classify).collect())
    }

    /// Read a CSV or spreadsheet file, picked by extension
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        match TableFormat::from_path(path.as_ref())? {
            TableFormat::Csv => Self::read_csv(path),
            TableFormat::Spreadsheet => Self::read_spreadsheet(path),
        }
    }

    /// Read a CSV file with a header row
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let table = Self::parse_csv(&decode_latin1(&bytes))?;
        log::info!(
            "Loaded {} columns x {} rows from {}",
            table.num_columns(),
            table.num_rows(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Read the first worksheet of a spreadsheet; its first row holds the headers
    pub fn read_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use calamine::Reader;

        let mut workbook = calamine::open_workbook_auto(path.as_ref())?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| FilterError::Parse("Workbook has no worksheets".to_string()))??;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| FilterError::Parse("File has no header row".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut cells: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];
        for row in rows {
            for (col, cell) in row.iter().enumerate() {
                cells[col].push(spreadsheet_cell(cell));
            }
        }

        let table = Self::from_cells(headers, cells)?;
        log::info!(
            "Loaded {} columns x {} rows from {}",
            table.num_columns(),
            table.num_rows(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Parse CSV text with a header row
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];

        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            // Header is line 1
            let line = row_idx + 2;
            if record.len() != headers.len() {
                return Err(FilterError::Parse(format!(
                    "Line {} has {} values, expected {}",
                    line,
                    record.len(),
                    headers.len()
                )));
            }
            for (col_idx, field) in record.iter().enumerate() {
                cells[col_idx].push(RawCell::from_text(field));
            }
        }

        Self::from_cells(headers, cells)
    }

    /// Write the table, as a spreadsheet for `.xlsx` paths and CSV otherwise
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let is_xlsx = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            self.write_xlsx(path)
        } else {
            self.write_csv(path)
        }
    }

    /// Write the table as CSV
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_to(file)?;
        log::info!(
            "Wrote {} columns x {} rows to {}",
            self.num_columns(),
            self.num_rows(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Write the table as CSV to any writer
    pub fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in 0..self.num_rows() {
            writer.write_record(self.columns.iter().map(|c| c.cell_text(row)))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table as a single-sheet `.xlsx` workbook. Missing values
    /// are left as blank cells.
    pub fn write_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col_idx, (header, column)) in self.headers.iter().zip(&self.columns).enumerate() {
            let col = u16::try_from(col_idx).map_err(|_| {
                FilterError::invalid(format!("Too many columns for a worksheet: {}", col_idx + 1))
            })?;
            sheet.write_string(0, col, header.as_str())?;

            for row_idx in 0..column.len() {
                let row = u32::try_from(row_idx + 1).map_err(|_| {
                    FilterError::invalid(format!("Too many rows for a worksheet: {}", row_idx + 1))
                })?;
                match column {
                    ColumnData::Numeric(values) if values[row_idx].is_finite() => {
                        sheet.write_number(row, col, values[row_idx])?;
                    }
                    ColumnData::Text(values) if !values[row_idx].is_empty() => {
                        sheet.write_string(row, col, values[row_idx].as_str())?;
                    }
                    _ => {}
                }
            }
        }

        workbook.save(path.as_ref())?;
        log::info!(
            "Wrote {} columns x {} rows to {}",
            self.num_columns(),
            self.num_rows(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(ColumnData::len).unwrap_or(0)
    }

    /// Names of the columns kept as text
    pub fn text_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .zip(&self.columns)
            .filter(|(_, c)| matches!(c, ColumnData::Text(_)))
            .map(|(h, _)| h.as_str())
            .collect()
    }

    /// Borrow a numeric column by name. A text column is a `Parse` error
    /// naming its first non-numeric cell.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FilterError::ColumnNotFound(name.to_string()))?;

        match &self.columns[idx] {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(values) => {
                let (row, value) = values
                    .iter()
                    .enumerate()
                    .find(|(_, v)| !RawCell::from_text(v).is_numeric())
                    .map(|(row, v)| (row + 2, v.as_str()))
                    .unwrap_or((0, ""));
                Err(FilterError::Parse(format!(
                    "Column '{}' is not numeric: invalid value '{}' at line {}",
                    name, value, row
                )))
            }
        }
    }

    /// New table with `added` columns appended; a column whose name already
    /// exists is replaced in place.
    pub fn with_columns(&self, added: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut headers = self.headers.clone();
        let mut columns = self.columns.clone();
        let mut index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        for (name, data) in added {
            match index.get(&name) {
                Some(&idx) => columns[idx] = ColumnData::Numeric(data),
                None => {
                    index.insert(name.clone(), headers.len());
                    headers.push(name);
                    columns.push(ColumnData::Numeric(data));
                }
            }
        }

        Self::from_data(headers, columns)
    }
}

/// ISO-8859-1 maps bytes 0x00-0xFF one-to-one onto U+0000-U+00FF
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn spreadsheet_cell(cell: &calamine::Data) -> RawCell {
    use calamine::Data;

    match cell {
        Data::Empty => RawCell::from_text(""),
        Data::Float(v) => RawCell::from_number(*v),
        Data::Int(v) => RawCell::from_number(*v as f64),
        Data::String(s) => RawCell::from_text(s.trim()),
        other => RawCell::from_text(other.to_string().trim()),
    }
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
