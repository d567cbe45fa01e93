//! Tabular dataset model and CSV ingestion.
//!
//! Rows arrive with an arbitrary, unknown column set; the header row of the
//! CSV (or the column list of a generated sample) defines the column order for
//! the whole dataset. Cells are parsed once at ingestion into a tagged
//! [`Value`], so downstream classification and feature extraction never
//! re-inspect raw strings for type information.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

/// A single cell value.
///
/// Numeric-looking text is promoted to `Number` at parse time; empty cells
/// (and cells missing from short rows) are `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Parse a raw CSV cell into a tagged value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Value::Missing => None,
        }
    }

    /// Text view of the value, if it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// An ordered, finite sequence of rows sharing one column set.
///
/// Row order is arrival order (CSV row order) and is preserved through the
/// whole analysis pipeline. Rows shorter than the header are padded with
/// [`Value::Missing`]; surplus cells are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, aligning it to the column set.
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Missing);
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Cell lookup by row and column index.
    pub fn value_at(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Load a dataset from a CSV file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.as_ref().display()))?;
        Self::from_reader(file)
    }

    /// Parse CSV content from any reader.
    ///
    /// Parsing is permissive: rows with a deviant cell count are aligned to
    /// the header, and rows the CSV parser rejects outright are skipped with
    /// a warning rather than failing the whole upload. A header row and at
    /// least one data row are required.
    pub fn from_reader<R: Read>(reader: R) -> crate::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|e| anyhow::anyhow!("failed to parse CSV header row: {e}"))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            anyhow::bail!("CSV input has an empty header row");
        }

        let mut dataset = Dataset::new(columns);
        let mut skipped = 0usize;
        for (line, record) in csv_reader.records().enumerate() {
            match record {
                Ok(record) => {
                    dataset.push_row(record.iter().map(Value::parse).collect());
                }
                Err(e) => {
                    skipped += 1;
                    log::warn!("skipping malformed CSV row {}: {e}", line + 2);
                }
            }
        }
        if skipped > 0 {
            log::info!(
                "CSV ingestion: {} rows parsed, {skipped} malformed rows skipped",
                dataset.len()
            );
        }

        if dataset.is_empty() {
            anyhow::bail!("CSV input has no data rows; at least one is required");
        }
        Ok(dataset)
    }
}
