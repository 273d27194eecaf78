use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use csv::Reader;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::validator::{validate_bar_fields, ValidationError};
use crate::models::Bar;

const BATCH_SIZE: usize = 1000;
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("file too large: {0} bytes (max: {MAX_FILE_SIZE} bytes)")]
    FileTooLarge(u64),

    #[error("line {line}: validation failed: {error}")]
    ValidationError { line: usize, error: ValidationError },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("timestamp parse error on line {line}: '{value}'")]
    TimestampError { line: usize, value: String },
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub file_path: PathBuf,
    pub total_rows: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl ImportSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_imported as f64 / self.total_rows as f64) * 100.0
        }
    }
}

/// A bar imported from a CSV row, still carrying the symbol column — the
/// caller fans these out into whatever `BarIntervalData` map they belong to.
#[derive(Debug, Clone)]
pub struct ImportedBar {
    pub symbol: String,
    pub bar: Bar,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

/// Loads a `symbol,timestamp,open,high,low,close,volume` CSV into `Bar`s.
/// Stateless — this is a one-shot batch loader, not a store-backed importer;
/// the caller hands the result to whatever store or aggregation step it needs.
#[derive(Default)]
pub struct CsvImporter;

impl CsvImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_file(&self, path: &Path) -> Result<(Vec<ImportedBar>, ImportSummary), ImportError> {
        let start_time = Instant::now();

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ImportError::FileTooLarge(metadata.len()));
        }

        info!("starting CSV import from {}", path.display());

        let file = File::open(path)?;
        let mut reader = Reader::from_reader(file);

        let mut bars = Vec::with_capacity(BATCH_SIZE);
        let mut total_rows = 0;
        let mut rows_imported = 0;
        let mut rows_skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            total_rows += 1;
            let line = line_num + 2;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!(line, error = %e, "failed to parse CSV row");
                    errors.push(format!("line {line}: parse error: {e}"));
                    rows_skipped += 1;
                    continue;
                }
            };

            if let Err(e) = validate_bar_fields(row.open, row.high, row.low, row.close, row.volume) {
                warn!(line, error = %e, "bar failed validation");
                errors.push(format!("line {line}: {e}"));
                rows_skipped += 1;
                continue;
            }

            let timestamp = match parse_timestamp(&row.timestamp) {
                Some(ts) => ts,
                None => {
                    warn!(line, value = %row.timestamp, "unparseable timestamp");
                    errors.push(format!("line {line}: unparseable timestamp '{}'", row.timestamp));
                    rows_skipped += 1;
                    continue;
                }
            };

            bars.push(ImportedBar {
                symbol: row.symbol,
                bar: Bar::new(timestamp, row.open, row.high, row.low, row.close, row.volume),
            });
            rows_imported += 1;

            if total_rows % 10_000 == 0 {
                debug!(total_rows, "import progress");
            }
        }

        let duration = start_time.elapsed();
        let summary = ImportSummary {
            file_path: path.to_path_buf(),
            total_rows,
            rows_imported,
            rows_skipped,
            errors: errors.into_iter().take(100).collect(),
            duration,
        };

        info!(
            imported = summary.rows_imported,
            skipped = summary.rows_skipped,
            success_rate = summary.success_rate(),
            "import completed"
        );

        Ok((bars, summary))
    }
}

fn parse_timestamp(raw: &str) -> Option<chrono::NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt);
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes()).expect("failed to write temp file");
        file
    }

    #[test]
    fn imports_valid_rows() {
        let content = "symbol,timestamp,open,high,low,close,volume\n\
                        AAPL,2024-01-02 09:30:00,100.0,101.0,99.5,100.5,12000\n\
                        AAPL,2024-01-02 09:31:00,100.5,101.5,100.0,101.0,9000\n";
        let file = create_csv_file(content);
        let importer = CsvImporter::new();
        let (bars, summary) = importer.import_file(file.path()).unwrap();

        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.rows_imported, 2);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].symbol, "AAPL");
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn skips_invalid_rows_but_keeps_going() {
        let content = "symbol,timestamp,open,high,low,close,volume\n\
                        AAPL,2024-01-02 09:30:00,100.0,101.0,99.5,100.5,12000\n\
                        AAPL,2024-01-02 09:31:00,100.0,98.0,99.0,100.0,1000\n\
                        AAPL,2024-01-02 09:32:00,100.5,101.5,100.0,101.0,9000\n";
        let file = create_csv_file(content);
        let importer = CsvImporter::new();
        let (bars, summary) = importer.import_file(file.path()).unwrap();

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.rows_imported, 2);
        assert_eq!(summary.rows_skipped, 1);
        assert_eq!(bars.len(), 2);
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn empty_file_is_not_an_error() {
        let content = "symbol,timestamp,open,high,low,close,volume\n";
        let file = create_csv_file(content);
        let importer = CsvImporter::new();
        let (bars, summary) = importer.import_file(file.path()).unwrap();

        assert_eq!(summary.total_rows, 0);
        assert!(bars.is_empty());
    }
}
