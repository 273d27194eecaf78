use session_data::import::CsvImporter;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(content.as_bytes()).expect("failed to write temp file");
    file.flush().expect("failed to flush temp file");
    file
}

#[test]
fn imports_a_small_valid_file() {
    let csv = "symbol,timestamp,open,high,low,close,volume\n\
               AAPL,2024-01-02 09:30:00,100.0,101.0,99.5,100.5,12000\n\
               AAPL,2024-01-02 09:31:00,100.5,101.5,100.0,101.0,9000\n\
               MSFT,2024-01-02 09:30:00,300.0,301.0,299.0,300.5,5000\n";
    let file = write_csv(csv);
    let importer = CsvImporter::new();
    let (bars, summary) = importer.import_file(file.path()).expect("import failed");

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.rows_imported, 3);
    assert_eq!(summary.rows_skipped, 0);
    assert_eq!(summary.success_rate(), 100.0);
    assert_eq!(bars.iter().filter(|b| b.symbol == "AAPL").count(), 2);
    assert_eq!(bars.iter().filter(|b| b.symbol == "MSFT").count(), 1);
}

#[test]
fn skips_invalid_rows_and_reports_them() {
    let csv = "symbol,timestamp,open,high,low,close,volume\n\
               AAPL,2024-01-02 09:30:00,100.0,101.0,99.5,100.5,12000\n\
               AAPL,not-a-timestamp,100.5,101.5,100.0,101.0,9000\n\
               AAPL,2024-01-02 09:32:00,100.0,98.0,99.0,100.0,1000\n\
               AAPL,2024-01-02 09:33:00,101.0,102.0,100.5,101.5,4000\n";
    let file = write_csv(csv);
    let importer = CsvImporter::new();
    let (bars, summary) = importer.import_file(file.path()).expect("import failed");

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.rows_imported, 2);
    assert_eq!(summary.rows_skipped, 2);
    assert_eq!(bars.len(), 2);
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.success_rate() < 100.0);
}

#[test]
fn empty_file_imports_nothing() {
    let csv = "symbol,timestamp,open,high,low,close,volume\n";
    let file = write_csv(csv);
    let importer = CsvImporter::new();
    let (bars, summary) = importer.import_file(file.path()).expect("import failed");

    assert_eq!(summary.total_rows, 0);
    assert!(bars.is_empty());
    assert_eq!(summary.success_rate(), 0.0);
}
