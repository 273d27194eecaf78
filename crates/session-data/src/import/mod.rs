pub mod csv_import;
pub mod validator;

pub use csv_import::{CsvImporter, ImportError, ImportSummary, ImportedBar};
pub use validator::{validate_bar_fields, ValidationError};
