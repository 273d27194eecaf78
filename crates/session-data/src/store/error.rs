use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("no data for symbol '{symbol}' interval '{interval}' on {date}")]
    NotFound {
        symbol: String,
        interval: String,
        date: chrono::NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
