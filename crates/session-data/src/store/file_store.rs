//! Columnar bar storage. Files are laid out by interval and symbol so that a
//! single day's (or year's) worth of bars can be read or rewritten without
//! touching the rest of the archive:
//!
//! ```text
//! <root>/bars/<interval>/<SYMBOL>/<year>/<month>/<day>.parquet   (sub-daily)
//! <root>/bars/<interval>/<SYMBOL>/<year>.parquet                 (daily and up)
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;

use super::error::{Result, StoreError};
use crate::interval::{Interval, IntervalUnit};
use crate::models::Bar;

fn bar_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("volume", DataType::Int64, false),
    ]))
}

fn bars_to_record_batch(bars: &[Bar]) -> Result<RecordBatch> {
    let timestamps: Vec<i64> = bars
        .iter()
        .map(|b| b.timestamp.and_utc().timestamp_millis())
        .collect();
    let open: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volume: Vec<i64> = bars.iter().map(|b| b.volume).collect();

    let batch = RecordBatch::try_new(
        bar_schema(),
        vec![
            Arc::new(TimestampMillisecondArray::from(timestamps)),
            Arc::new(Float64Array::from(open)),
            Arc::new(Float64Array::from(high)),
            Arc::new(Float64Array::from(low)),
            Arc::new(Float64Array::from(close)),
            Arc::new(Int64Array::from(volume)),
        ],
    )?;
    Ok(batch)
}

fn record_batch_to_bars(batch: &RecordBatch) -> Result<Vec<Bar>> {
    let timestamps = batch
        .column(0)
        .as_any()
        .downcast_ref::<TimestampMillisecondArray>()
        .expect("column 0 is timestamp");
    let open = batch.column(1).as_any().downcast_ref::<Float64Array>().unwrap();
    let high = batch.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
    let low = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
    let close = batch.column(4).as_any().downcast_ref::<Float64Array>().unwrap();
    let volume = batch.column(5).as_any().downcast_ref::<Int64Array>().unwrap();

    let mut bars = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let millis = timestamps.value(i);
        let timestamp = chrono::DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| {
                StoreError::Arrow(arrow::error::ArrowError::CastError(format!(
                    "invalid timestamp millis: {millis}"
                )))
            })?
            .naive_utc();
        bars.push(Bar::new(
            timestamp,
            open.value(i),
            high.value(i),
            low.value(i),
            close.value(i),
            volume.value(i),
        ));
    }
    Ok(bars)
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, interval: Interval, symbol: &str, date: NaiveDate) -> PathBuf {
        let base = self.root.join("bars").join(interval.as_token()).join(symbol);
        match interval.unit {
            IntervalUnit::Day | IntervalUnit::Week => {
                base.join(format!("{}.parquet", date.year()))
            }
            _ => base
                .join(format!("{:04}", date.year()))
                .join(format!("{:02}", date.month()))
                .join(format!("{:02}.parquet", date.day())),
        }
    }

    /// Writes `bars` for `date`, merging with any bars already on disk for
    /// that file and re-sorting by timestamp. Duplicate timestamps keep the
    /// incoming value.
    pub fn write_bars(
        &self,
        interval: Interval,
        symbol: &str,
        date: NaiveDate,
        bars: &[Bar],
    ) -> Result<()> {
        if bars.is_empty() {
            return Ok(());
        }
        let path = self.path_for(interval, symbol, date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut merged = if path.exists() {
            self.read_bars_at(&path)?
        } else {
            Vec::new()
        };
        merged.retain(|existing| !bars.iter().any(|b| b.timestamp == existing.timestamp));
        merged.extend_from_slice(bars);
        merged.sort_by_key(|b| b.timestamp);

        let batch = bars_to_record_batch(&merged)?;
        let file = File::create(&path)?;
        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    pub fn read_bars(&self, interval: Interval, symbol: &str, date: NaiveDate) -> Result<Vec<Bar>> {
        let path = self.path_for(interval, symbol, date);
        if !path.exists() {
            return Err(StoreError::NotFound {
                symbol: symbol.to_string(),
                interval: interval.as_token(),
                date,
            });
        }
        self.read_bars_at(&path)
    }

    fn read_bars_at(&self, path: &Path) -> Result<Vec<Bar>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let mut bars = Vec::new();
        for batch in reader {
            bars.extend(record_batch_to_bars(&batch?)?);
        }
        Ok(bars)
    }
}
