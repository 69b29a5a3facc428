//! CSV output for candle records

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::FetchResult;
use crate::types::CandleRecord;

/// Header row, in column order
pub const CSV_HEADERS: [&str; 8] = [
    "Exchange",
    "Pair",
    "Close Timestamp",
    "Low",
    "High",
    "Open",
    "Close",
    "Volume",
];

/// File name for a run started at `started`: `hourly_candles_YYYYMMDD_HHMMSS.csv`
pub fn csv_filename(started: DateTime<Local>) -> String {
    format!("hourly_candles_{}.csv", started.format("%Y%m%d_%H%M%S"))
}

/// Output path for a run started now, inside `dir`
pub fn unique_csv_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(csv_filename(Local::now()))
}

/// Write all records, with header, to a new file at `path`
pub fn write_records(path: &Path, records: &[CandleRecord]) -> FetchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    // Header written by hand so an empty slice still gets one
    writer.write_record(CSV_HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCandle;
    use chrono::TimeZone;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawCandle {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_csv_filename() {
        let started = Local.with_ymd_and_hms(2024, 9, 3, 7, 5, 9).unwrap();
        assert_eq!(csv_filename(started), "hourly_candles_20240903_070509.csv");
    }

    #[test]
    fn test_filenames_differ_across_seconds() {
        let a = Local.with_ymd_and_hms(2024, 9, 3, 7, 5, 9).unwrap();
        let b = Local.with_ymd_and_hms(2024, 9, 3, 7, 5, 10).unwrap();
        assert_ne!(csv_filename(a), csv_filename(b));
    }

    #[test]
    fn test_write_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let records = vec![
            CandleRecord::from_raw(
                "BTC-USD",
                &raw(json!([1609459200, 29000, 29500, 29200, 29400, 123.4])),
            )
            .unwrap(),
            CandleRecord::from_raw(
                "BTC-USD",
                &raw(json!([1609455600, 28900.5, 29100, 29000.0, 29050.25, 7])),
            )
            .unwrap(),
        ];

        write_records(&path, &records).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Exchange,Pair,Close Timestamp,Low,High,Open,Close,Volume",
                "Coinbase,BTC-USD,2021-01-01T00:00:00+00:00,29000,29500,29200,29400,123.4",
                "Coinbase,BTC-USD,2020-12-31T23:00:00+00:00,28900.5,29100,29000.0,29050.25,7",
            ]
        );
    }
}
