//! Core data types for candle fetching
//!
//! Raw API tuples, validated granularity and the output row.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

use crate::error::{FetchError, FetchResult};

/// Fixed exchange label written into every row
pub const EXCHANGE_NAME: &str = "Coinbase";

/// Candle widths (seconds) accepted by the Coinbase candles endpoint
pub const ALLOWED_GRANULARITIES: [u32; 6] = [60, 300, 900, 3600, 21600, 86400];

// =============================================================================
// Granularity
// =============================================================================

/// Candle bucket width in seconds, restricted to [`ALLOWED_GRANULARITIES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Granularity(u32);

impl Granularity {
    pub const ONE_HOUR: Granularity = Granularity(3600);
    pub const ONE_DAY: Granularity = Granularity(86400);

    /// Validate a width in seconds
    pub fn new(seconds: u32) -> FetchResult<Self> {
        if ALLOWED_GRANULARITIES.contains(&seconds) {
            Ok(Granularity(seconds))
        } else {
            Err(FetchError::InvalidGranularity(seconds))
        }
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Granularity {
    type Error = FetchError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Granularity::new(seconds)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// =============================================================================
// Raw API candle
// =============================================================================

/// One candle as returned by the API:
/// `[time, low, high, open, close, volume]`, time in epoch seconds
///
/// Prices stay JSON numbers so they are written back exactly as received
/// (`29000` stays `29000`, not `29000.0`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCandle(pub i64, pub Number, pub Number, pub Number, pub Number, pub Number);

impl RawCandle {
    pub fn time(&self) -> i64 {
        self.0
    }

    pub fn low(&self) -> &Number {
        &self.1
    }

    pub fn high(&self) -> &Number {
        &self.2
    }

    pub fn open(&self) -> &Number {
        &self.3
    }

    pub fn close(&self) -> &Number {
        &self.4
    }

    pub fn volume(&self) -> &Number {
        &self.5
    }
}

// =============================================================================
// Output record
// =============================================================================

/// One row of the output CSV
///
/// Field renames double as the header row, so declaration order is the
/// column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRecord {
    #[serde(rename = "Exchange")]
    exchange: &'static str,
    #[serde(rename = "Pair")]
    pair: String,
    #[serde(rename = "Close Timestamp")]
    close_timestamp: String,
    #[serde(rename = "Low")]
    low: Number,
    #[serde(rename = "High")]
    high: Number,
    #[serde(rename = "Open")]
    open: Number,
    #[serde(rename = "Close")]
    close: Number,
    #[serde(rename = "Volume")]
    volume: Number,
}

impl CandleRecord {
    /// Build a record for `pair` from a raw API candle
    ///
    /// Fails with [`FetchError::ResponseParse`] if the timestamp is outside
    /// the range chrono can represent.
    pub fn from_raw(pair: &str, raw: &RawCandle) -> FetchResult<Self> {
        let datetime = DateTime::<Utc>::from_timestamp(raw.time(), 0).ok_or_else(|| {
            FetchError::ResponseParse(format!("candle timestamp out of range: {}", raw.time()))
        })?;

        Ok(CandleRecord {
            exchange: EXCHANGE_NAME,
            pair: pair.to_string(),
            close_timestamp: datetime.to_rfc3339_opts(SecondsFormat::Secs, false),
            low: raw.low().clone(),
            high: raw.high().clone(),
            open: raw.open().clone(),
            close: raw.close().clone(),
            volume: raw.volume().clone(),
        })
    }

    pub fn exchange(&self) -> &str {
        self.exchange
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// ISO-8601 UTC timestamp with explicit `+00:00` offset
    pub fn close_timestamp(&self) -> &str {
        &self.close_timestamp
    }

    pub fn low(&self) -> &Number {
        &self.low
    }

    pub fn high(&self) -> &Number {
        &self.high
    }

    pub fn open(&self) -> &Number {
        &self.open
    }

    pub fn close(&self) -> &Number {
        &self.close
    }

    pub fn volume(&self) -> &Number {
        &self.volume
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allowed_granularities_validate() {
        for seconds in ALLOWED_GRANULARITIES {
            let granularity = Granularity::new(seconds).unwrap();
            assert_eq!(granularity.seconds(), seconds);
        }
    }

    #[test]
    fn test_other_granularities_rejected() {
        for seconds in [0, 1, 59, 61, 120, 1800, 3599, 7200, 43200, 86401, u32::MAX] {
            match Granularity::try_from(seconds) {
                Err(FetchError::InvalidGranularity(value)) => assert_eq!(value, seconds),
                other => panic!("expected InvalidGranularity for {}, got {:?}", seconds, other),
            }
        }
    }

    #[test]
    fn test_record_from_raw() {
        let raw: RawCandle =
            serde_json::from_value(json!([1609459200, 29000, 29500, 29200, 29400, 123.4])).unwrap();
        let record = CandleRecord::from_raw("BTC-USD", &raw).unwrap();

        assert_eq!(record.exchange(), "Coinbase");
        assert_eq!(record.pair(), "BTC-USD");
        assert_eq!(record.close_timestamp(), "2021-01-01T00:00:00+00:00");
        assert_eq!(record.low().to_string(), "29000");
        assert_eq!(record.high().to_string(), "29500");
        assert_eq!(record.open().to_string(), "29200");
        assert_eq!(record.close().to_string(), "29400");
        assert_eq!(record.volume().to_string(), "123.4");
    }

    #[test]
    fn test_raw_candle_deserializes_integers_and_floats() {
        let raw: RawCandle =
            serde_json::from_str("[1609459200, 29000, 29500.5, 29200, 29400, 123.4]").unwrap();
        assert_eq!(raw.time(), 1609459200);
        assert_eq!(raw.low().as_u64(), Some(29000));
        assert_eq!(raw.high().as_f64(), Some(29500.5));
        assert_eq!(raw.volume().as_f64(), Some(123.4));
    }

    #[test]
    fn test_raw_candle_rejects_wrong_arity() {
        assert!(serde_json::from_str::<RawCandle>("[1609459200, 1, 2, 3, 4]").is_err());
        assert!(serde_json::from_str::<RawCandle>("[1609459200, 1, 2, 3, 4, 5, 6]").is_err());
    }

    #[test]
    fn test_record_rejects_out_of_range_timestamp() {
        let raw: RawCandle = serde_json::from_value(json!([i64::MAX, 1, 1, 1, 1, 1])).unwrap();
        assert!(matches!(
            CandleRecord::from_raw("BTC-USD", &raw),
            Err(FetchError::ResponseParse(_))
        ));
    }
}
