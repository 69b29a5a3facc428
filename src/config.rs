//! Fetcher configuration
//!
//! Defaults reproduce the stock job: hourly BTC-USD candles written to the
//! working directory. The API host belongs to the client, not to this struct.

use std::path::{Path, PathBuf};

pub const DEFAULT_PAIR: &str = "BTC-USD";
pub const DEFAULT_GRANULARITY: u32 = 3600;

/// Parameters for one fetch run
///
/// `granularity` stays a raw integer here; it is validated when the run
/// starts, before any request goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub pair: String,
    pub granularity: u32,
    pub output_dir: PathBuf,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            pair: DEFAULT_PAIR.to_string(),
            granularity: DEFAULT_GRANULARITY,
            output_dir: PathBuf::from("."),
        }
    }
}

impl FetcherConfig {
    pub fn new(pair: impl Into<String>, granularity: u32) -> Self {
        FetcherConfig {
            pair: pair.into(),
            granularity,
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
}
