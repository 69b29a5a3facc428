//! Coinbase historical candles
//!
//! Fetches candles for one trading pair from the Coinbase Exchange public API,
//! one day per request walking backward from today's midnight UTC, and writes
//! everything received to a timestamped CSV file when the walk ends.
//!
//! ```no_run
//! use coinbase_candles::coinbase::CoinbaseClient;
//! use coinbase_candles::{CandleFetcher, FetcherConfig, TracingObserver};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = FetcherConfig::new("BTC-USD", 3600);
//!     let client = CoinbaseClient::new()?;
//!     let report = CandleFetcher::new(client, config).run(&TracingObserver)?;
//!     println!("{} records, stopped: {:?}", report.records_written, report.stop);
//!     Ok(())
//! }
//! ```

pub mod coinbase;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod observer;
pub mod output;
pub mod shutdown;
pub mod types;
pub mod window;

pub use config::FetcherConfig;
pub use error::{FetchError, FetchResult};
pub use fetcher::{CandleBuffer, CandleFetcher, CandleSource, RunReport, StopReason};
pub use observer::{FetchObserver, TracingObserver};
pub use shutdown::ShutdownFlag;
pub use types::*;
