//! Coinbase API client for fetching historical candles
//!
//! One blocking GET per day window. Idle connections are not kept, so every
//! request opens a fresh connection.
//!
//! # Example
//! ```no_run
//! use chrono::Utc;
//! use coinbase_candles::coinbase::CoinbaseClient;
//! use coinbase_candles::window::WindowCursor;
//! use coinbase_candles::Granularity;
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = CoinbaseClient::new()?;
//!     let window = WindowCursor::from_now(Utc::now()).next().unwrap();
//!     let candles = client.get_candles("BTC-USD", &window, Granularity::ONE_HOUR)?;
//!     println!("Fetched {} candles", candles.len());
//!     Ok(())
//! }
//! ```

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT as USER_AGENT_HEADER};
use reqwest::StatusCode;
use std::time::Duration as StdDuration;
use tracing::{debug, info};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::CandleSource;
use crate::types::{Granularity, RawCandle};
use crate::window::DayWindow;

/// Base URL for the Coinbase Exchange API
pub const COINBASE_API_BASE: &str = "https://api.exchange.coinbase.com";

/// Client identifier sent with every request
pub const USER_AGENT: &str = "bitcoin_hourly_price_fetcher/1.0";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Coinbase API client
#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    client: Client,
    base_url: String,
}

impl CoinbaseClient {
    /// Create a client for the public Coinbase host
    pub fn new() -> FetchResult<Self> {
        Self::with_base_url(COINBASE_API_BASE)
    }

    /// Create a client against a different host (e.g. sandbox)
    pub fn with_base_url(base_url: impl Into<String>) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(CoinbaseClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Candles endpoint for a pair, e.g. `.../products/BTC-USD/candles`
    pub fn candles_url(&self, pair: &str) -> String {
        format!("{}/products/{}/candles", self.base_url, pair)
    }

    /// Query parameters for one window
    pub fn query_params(window: &DayWindow, granularity: Granularity) -> Vec<(&'static str, String)> {
        vec![
            ("start", window.start_param()),
            ("end", window.end_param()),
            ("granularity", granularity.seconds().to_string()),
        ]
    }

    /// Fetch the candles for one window
    ///
    /// # Errors
    /// * [`FetchError::RequestFailure`] - request could not be sent or the body not read
    /// * [`FetchError::HttpStatus`] - any status other than 200
    /// * [`FetchError::ResponseParse`] - body is not an array of 6-element candles
    pub fn get_candles(
        &self,
        pair: &str,
        window: &DayWindow,
        granularity: Granularity,
    ) -> FetchResult<Vec<RawCandle>> {
        let url = self.candles_url(pair);
        let params = Self::query_params(window, granularity);

        debug!("Built URL: {} {:?}", url, params);
        debug!(
            "Request headers: Content-Type=application/json, User-Agent={}",
            USER_AGENT
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT_HEADER, USER_AGENT)
            .send()?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        info!("Received response with status: {} {}", status.as_u16(), reason);

        let body = response.text()?;
        debug!("Response body: {}", body);

        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason,
            });
        }

        parse_candles(&body)
    }
}

impl CandleSource for CoinbaseClient {
    fn fetch_candles(
        &self,
        pair: &str,
        window: &DayWindow,
        granularity: Granularity,
    ) -> FetchResult<Vec<RawCandle>> {
        self.get_candles(pair, window, granularity)
    }
}

/// Parse a candles response body
///
/// Anything other than a JSON array of `[time, low, high, open, close, volume]`
/// arrays is a [`FetchError::ResponseParse`].
pub fn parse_candles(body: &str) -> FetchResult<Vec<RawCandle>> {
    let candles: Vec<RawCandle> = serde_json::from_str(body)?;
    Ok(candles)
}
