//! Coinbase Exchange public API client for historical candles
//! No API key needed for the candles endpoint.

mod client;

pub use client::{parse_candles, CoinbaseClient, COINBASE_API_BASE, USER_AGENT};
