//! Fetch progress observer
//!
//! The fetcher reports what it does through a [`FetchObserver`] instead of
//! logging directly. [`TracingObserver`] turns the events into `tracing`
//! log lines; tests plug in their own implementation.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

use tracing::{error, info};

use crate::error::FetchError;
use crate::fetcher::StopReason;
use crate::window::DayWindow;

pub trait FetchObserver {
    /// Output file chosen for this run
    fn output_planned(&self, _path: &Path) {}

    /// Fetch loop starting from this (midnight UTC) instant
    fn fetch_started(&self, _from: DateTime<Utc>) {}

    /// About to request a window
    fn window_started(&self, _window: &DayWindow) {}

    /// Candles received and buffered for a window
    fn window_fetched(&self, _window: &DayWindow, _count: usize) {}

    /// Fetch loop ended
    fn stopped(&self, _reason: &StopReason) {}

    /// Error raised outside the fetch loop, e.g. while writing output
    fn run_failed(&self, _error: &FetchError) {}

    /// Records written on finalization
    fn written(&self, _path: &Path, _count: usize) {}

    /// Finalization found nothing to write
    fn nothing_written(&self) {}
}

/// Observer that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn output_planned(&self, path: &Path) {
        info!("CSV file will be saved as: {}", path.display());
    }

    fn fetch_started(&self, from: DateTime<Utc>) {
        info!(
            "Starting data fetch from {} (midnight UTC)",
            from.to_rfc3339_opts(SecondsFormat::Secs, false)
        );
    }

    fn window_started(&self, window: &DayWindow) {
        info!("Fetching candles from {} to {}", window.start_param(), window.end_param());
    }

    fn window_fetched(&self, window: &DayWindow, count: usize) {
        info!("Fetched {} candles for {}", count, window.end_param());
        info!("Moving to the previous day: {}", window.start_param());
    }

    fn stopped(&self, reason: &StopReason) {
        match reason {
            StopReason::RequestFailed(e)
            | StopReason::MalformedResponse(e)
            | StopReason::Aborted(e) => error!("{}", e),
            StopReason::NoMoreData => info!("No data available for this time period, stopping."),
            StopReason::ReachedFloor => info!("Reached the stopping date (2015-07-20), exiting."),
            StopReason::Interrupted => info!("Interrupt detected, writing data to CSV..."),
        }
    }

    fn run_failed(&self, error: &FetchError) {
        error!("{}", error);
    }

    fn written(&self, path: &Path, count: usize) {
        info!("Successfully wrote {} records to {}", count, path.display());
    }

    fn nothing_written(&self) {
        info!("No data to write.");
    }
}
