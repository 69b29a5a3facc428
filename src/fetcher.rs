//! Candle fetch loop
//!
//! Walks backward one day at a time, buffering every candle received, and
//! writes the buffer to CSV exactly once when the loop ends, whatever ended it.
//!
//! The loop stops on the first of:
//! - request could not be sent ([`StopReason::RequestFailed`])
//! - non-200 status ([`StopReason::Aborted`])
//! - body is not a candle array ([`StopReason::MalformedResponse`])
//! - empty candle array ([`StopReason::NoMoreData`])
//! - window end before 2015-07-20 ([`StopReason::ReachedFloor`])
//! - shutdown requested ([`StopReason::Interrupted`])

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::config::FetcherConfig;
use crate::error::{FetchError, FetchResult};
use crate::observer::FetchObserver;
use crate::output::{unique_csv_path, write_records};
use crate::shutdown::ShutdownFlag;
use crate::types::{CandleRecord, Granularity, RawCandle};
use crate::window::{DayWindow, WindowCursor};

// =============================================================================
// Candle source
// =============================================================================

/// Something that can return the raw candles for one window
pub trait CandleSource {
    fn fetch_candles(
        &self,
        pair: &str,
        window: &DayWindow,
        granularity: Granularity,
    ) -> FetchResult<Vec<RawCandle>>;
}

impl<S: CandleSource + ?Sized> CandleSource for &S {
    fn fetch_candles(
        &self,
        pair: &str,
        window: &DayWindow,
        granularity: Granularity,
    ) -> FetchResult<Vec<RawCandle>> {
        (**self).fetch_candles(pair, window, granularity)
    }
}

// =============================================================================
// Stop reason and report
// =============================================================================

/// Why the fetch loop ended
#[derive(Debug)]
pub enum StopReason {
    RequestFailed(FetchError),
    MalformedResponse(FetchError),
    NoMoreData,
    ReachedFloor,
    Interrupted,
    /// Run-level failure (non-200 status); buffered data is still written
    Aborted(FetchError),
}

impl StopReason {
    fn from_error(err: FetchError) -> Self {
        match err {
            FetchError::RequestFailure(_) => StopReason::RequestFailed(err),
            FetchError::ResponseParse(_) => StopReason::MalformedResponse(err),
            FetchError::Interrupted => StopReason::Interrupted,
            other => StopReason::Aborted(other),
        }
    }

    /// Error that aborted the run, if any
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            StopReason::Aborted(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of one run
#[derive(Debug)]
pub struct RunReport {
    pub stop: StopReason,
    /// Windows that returned at least one candle
    pub windows_fetched: usize,
    pub records_written: usize,
    /// File written, `None` when there was nothing to write
    pub output: Option<PathBuf>,
}

// =============================================================================
// Accumulation buffer
// =============================================================================

/// Append-only record buffer bound to the run's output file
///
/// Call [`CandleBuffer::finalize`] to write it. If the buffer is dropped
/// without that (e.g. while unwinding) it is written on drop.
pub struct CandleBuffer<'a> {
    records: Vec<CandleRecord>,
    path: PathBuf,
    observer: &'a dyn FetchObserver,
    finalized: bool,
}

impl<'a> CandleBuffer<'a> {
    pub fn new(path: impl Into<PathBuf>, observer: &'a dyn FetchObserver) -> Self {
        CandleBuffer {
            records: Vec::new(),
            path: path.into(),
            observer,
            finalized: false,
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = CandleRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write all records, or nothing if empty; returns the written path
    pub fn finalize(mut self) -> FetchResult<Option<PathBuf>> {
        self.write_out()
    }

    fn write_out(&mut self) -> FetchResult<Option<PathBuf>> {
        self.finalized = true;

        if self.records.is_empty() {
            self.observer.nothing_written();
            return Ok(None);
        }

        write_records(&self.path, &self.records)?;
        self.observer.written(&self.path, self.records.len());
        Ok(Some(self.path.clone()))
    }
}

impl Drop for CandleBuffer<'_> {
    fn drop(&mut self) {
        if !self.finalized {
            if let Err(e) = self.write_out() {
                self.observer.run_failed(&e);
            }
        }
    }
}

// =============================================================================
// Fetcher
// =============================================================================

/// Runs the backward paginated fetch against a [`CandleSource`]
pub struct CandleFetcher<S> {
    source: S,
    config: FetcherConfig,
    shutdown: ShutdownFlag,
}

impl<S: CandleSource> CandleFetcher<S> {
    pub fn new(source: S, config: FetcherConfig) -> Self {
        CandleFetcher {
            source,
            config,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Use an externally owned shutdown flag (e.g. wired to Ctrl+C)
    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Fetch from today's midnight UTC back to the history floor and write
    /// the result to a fresh `hourly_candles_<timestamp>.csv`
    ///
    /// Returns `Err` only for invalid input or when the output cannot be
    /// written; every in-loop failure ends up in [`RunReport::stop`].
    pub fn run(&self, observer: &dyn FetchObserver) -> FetchResult<RunReport> {
        let granularity = Granularity::new(self.config.granularity)?;
        let output_path = unique_csv_path(&self.config.output_dir);

        self.run_with(
            granularity,
            &output_path,
            WindowCursor::from_now(Utc::now()),
            observer,
        )
    }

    /// Same as [`run`](Self::run) with explicit windows and output path
    pub fn run_with(
        &self,
        granularity: Granularity,
        output_path: &Path,
        windows: WindowCursor,
        observer: &dyn FetchObserver,
    ) -> FetchResult<RunReport> {
        observer.output_planned(output_path);
        observer.fetch_started(windows.end_time());

        let mut buffer = CandleBuffer::new(output_path, observer);
        let (stop, windows_fetched) = self.fetch_into(granularity, windows, &mut buffer, observer);
        observer.stopped(&stop);

        let records = buffer.len();
        let output = buffer.finalize()?;

        Ok(RunReport {
            stop,
            windows_fetched,
            records_written: if output.is_some() { records } else { 0 },
            output,
        })
    }

    fn fetch_into(
        &self,
        granularity: Granularity,
        windows: WindowCursor,
        buffer: &mut CandleBuffer<'_>,
        observer: &dyn FetchObserver,
    ) -> (StopReason, usize) {
        let mut fetched = 0;

        for window in windows {
            if self.shutdown.is_shutdown_requested() {
                return (StopReason::Interrupted, fetched);
            }

            observer.window_started(&window);

            match self.fetch_window(&window, granularity) {
                Ok(records) if records.is_empty() => return (StopReason::NoMoreData, fetched),
                Ok(records) => {
                    let count = records.len();
                    buffer.extend(records);
                    fetched += 1;
                    observer.window_fetched(&window, count);
                }
                Err(err) => return (StopReason::from_error(err), fetched),
            }

            if self.shutdown.is_shutdown_requested() {
                return (StopReason::Interrupted, fetched);
            }
        }

        (StopReason::ReachedFloor, fetched)
    }

    fn fetch_window(
        &self,
        window: &DayWindow,
        granularity: Granularity,
    ) -> FetchResult<Vec<CandleRecord>> {
        let pair = &self.config.pair;
        self.source
            .fetch_candles(pair, window, granularity)?
            .iter()
            .map(|raw| CandleRecord::from_raw(pair, raw))
            .collect()
    }
}
