//! Day-long request windows walking backward from midnight UTC

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Coinbase has no candle data before this day
pub fn history_floor() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2015, 7, 20)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Truncate an instant to midnight UTC of the same day
pub fn midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Half-open time range `[start, end)` requested in a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        DayWindow {
            start: end - Duration::days(1),
            end,
        }
    }

    /// Start as sent in the `start` query parameter
    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// End as sent in the `end` query parameter
    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// Yields contiguous day windows, newest first, until the window end
/// drops below the floor
#[derive(Debug, Clone)]
pub struct WindowCursor {
    end_time: DateTime<Utc>,
    floor: DateTime<Utc>,
}

impl WindowCursor {
    /// Cursor starting at midnight UTC of `now`'s day, stopping at [`history_floor`]
    pub fn from_now(now: DateTime<Utc>) -> Self {
        Self::new(midnight_utc(now), history_floor())
    }

    pub fn new(end_time: DateTime<Utc>, floor: DateTime<Utc>) -> Self {
        WindowCursor { end_time, floor }
    }

    /// End of the next window to be yielded
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Whether the cursor has walked past the floor
    pub fn reached_floor(&self) -> bool {
        self.end_time < self.floor
    }
}

impl Iterator for WindowCursor {
    type Item = DayWindow;

    fn next(&mut self) -> Option<DayWindow> {
        if self.reached_floor() {
            return None;
        }

        let window = DayWindow::ending_at(self.end_time);
        self.end_time = window.start;
        Some(window)
    }
}
