//! Forecast time window.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// A half-open UTC time window `[start, end)` covered by a forecast.
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use driftcast::types::ForecastWindow;
///
/// let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
/// let window = ForecastWindow::from_start(start, Duration::hours(72));
///
/// assert_eq!(window.duration_seconds(), 72.0 * 3600.0);
/// assert_eq!(window.file_stamp(), "20240301T060000_20240304T060000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    /// Window start (UTC)
    pub start: DateTime<Utc>,
    /// Window end (UTC)
    pub end: DateTime<Utc>,
}

impl ForecastWindow {
    /// Create a window from explicit start and end.
    ///
    /// # Panics
    ///
    /// Panics if `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(end > start, "window end ({}) must be after start ({})", end, start);
        Self { start, end }
    }

    /// Create a window starting at `start` with the given duration.
    pub fn from_start(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Window duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Window duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64
    }

    /// Check whether an instant falls inside the window.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Compact `start_end` stamp for output file names,
    /// e.g. `20240301T060000_20240304T060000`.
    pub fn file_stamp(&self) -> String {
        format!(
            "{}_{}",
            self.start.format("%Y%m%dT%H%M%S"),
            self.end.format("%Y%m%dT%H%M%S")
        )
    }
}

impl fmt::Display for ForecastWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 15, 0).unwrap();
        let window = ForecastWindow::from_start(start, Duration::hours(72));

        assert_eq!(window.duration(), Duration::hours(72));
        assert_eq!(window.duration_seconds(), 259_200.0);
    }

    #[test]
    fn test_contains() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let window = ForecastWindow::from_start(start, Duration::hours(24));

        assert!(window.contains(start));
        assert!(window.contains(start + Duration::hours(12)));
        // Half-open: the end instant is excluded
        assert!(!window.contains(window.end));
        assert!(!window.contains(start - Duration::seconds(1)));
    }

    #[test]
    #[should_panic(expected = "must be after")]
    fn test_inverted_window() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        ForecastWindow::new(start, start);
    }
}
