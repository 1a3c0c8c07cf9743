//! Release schedule CSV reader.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use crate::types::{ForecastWindow, GeoBoundingBox};

/// Error type for schedule parsing.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header
    #[error("Column '{0}' not found in schedule header")]
    MissingColumn(String),

    /// Parse error with row number (1-based, excluding the header)
    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    /// No data rows
    #[error("Schedule contains no release entries")]
    Empty,
}

/// One row of the release schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseEntry {
    /// Release group identifier
    pub release_id: u32,
    /// Latitude in degrees north
    pub lat: f64,
    /// Longitude in degrees east
    pub lon: f64,
    /// Time of day (UTC) the entry is released
    pub release_time: NaiveTime,
}

/// A unique release location: the first scheduled entry per `release_id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseSite {
    /// Release group identifier
    pub release_id: u32,
    /// Latitude in degrees north
    pub lat: f64,
    /// Longitude in degrees east
    pub lon: f64,
    /// First scheduled release time for this site
    pub release_time: NaiveTime,
}

/// A parsed release schedule.
#[derive(Debug, Clone)]
pub struct ReleaseSchedule {
    entries: Vec<ReleaseEntry>,
}

impl ReleaseSchedule {
    /// Read a schedule from a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScheduleError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a schedule from any reader producing CSV with a header row
    /// `release_id,lat,lon,release_time` (column order is free).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScheduleError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let id_idx = resolve_column(&headers, "release_id")?;
        let lat_idx = resolve_column(&headers, "lat")?;
        let lon_idx = resolve_column(&headers, "lon")?;
        let time_idx = resolve_column(&headers, "release_time")?;

        let mut entries = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let row = row_idx + 1;
            let record = result?;

            let release_id = parse_field::<u32>(&record, id_idx, row, "release_id")?;
            let lat = parse_field::<f64>(&record, lat_idx, row, "lat")?;
            let lon = parse_field::<f64>(&record, lon_idx, row, "lon")?;

            let time_str = record.get(time_idx).ok_or_else(|| ScheduleError::Parse {
                row,
                message: "Missing release_time value".into(),
            })?;
            let release_time = NaiveTime::parse_from_str(time_str, "%H:%M:%S").map_err(|_| {
                ScheduleError::Parse {
                    row,
                    message: format!("Invalid release_time '{}' (expected HH:MM:SS)", time_str),
                }
            })?;

            entries.push(ReleaseEntry {
                release_id,
                lat,
                lon,
                release_time,
            });
        }

        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }

        Ok(Self { entries })
    }

    /// All schedule entries in file order.
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the schedule has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unique release sites: the first entry per `release_id`, in order
    /// of first appearance.
    pub fn sites(&self) -> Vec<ReleaseSite> {
        let mut sites: Vec<ReleaseSite> = Vec::new();
        for entry in &self.entries {
            if sites.iter().any(|s| s.release_id == entry.release_id) {
                continue;
            }
            sites.push(ReleaseSite {
                release_id: entry.release_id,
                lat: entry.lat,
                lon: entry.lon,
                release_time: entry.release_time,
            });
        }
        sites
    }

    /// Earliest release time of day across all entries.
    pub fn earliest_release_time(&self) -> NaiveTime {
        self.entries
            .iter()
            .map(|e| e.release_time)
            .min()
            .expect("schedule is never constructed empty")
    }

    /// Bounding box over all entries, expanded by `buffer_deg` on every side.
    pub fn bounding_box(&self, buffer_deg: f64) -> GeoBoundingBox {
        GeoBoundingBox::from_points(self.entries.iter().map(|e| (e.lat, e.lon)))
            .expect("schedule is never constructed empty")
            .buffered(buffer_deg)
    }

    /// Forecast window: `start_date` at the earliest release time, for
    /// the given duration.
    pub fn forecast_window(&self, start_date: NaiveDate, duration: Duration) -> ForecastWindow {
        let start: DateTime<Utc> =
            Utc.from_utc_datetime(&start_date.and_time(self.earliest_release_time()));
        ForecastWindow::from_start(start, duration)
    }
}

fn resolve_column(headers: &csv::StringRecord, name: &str) -> Result<usize, ScheduleError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| ScheduleError::MissingColumn(name.to_string()))
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    name: &str,
) -> Result<T, ScheduleError> {
    let raw = record.get(idx).ok_or_else(|| ScheduleError::Parse {
        row,
        message: format!("Missing {} value", name),
    })?;
    raw.parse().map_err(|_| ScheduleError::Parse {
        row,
        message: format!("Invalid {} value '{}'", name, raw),
    })
}
