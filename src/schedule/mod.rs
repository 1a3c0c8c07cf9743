//! Release schedules.
//!
//! A release schedule is a CSV file listing where and when virtual
//! particles enter the water:
//!
//! ```text
//! release_id,lat,lon,release_time
//! 1,31.52,34.44,06:00:00
//! 1,31.52,34.44,06:15:00
//! 2,31.80,34.55,06:30:00
//! ```
//!
//! The schedule determines both the release sites (the first entry per
//! `release_id`) and the forecast request: the spatial bounding box of all
//! entries and a time window starting at the earliest `release_time`.

mod reader;

pub use reader::{ReleaseEntry, ReleaseSchedule, ReleaseSite, ScheduleError};
