//! Subcommand implementations.

pub mod arrivals;
pub mod demo;
pub mod fetch;
pub mod simulate;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

/// Resolve the forecast start date: command-line argument first, then
/// the `SIM_START_DATE` environment variable, then today (UTC).
pub(crate) fn resolve_start_date(arg: Option<NaiveDate>) -> Result<NaiveDate> {
    if let Some(date) = arg {
        return Ok(date);
    }
    match std::env::var("SIM_START_DATE") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid SIM_START_DATE '{}' (expected YYYY-MM-DD)", value)),
        Err(_) => Ok(Utc::now().date_naive()),
    }
}
