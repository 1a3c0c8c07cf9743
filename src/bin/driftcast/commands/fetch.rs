//! Fetch command: download forecast currents for a release schedule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::{Args, ValueEnum};
use log::info;

use driftcast::fetch::{
    run_fetch, CmemsCredentials, FetchBackend, MotuOptions, SubsetRequest, BBOX_BUFFER_DEG,
    FORECAST_HOURS, SURFACE_DEPTH,
};
use driftcast::schedule::ReleaseSchedule;

/// Downloader CLI to drive.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// The copernicusmarine toolbox
    Copernicus,
    /// The legacy motuclient
    Motu,
}

impl From<Backend> for FetchBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Copernicus => FetchBackend::Copernicus,
            Backend::Motu => FetchBackend::Motu,
        }
    }
}

/// Fetch command arguments.
#[derive(Args)]
pub struct FetchArgs {
    /// Release schedule CSV
    #[arg(short, long, default_value = "release_schedule_15min.csv")]
    pub schedule: PathBuf,

    /// Forecast start date (YYYY-MM-DD); defaults to SIM_START_DATE or
    /// today (UTC)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Downloader backend
    #[arg(long, value_enum, default_value = "copernicus")]
    pub backend: Backend,

    /// Directory the forecast file is written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Forecast length in hours
    #[arg(long, default_value_t = FORECAST_HOURS)]
    pub hours: i64,

    /// Bounding box buffer around the release sites, in degrees
    #[arg(long, default_value_t = BBOX_BUFFER_DEG)]
    pub buffer: f64,

    /// Override the dataset id (copernicus backend)
    #[arg(long)]
    pub dataset_id: Option<String>,
}

/// Execute the fetch command.
pub fn execute(args: FetchArgs) -> Result<()> {
    let schedule = ReleaseSchedule::from_path(&args.schedule)
        .with_context(|| format!("Cannot read schedule {}", args.schedule.display()))?;

    let start_date = super::resolve_start_date(args.start_date)?;
    let window = schedule.forecast_window(start_date, Duration::hours(args.hours));
    let bbox = schedule.bounding_box(args.buffer);
    info!(
        "{} release entries; window {}; extent {}",
        schedule.len(),
        window,
        bbox
    );

    let credentials = CmemsCredentials::from_env()?;

    let mut request = SubsetRequest::new(bbox, window).with_output_dir(&args.out_dir);
    if let Some(dataset_id) = args.dataset_id {
        request = request.with_dataset_id(dataset_id);
    }
    if matches!(args.backend, Backend::Motu) {
        // The motu product is depth-resolved: pin the shallowest layer
        request = request.with_depth_band(SURFACE_DEPTH, SURFACE_DEPTH);
    }

    println!("Downloading CMEMS currents ...");
    let path = run_fetch(
        &request,
        args.backend.into(),
        &credentials,
        &MotuOptions::default(),
    )?;
    println!("Saved currents to {}", path.display());
    Ok(())
}
