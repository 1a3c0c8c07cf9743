//! Copernicus Marine subset requests and downloader invocation.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use thiserror::Error;

use crate::types::{ForecastWindow, GeoBoundingBox};

/// Copernicus dataset id for Mediterranean 15-minute surface currents.
pub const COPERNICUS_DATASET_ID: &str = "cmems_mod_med_phy-cur_anfc_4.2km_PT15M-i";
/// Motu service id for the Mediterranean analysis/forecast system.
pub const MOTU_SERVICE_ID: &str = "MEDSEA_ANALYSISFORECAST_PHY_006_013-TDS";
/// Motu product id for hourly Mediterranean currents.
pub const MOTU_PRODUCT_ID: &str = "cmems_mod_med_phy_anfc_0.027deg_PT1H-m";
/// Motu server endpoint.
pub const MOTU_URL: &str = "https://nrt.cmems-du.eu/motu-web/Motu";

/// Surface velocity variables.
pub const DEFAULT_VARIABLES: [&str; 2] = ["uo", "vo"];
/// Forecast horizon in hours.
pub const FORECAST_HOURS: i64 = 72;
/// Bounding box buffer around the release sites, in degrees.
pub const BBOX_BUFFER_DEG: f64 = 0.5;
/// Depth of the shallowest Mediterranean model layer, in meters.
pub const SURFACE_DEPTH: f64 = 0.494;

/// Error type for forecast downloads.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials are not set in the environment
    #[error(
        "Copernicus Marine credentials not set. Please define \
         COPERNICUSMARINE_SERVICE_USERNAME and COPERNICUSMARINE_SERVICE_PASSWORD \
         (or CMEMS_USER and CMEMS_PWD)."
    )]
    MissingCredentials,

    /// The downloader could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The downloader exited with a failure status
    #[error("{program} failed with code {code:?}")]
    CommandFailed { program: String, code: Option<i32> },
}

/// Copernicus Marine account credentials.
#[derive(Debug, Clone)]
pub struct CmemsCredentials {
    /// Account user name
    pub username: String,
    /// Account password
    pub password: String,
}

impl CmemsCredentials {
    /// Read credentials from the environment.
    ///
    /// Checks `COPERNICUSMARINE_SERVICE_USERNAME` /
    /// `COPERNICUSMARINE_SERVICE_PASSWORD` first, then the legacy
    /// `CMEMS_USER` / `CMEMS_PWD` pair. Empty values count as unset.
    pub fn from_env() -> Result<Self, FetchError> {
        let pair = [
            (
                "COPERNICUSMARINE_SERVICE_USERNAME",
                "COPERNICUSMARINE_SERVICE_PASSWORD",
            ),
            ("CMEMS_USER", "CMEMS_PWD"),
        ]
        .iter()
        .find_map(|(user_var, pwd_var)| {
            let username = env::var(user_var).unwrap_or_default();
            let password = env::var(pwd_var).unwrap_or_default();
            (!username.is_empty() && !password.is_empty()).then_some((username, password))
        });

        match pair {
            Some((username, password)) => Ok(Self { username, password }),
            None => Err(FetchError::MissingCredentials),
        }
    }
}

/// Which downloader CLI to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchBackend {
    /// The `copernicusmarine` toolbox (`subset` subcommand)
    Copernicus,
    /// The legacy `motuclient`
    Motu,
}

/// Options for the motu backend.
#[derive(Debug, Clone)]
pub struct MotuOptions {
    /// Motu server endpoint
    pub motu_url: String,
    /// Service id
    pub service_id: String,
    /// Product id requested from the service
    pub product_id: String,
}

impl Default for MotuOptions {
    fn default() -> Self {
        Self {
            motu_url: MOTU_URL.to_string(),
            service_id: MOTU_SERVICE_ID.to_string(),
            product_id: MOTU_PRODUCT_ID.to_string(),
        }
    }
}

/// A parameterized forecast subset request.
#[derive(Debug, Clone)]
pub struct SubsetRequest {
    /// Dataset id (copernicus backend)
    pub dataset_id: String,
    /// Variables to download
    pub variables: Vec<String>,
    /// Spatial extent
    pub bbox: GeoBoundingBox,
    /// Temporal extent
    pub window: ForecastWindow,
    /// Depth band `(min, max)` in meters, when restricted
    pub depth: Option<(f64, f64)>,
    /// Directory the file is written to
    pub output_dir: PathBuf,
    /// Output file name
    pub output_name: String,
}

impl SubsetRequest {
    /// Create a request for surface currents over the given extent.
    ///
    /// Defaults: the Mediterranean 15-minute current dataset, variables
    /// `uo`/`vo`, no depth restriction, output in the current directory
    /// named `cmems_currents_<start>_<end>.nc`.
    pub fn new(bbox: GeoBoundingBox, window: ForecastWindow) -> Self {
        Self {
            dataset_id: COPERNICUS_DATASET_ID.to_string(),
            variables: DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect(),
            bbox,
            window,
            depth: None,
            output_dir: PathBuf::from("."),
            output_name: format!("cmems_currents_{}.nc", window.file_stamp()),
        }
    }

    /// Override the dataset id.
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = dataset_id.into();
        self
    }

    /// Override the requested variables.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the request to a depth band in meters.
    pub fn with_depth_band(mut self, min: f64, max: f64) -> Self {
        self.depth = Some((min, max));
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the output file name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Full path of the file the downloader will write.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Render the `copernicusmarine subset` argument list.
    pub fn copernicus_args(&self, credentials: &CmemsCredentials) -> Vec<String> {
        let mut args = vec![
            "subset".to_string(),
            "--dataset-id".to_string(),
            self.dataset_id.clone(),
        ];
        for variable in &self.variables {
            args.push("--variable".to_string());
            args.push(variable.clone());
        }
        args.extend([
            "--minimum-longitude".to_string(),
            self.bbox.min_lon.to_string(),
            "--maximum-longitude".to_string(),
            self.bbox.max_lon.to_string(),
            "--minimum-latitude".to_string(),
            self.bbox.min_lat.to_string(),
            "--maximum-latitude".to_string(),
            self.bbox.max_lat.to_string(),
            "--start-datetime".to_string(),
            self.window.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "--end-datetime".to_string(),
            self.window.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ]);
        if let Some((min, max)) = self.depth {
            args.extend([
                "--minimum-depth".to_string(),
                min.to_string(),
                "--maximum-depth".to_string(),
                max.to_string(),
            ]);
        }
        args.extend([
            "--output-directory".to_string(),
            self.output_dir.display().to_string(),
            "--output-filename".to_string(),
            self.output_name.clone(),
            "--username".to_string(),
            credentials.username.clone(),
            "--password".to_string(),
            credentials.password.clone(),
        ]);
        args
    }

    /// Render the `motuclient` argument list.
    pub fn motu_args(&self, credentials: &CmemsCredentials, motu: &MotuOptions) -> Vec<String> {
        let mut args = vec![
            "--motu".to_string(),
            motu.motu_url.clone(),
            "--service-id".to_string(),
            motu.service_id.clone(),
            "--product-id".to_string(),
            motu.product_id.clone(),
            "--longitude-min".to_string(),
            self.bbox.min_lon.to_string(),
            "--longitude-max".to_string(),
            self.bbox.max_lon.to_string(),
            "--latitude-min".to_string(),
            self.bbox.min_lat.to_string(),
            "--latitude-max".to_string(),
            self.bbox.max_lat.to_string(),
            "--date-min".to_string(),
            self.window.start.format("%Y-%m-%d %H:%M:%S").to_string(),
            "--date-max".to_string(),
            self.window.end.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        if let Some((min, max)) = self.depth {
            args.extend([
                "--depth-min".to_string(),
                min.to_string(),
                "--depth-max".to_string(),
                max.to_string(),
            ]);
        }
        for variable in &self.variables {
            args.push("--variable".to_string());
            args.push(variable.clone());
        }
        args.extend([
            "--out-dir".to_string(),
            self.output_dir.display().to_string(),
            "--out-name".to_string(),
            self.output_name.clone(),
            "--user".to_string(),
            credentials.username.clone(),
            "--pwd".to_string(),
            credentials.password.clone(),
        ]);
        args
    }
}

/// Run the downloader for a request and return the downloaded path.
pub fn run_fetch(
    request: &SubsetRequest,
    backend: FetchBackend,
    credentials: &CmemsCredentials,
    motu: &MotuOptions,
) -> Result<PathBuf, FetchError> {
    let (program, args) = match backend {
        FetchBackend::Copernicus => ("copernicusmarine", request.copernicus_args(credentials)),
        FetchBackend::Motu => ("motuclient", request.motu_args(credentials, motu)),
    };

    info!(
        "Running: {} {}",
        program,
        redact(&args, &credentials.password).join(" ")
    );

    let status = Command::new(program)
        .args(&args)
        .status()
        .map_err(|source| FetchError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(FetchError::CommandFailed {
            program: program.to_string(),
            code: status.code(),
        });
    }

    info!("Downloaded currents to {}", request.output_path().display());
    Ok(request.output_path())
}

/// Replace the password in a rendered argument list for logging.
fn redact(args: &[String], password: &str) -> Vec<String> {
    args.iter()
        .map(|a| {
            if a == password {
                "****".to_string()
            } else {
                a.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn request() -> SubsetRequest {
        let bbox = GeoBoundingBox::new(33.8, 30.7, 35.05, 32.3);
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let window = ForecastWindow::from_start(start, Duration::hours(FORECAST_HOURS));
        SubsetRequest::new(bbox, window)
    }

    fn credentials() -> CmemsCredentials {
        CmemsCredentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_default_output_name() {
        let request = request();
        assert_eq!(
            request.output_name,
            "cmems_currents_20240301T060000_20240304T060000.nc"
        );
        assert_eq!(
            request.output_path(),
            PathBuf::from("./cmems_currents_20240301T060000_20240304T060000.nc")
        );
    }

    #[test]
    fn test_copernicus_args() {
        let args = request().copernicus_args(&credentials());

        assert_eq!(args[0], "subset");
        let joined = args.join(" ");
        assert!(joined.contains("--dataset-id cmems_mod_med_phy-cur_anfc_4.2km_PT15M-i"));
        assert!(joined.contains("--variable uo"));
        assert!(joined.contains("--variable vo"));
        assert!(joined.contains("--minimum-longitude 33.8"));
        assert!(joined.contains("--start-datetime 2024-03-01T06:00:00"));
        assert!(joined.contains("--end-datetime 2024-03-04T06:00:00"));
        assert!(joined.contains("--username user"));
        // No depth restriction unless requested
        assert!(!joined.contains("--minimum-depth"));
    }

    #[test]
    fn test_motu_args_with_surface_depth() {
        let request = request().with_depth_band(SURFACE_DEPTH, SURFACE_DEPTH);
        let args = request.motu_args(&credentials(), &MotuOptions::default());

        let joined = args.join(" ");
        assert!(joined.contains("--motu https://nrt.cmems-du.eu/motu-web/Motu"));
        assert!(joined.contains("--service-id MEDSEA_ANALYSISFORECAST_PHY_006_013-TDS"));
        assert!(joined.contains("--product-id cmems_mod_med_phy_anfc_0.027deg_PT1H-m"));
        assert!(joined.contains("--date-min 2024-03-01 06:00:00"));
        assert!(joined.contains("--depth-min 0.494"));
        assert!(joined.contains("--depth-max 0.494"));
        assert!(joined.contains("--pwd secret"));
    }

    #[test]
    fn test_redact_hides_password() {
        let args = request().motu_args(&credentials(), &MotuOptions::default());
        let redacted = redact(&args, "secret").join(" ");
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("****"));
    }

    #[test]
    fn test_builder_overrides() {
        let request = request()
            .with_dataset_id("other_dataset")
            .with_variables(["thetao"])
            .with_output_dir("/tmp/forecasts")
            .with_output_name("currents.nc");

        assert_eq!(request.dataset_id, "other_dataset");
        assert_eq!(request.variables, vec!["thetao".to_string()]);
        assert_eq!(request.output_path(), PathBuf::from("/tmp/forecasts/currents.nc"));
    }
}
