//! Build a [`FieldSet`] from a downloaded forecast NetCDF file.
//!
//! Reads the regular lon/lat/time grids produced by the Copernicus
//! Marine subset tools. Variables may carry `scale_factor`/`add_offset`
//! packing and `_FillValue`/`missing_value` markers; a depth axis, when
//! present, is collapsed to its first (shallowest) level.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;

use super::fieldset::{FieldError, FieldSet, Mesh, FILL_VALUE};

/// Configuration for reading a forecast file into a [`FieldSet`].
#[derive(Debug, Clone)]
pub struct NetcdfFieldConfig {
    /// Variable holding the eastward velocity (CMEMS: `uo`)
    pub u_name: String,
    /// Variable holding the northward velocity (CMEMS: `vo`)
    pub v_name: String,
    /// Optional wind components to load as auxiliary fields
    pub wind_names: Option<(String, String)>,
    /// Mesh convention of the velocities
    pub mesh: Mesh,
}

impl Default for NetcdfFieldConfig {
    fn default() -> Self {
        Self {
            u_name: "uo".to_string(),
            v_name: "vo".to_string(),
            wind_names: None,
            mesh: Mesh::Spherical,
        }
    }
}

impl NetcdfFieldConfig {
    /// Create the default CMEMS configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the velocity variable names.
    pub fn with_velocity_names(mut self, u: impl Into<String>, v: impl Into<String>) -> Self {
        self.u_name = u.into();
        self.v_name = v.into();
        self
    }

    /// Also load wind components as `wind_u` / `wind_v` auxiliary fields.
    pub fn with_wind_names(mut self, u: impl Into<String>, v: impl Into<String>) -> Self {
        self.wind_names = Some((u.into(), v.into()));
        self
    }

    /// Override the mesh convention.
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = mesh;
        self
    }
}

/// Read a forecast subset file into a [`FieldSet`].
///
/// Coordinate variables are located by the usual aliases
/// (`longitude`/`lon`, `latitude`/`lat`, `time`). The time axis is
/// converted to seconds since its first record, and the corresponding
/// instant is stored as the field set reference when the `units`
/// attribute can be decoded.
pub fn fieldset_from_netcdf(
    path: impl AsRef<Path>,
    config: &NetcdfFieldConfig,
) -> Result<FieldSet, FieldError> {
    let file = netcdf::open(path)?;

    let lon = read_coord(&file, &["longitude", "lon"])?;
    let lat = read_coord(&file, &["latitude", "lat"])?;
    let time_raw = read_coord(&file, &["time"])?;

    let n_time = time_raw.len();
    let n_lat = lat.len();
    let n_lon = lon.len();

    // Decode the time axis to seconds since its first record
    let units = read_time_units(&file);
    let (time, reference) = match units.as_deref().and_then(parse_time_units) {
        Some((unit_seconds, epoch)) => {
            let first = time_raw.first().copied().unwrap_or(0.0);
            let seconds: Vec<f64> = time_raw.iter().map(|t| (t - first) * unit_seconds).collect();
            let reference =
                epoch + Duration::milliseconds((first * unit_seconds * 1000.0).round() as i64);
            (seconds, Some(reference))
        }
        None => {
            warn!(
                "time axis units {:?} not understood; treating values as raw seconds",
                units
            );
            (time_raw, None)
        }
    };

    let u = read_grid_var(&file, &config.u_name, n_time, n_lat, n_lon)?;
    let v = read_grid_var(&file, &config.v_name, n_time, n_lat, n_lon)?;

    let mut fields = FieldSet::new(config.mesh, lon, lat, time, u, v)?;
    if let Some(reference) = reference {
        fields = fields.with_reference(reference);
    }

    if let Some((wu_name, wv_name)) = &config.wind_names {
        let wu = read_grid_var(&file, wu_name, n_time, n_lat, n_lon)?;
        let wv = read_grid_var(&file, wv_name, n_time, n_lat, n_lon)?;
        fields.add_field("wind_u", wu)?;
        fields.add_field("wind_v", wv)?;
    }

    Ok(fields)
}

/// Read a coordinate variable by any of its usual names.
fn read_coord(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>, FieldError> {
    for name in names {
        if let Some(var) = file.variable(name) {
            let data: Vec<f64> = var.get_values(..)?;
            return Ok(data);
        }
    }
    Err(FieldError::MissingVariable(names.join(" or ")))
}

fn read_time_units(file: &netcdf::File) -> Option<String> {
    let var = file.variable("time")?;
    match var.attribute_value("units") {
        Some(Ok(netcdf::AttributeValue::Str(s))) => Some(s),
        _ => None,
    }
}

/// Decode a CF time `units` string like `"hours since 1950-01-01 00:00:00"`
/// into the unit length in seconds and the epoch instant.
pub(crate) fn parse_time_units(units: &str) -> Option<(f64, DateTime<Utc>)> {
    let mut parts = units.splitn(2, " since ");
    let unit = parts.next()?.trim().to_ascii_lowercase();
    let epoch_str = parts.next()?.trim();

    let unit_seconds = match unit.as_str() {
        "seconds" | "second" | "s" => 1.0,
        "minutes" | "minute" | "min" => 60.0,
        "hours" | "hour" | "h" => 3600.0,
        "days" | "day" | "d" => 86400.0,
        _ => return None,
    };

    let epoch = parse_epoch(epoch_str)?;
    Some((unit_seconds, epoch))
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    // Strip a trailing UTC marker if present
    let s = s.trim_end_matches(" UTC").trim_end_matches('Z');

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Read a gridded variable as `[time][lat][lon]`, collapsing a depth
/// axis (if any) to its first level and applying packing attributes.
fn read_grid_var(
    file: &netcdf::File,
    name: &str,
    n_time: usize,
    n_lat: usize,
    n_lon: usize,
) -> Result<Vec<Vec<Vec<f32>>>, FieldError> {
    let var = file
        .variable(name)
        .ok_or_else(|| FieldError::MissingVariable(name.to_string()))?;

    let scale = attr_f64(&var, "scale_factor").unwrap_or(1.0);
    let offset = attr_f64(&var, "add_offset").unwrap_or(0.0);
    let fill = attr_f64(&var, "_FillValue").or_else(|| attr_f64(&var, "missing_value"));

    let n_depth = match var.dimensions().len() {
        4 => var.dimensions()[1].len(),
        3 => 1,
        n => {
            return Err(FieldError::MissingVariable(format!(
                "{} has {} dimensions, expected 3 or 4",
                name, n
            )))
        }
    };

    let raw: Vec<f32> = var.get_values(..)?;
    let expected = n_time * n_depth * n_lat * n_lon;
    if raw.len() != expected {
        return Err(FieldError::ShapeMismatch {
            name: name.to_string(),
            expected: (n_time, n_lat, n_lon),
            got: (raw.len() / (n_lat * n_lon).max(1), n_lat, n_lon),
        });
    }

    // Surface level only: depth index 0 is the shallowest layer
    let mut result = vec![vec![vec![0.0f32; n_lon]; n_lat]; n_time];
    let plane = n_lat * n_lon;
    for t in 0..n_time {
        let base = t * n_depth * plane;
        for j in 0..n_lat {
            for i in 0..n_lon {
                let raw_val = raw[base + j * n_lon + i];
                let is_fill = fill.is_some_and(|f| (raw_val as f64 - f).abs() < 1e-6)
                    || !super::fieldset::is_valid(raw_val);
                result[t][j][i] = if is_fill {
                    FILL_VALUE
                } else {
                    (raw_val as f64 * scale + offset) as f32
                };
            }
        }
    }

    Ok(result)
}

fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            netcdf::AttributeValue::Short(s) => Some(s as f64),
            netcdf::AttributeValue::Int(i) => Some(i as f64),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Sample;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_parse_time_units() {
        let (unit, epoch) = parse_time_units("seconds since 1970-01-01 00:00:00").unwrap();
        assert_eq!(unit, 1.0);
        assert_eq!(epoch, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());

        let (unit, epoch) = parse_time_units("hours since 1950-01-01").unwrap();
        assert_eq!(unit, 3600.0);
        assert_eq!(epoch, Utc.with_ymd_and_hms(1950, 1, 1, 0, 0, 0).unwrap());

        let (unit, _) = parse_time_units("minutes since 1900-01-01T00:00:00").unwrap();
        assert_eq!(unit, 60.0);

        assert!(parse_time_units("fortnights since 1970-01-01").is_none());
        assert!(parse_time_units("just numbers").is_none());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("currents.nc");

        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("time", 2).unwrap();
            file.add_dimension("latitude", 2).unwrap();
            file.add_dimension("longitude", 3).unwrap();

            let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
            time.put_attribute("units", "hours since 2024-03-01 00:00:00")
                .unwrap();
            time.put_values(&[0.0, 1.0], ..).unwrap();

            let mut lat = file.add_variable::<f64>("latitude", &["latitude"]).unwrap();
            lat.put_values(&[31.0, 31.5], ..).unwrap();

            let mut lon = file
                .add_variable::<f64>("longitude", &["longitude"])
                .unwrap();
            lon.put_values(&[34.0, 34.5, 35.0], ..).unwrap();

            let dims = ["time", "latitude", "longitude"];
            let mut uo = file.add_variable::<f32>("uo", &dims).unwrap();
            uo.put_attribute("_FillValue", -999.0f32).unwrap();
            uo.put_values(
                &[
                    0.1f32, 0.2, 0.3, 0.1, 0.2, 0.3, // t = 0
                    0.2, 0.4, 0.6, 0.2, 0.4, -999.0, // t = 1, one dry cell
                ],
                ..,
            )
            .unwrap();

            let mut vo = file.add_variable::<f32>("vo", &dims).unwrap();
            vo.put_values(&[0.0f32; 12], ..).unwrap();
        }

        let fields = fieldset_from_netcdf(&path, &NetcdfFieldConfig::default()).unwrap();

        assert_eq!(fields.time_axis().values(), &[0.0, 3600.0]);
        assert_eq!(
            fields.reference(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );

        // Middle of the grid at t = 0: uo = 0.2
        match fields.sample_uv(0.0, 31.25, 34.5) {
            Sample::Value((u, _)) => assert!((u - 0.2).abs() < TOL),
            other => panic!("expected value, got {:?}", other),
        }
    }
}
