//! Field set: gridded variables, named constants, point sampling.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::axis::Axis;

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE: f32 = 9.96921e+36;

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid(v: f32) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Meters per degree of latitude (one nautical mile per arc minute).
///
/// The conversion used when translating m/s velocities into deg/s
/// displacements on a spherical mesh; longitude additionally scales with
/// the cosine of latitude.
pub const DEG_TO_METERS: f64 = 1852.0 * 60.0;

/// Error type for field set operations.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Field data shape does not match the grid axes
    #[error("Field '{name}': expected shape {expected:?} (time, lat, lon), got {got:?}")]
    ShapeMismatch {
        name: String,
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },

    /// Named field is not in the set
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Named constant is not in the set
    #[error("Unknown constant '{0}'")]
    UnknownConstant(String),

    /// A required variable is missing from the input file
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Time axis units could not be decoded
    #[error("Cannot decode time units '{0}'")]
    InvalidTimeUnits(String),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// NetCDF support not compiled in
    #[error("NetCDF feature not enabled")]
    FeatureDisabled,
}

/// Horizontal mesh convention for velocity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mesh {
    /// Velocities are m/s on geographic coordinates; displacements are
    /// converted to degrees with [`DEG_TO_METERS`] and a cos(lat)
    /// longitude correction.
    Spherical,
    /// Velocities are already in axis units per second.
    Flat,
}

impl Mesh {
    /// Convert a velocity to degrees (or axis units) per second at the
    /// given latitude.
    #[inline]
    pub fn velocity_to_degrees(&self, u: f64, v: f64, lat: f64) -> (f64, f64) {
        match self {
            Mesh::Flat => (u, v),
            Mesh::Spherical => {
                let cos_lat = lat.to_radians().cos();
                (u / (DEG_TO_METERS * cos_lat), v / DEG_TO_METERS)
            }
        }
    }
}

/// Outcome of sampling a field at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample<T> {
    /// Interpolated value
    Value(T),
    /// Inside the grid, but every surrounding cell corner is a fill
    /// value (dry / land cell)
    Dry,
    /// Outside the spatial axes (or the time axis, when time
    /// extrapolation is disabled)
    OutOfBounds,
}

impl<T> Sample<T> {
    /// Unwrap the value, or `None` for `Dry` / `OutOfBounds`.
    pub fn value(self) -> Option<T> {
        match self {
            Sample::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// One scalar variable on a `[time][lat][lon]` grid.
#[derive(Debug, Clone)]
pub struct Field {
    data: Vec<Vec<Vec<f32>>>,
}

impl Field {
    /// Wrap raw gridded data.
    pub fn new(data: Vec<Vec<Vec<f32>>>) -> Self {
        Self { data }
    }

    /// Grid shape as `(n_time, n_lat, n_lon)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let nt = self.data.len();
        let nlat = self.data.first().map_or(0, |t| t.len());
        let nlon = self
            .data
            .first()
            .and_then(|t| t.first())
            .map_or(0, |r| r.len());
        (nt, nlat, nlon)
    }

    fn slice(&self, t: usize) -> &[Vec<f32>] {
        &self.data[t]
    }
}

/// Gridded velocity components plus auxiliary fields and constants on a
/// shared lon/lat/time grid.
///
/// # Example
///
/// ```
/// use driftcast::field::{FieldSet, Mesh, Sample};
///
/// // Uniform 0.5 m/s eastward current
/// let mut fields = FieldSet::uniform(Mesh::Spherical, 0.5, 0.0);
/// fields.add_constant("windage_coeff", 0.03);
///
/// match fields.sample_uv(0.0, 31.3, 34.2) {
///     Sample::Value((u, v)) => {
///         assert_eq!(u, 0.5);
///         assert_eq!(v, 0.0);
///     }
///     _ => panic!("uniform field must sample everywhere"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FieldSet {
    mesh: Mesh,
    lon: Axis,
    lat: Axis,
    time: Axis,
    u: Field,
    v: Field,
    extra: HashMap<String, Field>,
    constants: HashMap<String, f64>,
    /// Instant corresponding to t = 0 on the time axis, when known
    reference: Option<DateTime<Utc>>,
    time_extrapolation: bool,
}

impl FieldSet {
    /// Create a field set from velocity grids on explicit axes.
    ///
    /// Data layout is `[time][lat][lon]`; shapes must match the axes.
    pub fn new(
        mesh: Mesh,
        lon: Vec<f64>,
        lat: Vec<f64>,
        time: Vec<f64>,
        u_data: Vec<Vec<Vec<f32>>>,
        v_data: Vec<Vec<Vec<f32>>>,
    ) -> Result<Self, FieldError> {
        let lon = Axis::new(lon);
        let lat = Axis::new(lat);
        let time = Axis::new(time);

        let u = Field::new(u_data);
        let v = Field::new(v_data);
        validate_shape("U", &u, &time, &lat, &lon)?;
        validate_shape("V", &v, &time, &lat, &lon)?;

        Ok(Self {
            mesh,
            lon,
            lat,
            time,
            u,
            v,
            extra: HashMap::new(),
            constants: HashMap::new(),
            reference: None,
            time_extrapolation: true,
        })
    }

    /// Spatially and temporally uniform velocity field.
    ///
    /// Useful for demos and tests that need no external data.
    pub fn uniform(mesh: Mesh, u: f64, v: f64) -> Self {
        Self::new(
            mesh,
            vec![0.0],
            vec![0.0],
            vec![0.0],
            vec![vec![vec![u as f32]]],
            vec![vec![vec![v as f32]]],
        )
        .expect("1x1x1 grids always match their axes")
    }

    /// Set the instant corresponding to t = 0 on the time axis.
    pub fn with_reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Enable or disable clamped extrapolation outside the time axis.
    ///
    /// Enabled by default; when disabled, sampling outside the covered
    /// time range reports [`Sample::OutOfBounds`].
    pub fn with_time_extrapolation(mut self, enabled: bool) -> Self {
        self.time_extrapolation = enabled;
        self
    }

    /// Add an auxiliary field (e.g. `wind_u`) on the shared grid.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        data: Vec<Vec<Vec<f32>>>,
    ) -> Result<(), FieldError> {
        let name = name.into();
        let field = Field::new(data);
        validate_shape(&name, &field, &self.time, &self.lat, &self.lon)?;
        self.extra.insert(name, field);
        Ok(())
    }

    /// Spatially uniform auxiliary field.
    pub fn add_uniform_field(
        &mut self,
        name: impl Into<String>,
        value: f64,
    ) -> Result<(), FieldError> {
        let (nt, nlat, nlon) = (self.time.len(), self.lat.len(), self.lon.len());
        self.add_field(name, vec![vec![vec![value as f32; nlon]; nlat]; nt])
    }

    /// Register a named scalar constant for kernels.
    pub fn add_constant(&mut self, name: impl Into<String>, value: f64) {
        self.constants.insert(name.into(), value);
    }

    /// Look up a constant.
    pub fn constant(&self, name: &str) -> Result<f64, FieldError> {
        self.constants
            .get(name)
            .copied()
            .ok_or_else(|| FieldError::UnknownConstant(name.to_string()))
    }

    /// Look up a constant, falling back to a default when unset.
    pub fn constant_or(&self, name: &str, default: f64) -> f64 {
        self.constants.get(name).copied().unwrap_or(default)
    }

    /// Whether an auxiliary field is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.extra.contains_key(name)
    }

    /// Mesh convention of the velocity fields.
    pub fn mesh(&self) -> Mesh {
        self.mesh
    }

    /// Instant corresponding to t = 0 on the time axis, when known.
    pub fn reference(&self) -> Option<DateTime<Utc>> {
        self.reference
    }

    /// The time axis (seconds).
    pub fn time_axis(&self) -> &Axis {
        &self.time
    }

    /// The longitude axis (degrees east).
    pub fn lon_axis(&self) -> &Axis {
        &self.lon
    }

    /// The latitude axis (degrees north).
    pub fn lat_axis(&self) -> &Axis {
        &self.lat
    }

    /// Sample both velocity components at a point.
    ///
    /// `OutOfBounds` dominates `Dry`; a point is `Dry` only when inside
    /// the grid with no valid velocity around it.
    pub fn sample_uv(&self, time: f64, lat: f64, lon: f64) -> Sample<(f64, f64)> {
        match (
            self.sample_field(&self.u, time, lat, lon),
            self.sample_field(&self.v, time, lat, lon),
        ) {
            (Sample::OutOfBounds, _) | (_, Sample::OutOfBounds) => Sample::OutOfBounds,
            (Sample::Dry, _) | (_, Sample::Dry) => Sample::Dry,
            (Sample::Value(u), Sample::Value(v)) => Sample::Value((u, v)),
        }
    }

    /// Sample a named auxiliary field at a point.
    pub fn sample(&self, name: &str, time: f64, lat: f64, lon: f64) -> Result<Sample<f64>, FieldError> {
        let field = self
            .extra
            .get(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        Ok(self.sample_field(field, time, lat, lon))
    }

    fn sample_field(&self, field: &Field, time: f64, lat: f64, lon: f64) -> Sample<f64> {
        let Some((j0, j1, fy)) = self.lat.bracket(lat) else {
            return Sample::OutOfBounds;
        };
        let Some((i0, i1, fx)) = self.lon.bracket(lon) else {
            return Sample::OutOfBounds;
        };

        let (t0, t1, ft) = if self.time_extrapolation {
            self.time.bracket_clamped(time)
        } else {
            match self.time.bracket(time) {
                Some(hit) => hit,
                None => return Sample::OutOfBounds,
            }
        };

        let v0 = interpolate_2d(field.slice(t0), i0, i1, j0, j1, fx, fy);
        if t0 == t1 {
            return match v0 {
                Some(v) => Sample::Value(v),
                None => Sample::Dry,
            };
        }
        let v1 = interpolate_2d(field.slice(t1), i0, i1, j0, j1, fx, fy);

        // A level that is dry at one time but wet at the other takes the
        // wet value (cells near the coast flood and dry with the tide).
        match (v0, v1) {
            (Some(a), Some(b)) => Sample::Value(a * (1.0 - ft) + b * ft),
            (Some(a), None) => Sample::Value(a),
            (None, Some(b)) => Sample::Value(b),
            (None, None) => Sample::Dry,
        }
    }
}

fn validate_shape(
    name: &str,
    field: &Field,
    time: &Axis,
    lat: &Axis,
    lon: &Axis,
) -> Result<(), FieldError> {
    let expected = (time.len(), lat.len(), lon.len());
    let got = field.shape();
    let uniform = field.data.iter().all(|t| {
        t.len() == expected.1 && t.iter().all(|row| row.len() == expected.2)
    });
    if got != expected || !uniform {
        return Err(FieldError::ShapeMismatch {
            name: name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// Bilinear interpolation on one time slice.
///
/// A corner holding a fill value falls back to the first valid corner;
/// all-invalid corners yield `None`.
fn interpolate_2d(
    data: &[Vec<f32>],
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
    fx: f64,
    fy: f64,
) -> Option<f64> {
    let v00 = data[j0][i0];
    let v01 = data[j0][i1];
    let v10 = data[j1][i0];
    let v11 = data[j1][i1];

    if !is_valid(v00) || !is_valid(v01) || !is_valid(v10) || !is_valid(v11) {
        let vals = [v00, v01, v10, v11];
        return vals.iter().find(|&&v| is_valid(v)).map(|&v| v as f64);
    }

    let v0 = v00 as f64 * (1.0 - fx) + v01 as f64 * fx;
    let v1 = v10 as f64 * (1.0 - fx) + v11 as f64 * fx;
    Some(v0 * (1.0 - fy) + v1 * fy)
}
