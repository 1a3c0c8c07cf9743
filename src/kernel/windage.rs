//! Wind-driven drift kernels.

use crate::field::{FieldError, FieldSet, Sample};
use crate::particle::Particle;

use super::{Kernel, KernelOutcome, WINDAGE_COEFF, WINDAGE_U, WINDAGE_V};

/// Default fraction of the wind velocity felt by a drifting object.
pub(crate) const DEFAULT_WINDAGE_COEFF: f64 = 0.03;

/// Windage from gridded wind fields.
///
/// Samples the wind at the particle position and displaces it by
/// `windage_coeff` (field-set constant, default 0.03) times the wind
/// velocity, converted with the field set's mesh convention.
#[derive(Debug, Clone)]
pub struct FieldWindage {
    u_field: String,
    v_field: String,
}

impl FieldWindage {
    /// Create a windage kernel over the standard `wind_u` / `wind_v`
    /// fields, validating that both are present.
    pub fn new(fields: &FieldSet) -> Result<Self, FieldError> {
        Self::with_field_names(fields, "wind_u", "wind_v")
    }

    /// Create a windage kernel over named wind fields.
    pub fn with_field_names(
        fields: &FieldSet,
        u_field: impl Into<String>,
        v_field: impl Into<String>,
    ) -> Result<Self, FieldError> {
        let u_field = u_field.into();
        let v_field = v_field.into();
        for name in [&u_field, &v_field] {
            if !fields.has_field(name) {
                return Err(FieldError::UnknownField(name.clone()));
            }
        }
        Ok(Self { u_field, v_field })
    }

    fn sample_wind(&self, fields: &FieldSet, time: f64, lat: f64, lon: f64) -> Sample<(f64, f64)> {
        let wu = fields.sample(&self.u_field, time, lat, lon);
        let wv = fields.sample(&self.v_field, time, lat, lon);
        match (wu, wv) {
            (Ok(Sample::Value(u)), Ok(Sample::Value(v))) => Sample::Value((u, v)),
            (Ok(Sample::Dry), _) | (_, Ok(Sample::Dry)) => Sample::Dry,
            _ => Sample::OutOfBounds,
        }
    }
}

impl Kernel for FieldWindage {
    fn name(&self) -> &'static str {
        "Windage"
    }

    fn step(&self, p: &mut Particle, fields: &FieldSet, time: f64, dt: f64) -> KernelOutcome {
        let (wu, wv) = match self.sample_wind(fields, time, p.lat, p.lon) {
            Sample::Value(uv) => uv,
            // Gaps in the wind data do not strand a particle; it simply
            // feels no wind there.
            Sample::Dry => return KernelOutcome::Ok,
            Sample::OutOfBounds => return KernelOutcome::OutOfBounds,
        };

        let coeff = fields.constant_or(WINDAGE_COEFF, DEFAULT_WINDAGE_COEFF);
        let (du, dv) = fields
            .mesh()
            .velocity_to_degrees(coeff * wu, coeff * wv, p.lat);
        p.lon += du * dt;
        p.lat += dv * dt;
        KernelOutcome::Ok
    }
}

/// Constant windage drift.
///
/// Adds the field-set constants `windage_u` / `windage_v` (axis units
/// per second, default 0) directly to the particle position each step.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantWindage;

impl Kernel for ConstantWindage {
    fn name(&self) -> &'static str {
        "ConstantWindage"
    }

    fn step(&self, p: &mut Particle, fields: &FieldSet, _time: f64, dt: f64) -> KernelOutcome {
        p.lon += fields.constant_or(WINDAGE_U, 0.0) * dt;
        p.lat += fields.constant_or(WINDAGE_V, 0.0) * dt;
        KernelOutcome::Ok
    }
}
