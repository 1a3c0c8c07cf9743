//! Gridded velocity field sets.
//!
//! A [`FieldSet`] holds the forecast velocity components (U, V) and any
//! auxiliary fields (e.g. wind components) on a shared regular
//! lon/lat/time grid, plus named scalar constants consumed by kernels.
//! Sampling is bilinear in space and linear in time, with the time axis
//! clamped outside its covered range so a simulation may run slightly
//! past the last forecast record.

mod axis;
mod fieldset;
#[cfg(feature = "netcdf")]
mod netcdf_reader;

pub use axis::Axis;
pub use fieldset::{
    is_valid, Field, FieldError, FieldSet, Mesh, Sample, DEG_TO_METERS, FILL_VALUE,
};
#[cfg(feature = "netcdf")]
pub use netcdf_reader::{fieldset_from_netcdf, NetcdfFieldConfig};
