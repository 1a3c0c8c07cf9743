//! # driftcast
//!
//! Surface drift forecasting built on short-range ocean-current forecasts.
//!
//! This crate provides the building blocks for a drift forecast workflow:
//! - Release schedules (CSV) and the bounding box / time window they imply
//! - Forecast acquisition through the Copernicus Marine downloader CLIs
//! - Gridded velocity field sets with bilinear space / linear time sampling
//! - Lagrangian particles advected by chained kernels (RK4 advection,
//!   wind windage, weight decay)
//! - Arrival analysis against a target polygon, CSV and VTK output

pub mod arrival;
pub mod fetch;
pub mod field;
pub mod io;
pub mod kernel;
pub mod particle;
pub mod schedule;
pub mod sim;
pub mod types;

// Re-export main types for convenience
pub use arrival::{ArrivalError, ArrivalRegion, ArrivalSummary, summarize};
pub use fetch::{
    CmemsCredentials, FetchBackend, FetchError, MotuOptions, SubsetRequest, run_fetch,
    BBOX_BUFFER_DEG, COPERNICUS_DATASET_ID, FORECAST_HOURS, SURFACE_DEPTH,
};
pub use field::{Axis, Field, FieldError, FieldSet, Mesh, Sample, DEG_TO_METERS};
#[cfg(feature = "netcdf")]
pub use field::{fieldset_from_netcdf, NetcdfFieldConfig};
pub use io::{
    read_positions, write_arrivals_vtu, write_positions, PositionError, PositionRecord, VtkError,
};
pub use kernel::{
    AdvectionRk4, ConstantWindage, FieldWindage, Kernel, KernelChain, KernelOutcome, WeightDecay,
};
pub use particle::{Particle, ParticleSet, ParticleStatus, BUOYANT_WEIGHT_KG};
pub use schedule::{ReleaseEntry, ReleaseSchedule, ReleaseSite, ScheduleError};
pub use sim::{run, SimError, SimulationConfig, SimulationResult};
pub use types::{ForecastWindow, GeoBoundingBox};
