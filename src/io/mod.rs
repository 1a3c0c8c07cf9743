//! Input/output utilities.
//!
//! - **Final positions**: the `release_id,lon,lat` CSV produced after a
//!   run and consumed by the arrival analysis
//! - **VTK output**: particle endpoints and the arrival polygon as a VTU
//!   file for inspection in ParaView

mod positions;
mod vtk;

pub use positions::{read_positions, write_positions, PositionError, PositionRecord};
pub use vtk::{write_arrivals_vtu, VtkError};
