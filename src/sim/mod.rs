//! Simulation runner.
//!
//! Ties a particle set, a kernel chain and a field set into a
//! fixed-step time loop.

mod runner;

pub use runner::{run, SimError, SimulationConfig, SimulationResult};
