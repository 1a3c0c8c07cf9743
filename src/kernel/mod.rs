//! Per-particle kernels.
//!
//! A kernel updates one particle over one time step from the field set.
//! Kernels compose into a [`KernelChain`] applied left to right, e.g.
//! advection + windage + decay; the first non-[`Ok`](KernelOutcome::Ok)
//! outcome short-circuits the chain for that particle and step.
//!
//! Kernels read their parameters from named field-set constants so one
//! configured field set fully describes a run; each constant falls back
//! to a conventional default when unset.

mod advection;
mod decay;
mod windage;

pub use advection::AdvectionRk4;
pub use decay::WeightDecay;
pub use windage::{ConstantWindage, FieldWindage};

use crate::field::FieldSet;
use crate::particle::Particle;

/// Field-set constant: fraction of the wind velocity applied as drift.
pub const WINDAGE_COEFF: &str = "windage_coeff";
/// Field-set constant: constant eastward windage (axis units per second).
pub const WINDAGE_U: &str = "windage_u";
/// Field-set constant: constant northward windage (axis units per second).
pub const WINDAGE_V: &str = "windage_v";
/// Field-set constant: exponential weight decay rate (1/s).
pub const DECAY_RATE: &str = "decay_rate";
/// Field-set constant: weight below which a particle is removed.
pub const WEIGHT_THRESHOLD: &str = "weight_threshold";

/// Result of applying a kernel to one particle for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelOutcome {
    /// Particle updated, continue with the next kernel
    Ok,
    /// Particle should be removed (e.g. weight underflow)
    Delete,
    /// Particle drifted into an all-dry cell
    Beached,
    /// Particle left the field data extent
    OutOfBounds,
}

/// A per-particle update applied once per time step.
///
/// `time` is in seconds on the field set's time axis; `dt` is the step
/// length in seconds.
pub trait Kernel: Send + Sync {
    /// Kernel name for logging.
    fn name(&self) -> &'static str;

    /// Advance `particle` from `time` to `time + dt`.
    fn step(&self, particle: &mut Particle, fields: &FieldSet, time: f64, dt: f64)
        -> KernelOutcome;
}

/// An ordered composition of kernels.
#[derive(Default)]
pub struct KernelChain {
    kernels: Vec<Box<dyn Kernel>>,
}

impl KernelChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a kernel to the chain.
    pub fn with<K: Kernel + 'static>(mut self, kernel: K) -> Self {
        self.kernels.push(Box::new(kernel));
        self
    }

    /// Number of kernels in the chain.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Kernel names joined with `+`, e.g. `AdvectionRK4+Windage+Decay`.
    pub fn describe(&self) -> String {
        self.kernels
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Apply all kernels in order; the first non-`Ok` outcome wins.
    pub fn step(
        &self,
        particle: &mut Particle,
        fields: &FieldSet,
        time: f64,
        dt: f64,
    ) -> KernelOutcome {
        for kernel in &self.kernels {
            match kernel.step(particle, fields, time, dt) {
                KernelOutcome::Ok => continue,
                other => return other,
            }
        }
        KernelOutcome::Ok
    }
}
