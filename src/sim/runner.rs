//! Fixed-step particle simulation loop.

use std::time::Instant;

use log::{debug, info};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::field::FieldSet;
use crate::kernel::{KernelChain, KernelOutcome};
use crate::particle::{Particle, ParticleSet, ParticleStatus};

/// Error type for simulation runs.
#[derive(Debug, Error)]
pub enum SimError {
    /// Time step must be positive and no larger than the runtime
    #[error("Invalid time step {dt} s for runtime {runtime} s")]
    InvalidTimeStep { dt: f64, runtime: f64 },

    /// Nothing to simulate
    #[error("Particle set is empty")]
    NoParticles,
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Time step in seconds
    pub dt: f64,
    /// Total simulated duration in seconds
    pub runtime: f64,
    /// Log progress during the run
    pub verbose: bool,
    /// Interval between progress messages, in simulated seconds
    pub progress_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // 72 h forecast horizon at 15-minute steps
            dt: 900.0,
            runtime: 72.0 * 3600.0,
            verbose: false,
            progress_interval: 6.0 * 3600.0,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration with the given step and runtime (seconds).
    pub fn new(dt: f64, runtime: f64) -> Self {
        Self {
            dt,
            runtime,
            ..Self::default()
        }
    }

    /// Enable progress logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn validate(&self) -> Result<(), SimError> {
        if !(self.dt > 0.0) || self.dt > self.runtime {
            return Err(SimError::InvalidTimeStep {
                dt: self.dt,
                runtime: self.runtime,
            });
        }
        Ok(())
    }
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Number of time steps taken
    pub n_steps: usize,
    /// Final simulated time in seconds
    pub final_time: f64,
    /// Particles released during the run
    pub released: usize,
    /// Particles still active at the end
    pub active: usize,
    /// Particles removed by weight decay
    pub evaporated: usize,
    /// Particles stranded in dry cells
    pub beached: usize,
    /// Particles that left the field data extent
    pub out_of_domain: usize,
    /// Wall-clock duration of the run in seconds
    pub wall_time: f64,
}

/// Advect a particle set through a field set with a kernel chain.
///
/// Runs from t = 0 to `config.runtime` in steps of `config.dt` (a final
/// shorter step covers any remainder). Kernel time is expressed on the
/// field set's time axis: when the field set carries a reference
/// instant, the offset between it and the particle set's start time is
/// applied automatically.
pub fn run(
    pset: &mut ParticleSet,
    chain: &KernelChain,
    fields: &FieldSet,
    config: &SimulationConfig,
) -> Result<SimulationResult, SimError> {
    config.validate()?;
    if pset.is_empty() {
        return Err(SimError::NoParticles);
    }

    // Offset from simulation time to the field time axis
    let base = fields
        .reference()
        .map(|r| (pset.start_time() - r).num_seconds() as f64)
        .unwrap_or(0.0);

    if config.verbose {
        info!(
            "Starting run: {} particles, kernels [{}], dt = {} s, runtime = {} s",
            pset.len(),
            chain.describe(),
            config.dt,
            config.runtime
        );
    }

    let start = Instant::now();
    let mut t = 0.0;
    let mut n_steps = 0usize;
    let mut next_progress = config.progress_interval;

    while t < config.runtime {
        let dt = config.dt.min(config.runtime - t);

        step_all(pset.particles_mut(), chain, fields, base + t, t, dt);

        t += dt;
        n_steps += 1;

        if config.verbose && t >= next_progress {
            info!(
                "t = {:>8.0} s: {} active, {} evaporated, {} beached, {} out of domain",
                t,
                pset.count(ParticleStatus::Active),
                pset.count(ParticleStatus::Evaporated),
                pset.count(ParticleStatus::Beached),
                pset.count(ParticleStatus::OutOfDomain),
            );
            next_progress += config.progress_interval;
        }
    }

    let result = SimulationResult {
        n_steps,
        final_time: t,
        released: pset
            .particles()
            .iter()
            .filter(|p| p.is_released(t))
            .count(),
        active: pset.count(ParticleStatus::Active),
        evaporated: pset.count(ParticleStatus::Evaporated),
        beached: pset.count(ParticleStatus::Beached),
        out_of_domain: pset.count(ParticleStatus::OutOfDomain),
        wall_time: start.elapsed().as_secs_f64(),
    };

    if config.verbose {
        info!(
            "Run finished: {} steps in {:.2} s wall time",
            result.n_steps, result.wall_time
        );
    }

    Ok(result)
}

#[cfg(feature = "parallel")]
fn step_all(
    particles: &mut [Particle],
    chain: &KernelChain,
    fields: &FieldSet,
    field_time: f64,
    elapsed: f64,
    dt: f64,
) {
    particles
        .par_iter_mut()
        .for_each(|p| step_particle(p, chain, fields, field_time, elapsed, dt));
}

#[cfg(not(feature = "parallel"))]
fn step_all(
    particles: &mut [Particle],
    chain: &KernelChain,
    fields: &FieldSet,
    field_time: f64,
    elapsed: f64,
    dt: f64,
) {
    for p in particles {
        step_particle(p, chain, fields, field_time, elapsed, dt);
    }
}

fn step_particle(
    p: &mut Particle,
    chain: &KernelChain,
    fields: &FieldSet,
    field_time: f64,
    elapsed: f64,
    dt: f64,
) {
    if !p.status.is_active() || !p.is_released(elapsed) {
        return;
    }

    match chain.step(p, fields, field_time, dt) {
        KernelOutcome::Ok => {}
        KernelOutcome::Delete => {
            debug!("particle {} evaporated at t = {} s", p.release_id, elapsed);
            p.status = ParticleStatus::Evaporated;
        }
        KernelOutcome::Beached => {
            debug!("particle {} beached at t = {} s", p.release_id, elapsed);
            p.status = ParticleStatus::Beached;
        }
        KernelOutcome::OutOfBounds => {
            debug!(
                "particle {} left the domain at t = {} s",
                p.release_id, elapsed
            );
            p.status = ParticleStatus::OutOfDomain;
        }
    }
    p.age += dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::field::{FieldSet, Mesh};
    use crate::kernel::{AdvectionRk4, KernelChain};
    use crate::particle::Particle;

    const TOL: f64 = 1e-9;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_uniform_drift() {
        let fields = FieldSet::uniform(Mesh::Flat, 1e-4, 0.0);
        let mut pset = ParticleSet::new(vec![Particle::new(1, 0.0, 0.0)], start());
        let chain = KernelChain::new().with(AdvectionRk4);
        let config = SimulationConfig::new(3600.0, 10.0 * 3600.0);

        let result = run(&mut pset, &chain, &fields, &config).unwrap();

        assert_eq!(result.n_steps, 10);
        assert_eq!(result.active, 1);
        assert!((result.final_time - 36_000.0).abs() < TOL);
        // 1e-4 units/s for 36000 s
        assert!((pset.particles()[0].lon - 3.6).abs() < 1e-6);
    }

    #[test]
    fn test_remainder_step() {
        let fields = FieldSet::uniform(Mesh::Flat, 1e-4, 0.0);
        let mut pset = ParticleSet::new(vec![Particle::new(1, 0.0, 0.0)], start());
        let chain = KernelChain::new().with(AdvectionRk4);
        // 2.5 steps: two full plus one half step
        let config = SimulationConfig::new(1000.0, 2500.0);

        let result = run(&mut pset, &chain, &fields, &config).unwrap();
        assert_eq!(result.n_steps, 3);
        assert!((result.final_time - 2500.0).abs() < TOL);
        assert!((pset.particles()[0].lon - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_release_delay_holds_particle() {
        let fields = FieldSet::uniform(Mesh::Flat, 1e-3, 0.0);
        let held = Particle::new(2, 0.0, 0.0).with_release_delay(1800.0);
        let mut pset = ParticleSet::new(vec![Particle::new(1, 0.0, 0.0), held], start());
        let chain = KernelChain::new().with(AdvectionRk4);
        let config = SimulationConfig::new(900.0, 3600.0);

        run(&mut pset, &chain, &fields, &config).unwrap();

        // First particle drifted the full hour; the delayed one only half
        assert!((pset.particles()[0].lon - 3.6).abs() < 1e-9);
        assert!((pset.particles()[1].lon - 1.8).abs() < 1e-9);
        // Age only counts time since release
        assert!((pset.particles()[0].age - 3600.0).abs() < TOL);
        assert!((pset.particles()[1].age - 1800.0).abs() < TOL);
    }

    #[test]
    fn test_field_reference_offset() {
        // Field axis starts one hour before the simulation: U doubles
        // from 0.1 to 0.2 over two hours on the field clock, so the
        // simulation (starting at field hour 1) samples 0.15 first.
        let lon = vec![-10.0, 10.0];
        let lat = vec![-1.0, 1.0];
        let time = vec![0.0, 7200.0];
        let u = vec![vec![vec![0.1; 2]; 2], vec![vec![0.2; 2]; 2]];
        let v = vec![vec![vec![0.0; 2]; 2], vec![vec![0.0; 2]; 2]];
        let reference = start() - Duration::hours(1);
        let fields = FieldSet::new(Mesh::Flat, lon, lat, time, u, v)
            .unwrap()
            .with_reference(reference);

        let mut pset = ParticleSet::new(vec![Particle::new(1, 0.0, 0.0)], start());
        let chain = KernelChain::new().with(AdvectionRk4);
        // One instantaneous-ish step right at the start
        let config = SimulationConfig::new(1.0, 1.0);
        run(&mut pset, &chain, &fields, &config).unwrap();

        assert!(
            (pset.particles()[0].lon - 0.15).abs() < 1e-4,
            "lon = {}",
            pset.particles()[0].lon
        );
    }

    #[test]
    fn test_invalid_config() {
        let fields = FieldSet::uniform(Mesh::Flat, 0.0, 0.0);
        let mut pset = ParticleSet::new(vec![Particle::new(1, 0.0, 0.0)], start());
        let chain = KernelChain::new();

        let bad_dt = SimulationConfig::new(0.0, 3600.0);
        assert!(matches!(
            run(&mut pset, &chain, &fields, &bad_dt),
            Err(SimError::InvalidTimeStep { .. })
        ));

        let too_long = SimulationConfig::new(7200.0, 3600.0);
        assert!(matches!(
            run(&mut pset, &chain, &fields, &too_long),
            Err(SimError::InvalidTimeStep { .. })
        ));
    }

    #[test]
    fn test_empty_particle_set() {
        let fields = FieldSet::uniform(Mesh::Flat, 0.0, 0.0);
        let mut pset = ParticleSet::new(Vec::new(), start());
        let chain = KernelChain::new();
        let config = SimulationConfig::new(900.0, 3600.0);

        assert!(matches!(
            run(&mut pset, &chain, &fields, &config),
            Err(SimError::NoParticles)
        ));
    }
}
