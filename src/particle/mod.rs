//! Lagrangian particles and particle sets.

use chrono::{DateTime, NaiveTime, Utc};

use crate::schedule::ReleaseSite;

/// Default initial weight for buoyant releases, in kg (three 545 g units).
pub const BUOYANT_WEIGHT_KG: f64 = 1.635;

/// Life-cycle state of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleStatus {
    /// Advected every step (once released)
    Active,
    /// Weight fell below the evaporation threshold; frozen in place
    Evaporated,
    /// Drifted into an all-dry (land) cell; frozen in place
    Beached,
    /// Left the spatial extent of the field data; frozen in place
    OutOfDomain,
}

impl ParticleStatus {
    /// Whether the particle still takes part in the simulation.
    pub fn is_active(&self) -> bool {
        matches!(self, ParticleStatus::Active)
    }
}

/// A single drifting particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Release group this particle belongs to
    pub release_id: u32,
    /// Longitude in degrees east
    pub lon: f64,
    /// Latitude in degrees north
    pub lat: f64,
    /// Depth in meters (surface drift: 0)
    pub depth: f64,
    /// Seconds since this particle was released
    pub age: f64,
    /// Carried weight (kg); decays under a [`WeightDecay`] kernel
    ///
    /// [`WeightDecay`]: crate::kernel::WeightDecay
    pub weight: f64,
    /// Seconds after simulation start at which the particle is released
    pub release_delay: f64,
    /// Current life-cycle state
    pub status: ParticleStatus,
}

impl Particle {
    /// Create an active surface particle.
    pub fn new(release_id: u32, lat: f64, lon: f64) -> Self {
        Self {
            release_id,
            lon,
            lat,
            depth: 0.0,
            age: 0.0,
            weight: 1.0,
            release_delay: 0.0,
            status: ParticleStatus::Active,
        }
    }

    /// Set the initial weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Delay the release by `seconds` after simulation start.
    pub fn with_release_delay(mut self, seconds: f64) -> Self {
        self.release_delay = seconds;
        self
    }

    /// Whether the particle has been released at elapsed time `t`.
    pub fn is_released(&self, t: f64) -> bool {
        t >= self.release_delay
    }
}

/// A set of particles sharing a simulation start time.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    start_time: DateTime<Utc>,
}

impl ParticleSet {
    /// Create a set from explicit particles.
    pub fn new(particles: Vec<Particle>, start_time: DateTime<Utc>) -> Self {
        Self {
            particles,
            start_time,
        }
    }

    /// One particle per release site, all released at simulation start.
    pub fn from_sites(sites: &[ReleaseSite], start_time: DateTime<Utc>, weight: f64) -> Self {
        let particles = sites
            .iter()
            .map(|s| Particle::new(s.release_id, s.lat, s.lon).with_weight(weight))
            .collect();
        Self::new(particles, start_time)
    }

    /// One particle per release site, each held at its seed until its
    /// scheduled release time. The earliest site releases at t = 0.
    pub fn from_sites_staggered(
        sites: &[ReleaseSite],
        start_time: DateTime<Utc>,
        weight: f64,
    ) -> Self {
        let earliest = sites
            .iter()
            .map(|s| s.release_time)
            .min()
            .unwrap_or(NaiveTime::MIN);
        let particles = sites
            .iter()
            .map(|s| {
                let delay = (s.release_time - earliest).num_seconds().max(0) as f64;
                Particle::new(s.release_id, s.lat, s.lon)
                    .with_weight(weight)
                    .with_release_delay(delay)
            })
            .collect();
        Self::new(particles, start_time)
    }

    /// Simulation start time (UTC).
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// The particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to the particles.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Check if the set has no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Count particles in a given status.
    pub fn count(&self, status: ParticleStatus) -> usize {
        self.particles.iter().filter(|p| p.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn sites() -> Vec<ReleaseSite> {
        vec![
            ReleaseSite {
                release_id: 1,
                lat: 31.5,
                lon: 34.4,
                release_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            },
            ReleaseSite {
                release_id: 2,
                lat: 31.8,
                lon: 34.6,
                release_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            },
        ]
    }

    #[test]
    fn test_from_sites() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let pset = ParticleSet::from_sites(&sites(), start, BUOYANT_WEIGHT_KG);

        assert_eq!(pset.len(), 2);
        let p = &pset.particles()[0];
        assert_eq!(p.release_id, 1);
        assert_eq!(p.depth, 0.0);
        assert_eq!(p.weight, BUOYANT_WEIGHT_KG);
        assert_eq!(p.release_delay, 0.0);
        assert!(p.status.is_active());
    }

    #[test]
    fn test_staggered_delays() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let pset = ParticleSet::from_sites_staggered(&sites(), start, 1.0);

        assert_eq!(pset.particles()[0].release_delay, 0.0);
        assert_eq!(pset.particles()[1].release_delay, 1800.0);

        assert!(pset.particles()[1].is_released(1800.0));
        assert!(!pset.particles()[1].is_released(900.0));
    }

    #[test]
    fn test_status_counts() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut pset = ParticleSet::from_sites(&sites(), start, 1.0);
        pset.particles_mut()[1].status = ParticleStatus::Beached;

        assert_eq!(pset.count(ParticleStatus::Active), 1);
        assert_eq!(pset.count(ParticleStatus::Beached), 1);
        assert_eq!(pset.count(ParticleStatus::Evaporated), 0);
    }
}
