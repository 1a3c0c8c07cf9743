//! Fourth-order Runge-Kutta advection.

use crate::field::{FieldSet, Sample};
use crate::particle::Particle;

use super::{Kernel, KernelOutcome};

/// Classic four-stage Runge-Kutta advection by the (U, V) velocity.
///
/// Velocities are sampled at the particle position and at the RK
/// midpoints/endpoint, each converted to degrees per second at the
/// latitude of the sample (on a spherical mesh), then combined with the
/// usual 1/6 (k1 + 2 k2 + 2 k3 + k4) weighting.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdvectionRk4;

impl AdvectionRk4 {
    /// Sample the velocity and convert it to degrees per second.
    fn velocity(
        fields: &FieldSet,
        time: f64,
        lat: f64,
        lon: f64,
    ) -> Result<(f64, f64), KernelOutcome> {
        match fields.sample_uv(time, lat, lon) {
            Sample::Value((u, v)) => Ok(fields.mesh().velocity_to_degrees(u, v, lat)),
            Sample::Dry => Err(KernelOutcome::Beached),
            Sample::OutOfBounds => Err(KernelOutcome::OutOfBounds),
        }
    }
}

impl Kernel for AdvectionRk4 {
    fn name(&self) -> &'static str {
        "AdvectionRK4"
    }

    fn step(&self, p: &mut Particle, fields: &FieldSet, time: f64, dt: f64) -> KernelOutcome {
        let (u1, v1) = match Self::velocity(fields, time, p.lat, p.lon) {
            Ok(uv) => uv,
            Err(outcome) => return outcome,
        };
        let (lon1, lat1) = (p.lon + u1 * 0.5 * dt, p.lat + v1 * 0.5 * dt);

        let (u2, v2) = match Self::velocity(fields, time + 0.5 * dt, lat1, lon1) {
            Ok(uv) => uv,
            Err(outcome) => return outcome,
        };
        let (lon2, lat2) = (p.lon + u2 * 0.5 * dt, p.lat + v2 * 0.5 * dt);

        let (u3, v3) = match Self::velocity(fields, time + 0.5 * dt, lat2, lon2) {
            Ok(uv) => uv,
            Err(outcome) => return outcome,
        };
        let (lon3, lat3) = (p.lon + u3 * dt, p.lat + v3 * dt);

        let (u4, v4) = match Self::velocity(fields, time + dt, lat3, lon3) {
            Ok(uv) => uv,
            Err(outcome) => return outcome,
        };

        p.lon += (u1 + 2.0 * u2 + 2.0 * u3 + u4) / 6.0 * dt;
        p.lat += (v1 + 2.0 * v2 + 2.0 * v3 + v4) / 6.0 * dt;
        KernelOutcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Mesh, DEG_TO_METERS, FILL_VALUE};

    const TOL: f64 = 1e-9;

    #[test]
    fn test_uniform_flat_advection() {
        // 0.001 units/s eastward for 1000 s moves exactly 1 unit
        let fields = FieldSet::uniform(Mesh::Flat, 1e-3, 0.0);
        let mut p = Particle::new(1, 0.0, 0.0);

        let outcome = AdvectionRk4.step(&mut p, &fields, 0.0, 1000.0);
        assert_eq!(outcome, KernelOutcome::Ok);
        assert!((p.lon - 1.0).abs() < TOL);
        assert!(p.lat.abs() < TOL);
    }

    #[test]
    fn test_uniform_spherical_advection() {
        // 1 m/s northward at the equator for one hour
        let fields = FieldSet::uniform(Mesh::Spherical, 0.0, 1.0);
        let mut p = Particle::new(1, 0.0, 0.0);

        AdvectionRk4.step(&mut p, &fields, 0.0, 3600.0);
        let expected = 3600.0 / DEG_TO_METERS;
        assert!((p.lat - expected).abs() < 1e-12);
        assert!(p.lon.abs() < TOL);
    }

    #[test]
    fn test_spherical_longitude_scaling() {
        // The same eastward current covers more degrees at high latitude
        let fields = FieldSet::uniform(Mesh::Spherical, 1.0, 0.0);

        let mut near_equator = Particle::new(1, 0.0, 0.0);
        let mut high_lat = Particle::new(2, 60.0, 0.0);
        AdvectionRk4.step(&mut near_equator, &fields, 0.0, 3600.0);
        AdvectionRk4.step(&mut high_lat, &fields, 0.0, 3600.0);

        assert!(high_lat.lon > near_equator.lon * 1.9);
    }

    #[test]
    fn test_rk4_beats_euler_on_shear() {
        // U varies linearly with latitude while V is constant: the exact
        // trajectory curves, and a single RK4 step tracks it closely.
        let lon = vec![-10.0, 10.0];
        let lat = vec![0.0, 1.0];
        let time = vec![0.0];
        // u = lat (units/s), v = 1e-4
        let u = vec![vec![vec![0.0, 0.0], vec![1.0, 1.0]]];
        let v = vec![vec![vec![1e-4; 2]; 2]];
        let fields = FieldSet::new(Mesh::Flat, lon, lat, time, u, v).unwrap();

        let dt = 1000.0;
        let mut p = Particle::new(1, 0.0, 0.0);
        AdvectionRk4.step(&mut p, &fields, 0.0, dt);

        // Exact: lat(t) = 1e-4 t, lon(t) = 1e-4 t^2 / 2 = 50.0e-3
        let exact_lon = 1e-4 * dt * dt / 2.0;
        assert!((p.lat - 0.1).abs() < TOL);
        assert!(
            (p.lon - exact_lon).abs() < 1e-6,
            "lon={}, exact={}",
            p.lon,
            exact_lon
        );

        // Forward Euler from the same start would not move in lon at all
        let euler_lon_error = (0.0f64 - exact_lon).abs();
        assert!((p.lon - exact_lon).abs() < euler_lon_error / 100.0);
    }

    #[test]
    fn test_leaving_domain() {
        let lon = vec![0.0, 1.0];
        let lat = vec![0.0, 1.0];
        let time = vec![0.0];
        let u = vec![vec![vec![0.1; 2]; 2]];
        let v = vec![vec![vec![0.0; 2]; 2]];
        let fields = FieldSet::new(Mesh::Flat, lon, lat, time, u, v).unwrap();

        // Fast eastward flow pushes the midpoint past the eastern edge
        let mut p = Particle::new(1, 0.5, 0.9);
        let outcome = AdvectionRk4.step(&mut p, &fields, 0.0, 100.0);
        assert_eq!(outcome, KernelOutcome::OutOfBounds);
    }

    #[test]
    fn test_dry_cell_beaches() {
        let lon = vec![0.0, 1.0];
        let lat = vec![0.0, 1.0];
        let time = vec![0.0];
        let dry = vec![vec![vec![FILL_VALUE; 2]; 2]];
        let fields = FieldSet::new(Mesh::Flat, lon.clone(), lat, time, dry.clone(), dry).unwrap();

        let mut p = Particle::new(1, 0.5, 0.5);
        let outcome = AdvectionRk4.step(&mut p, &fields, 0.0, 100.0);
        assert_eq!(outcome, KernelOutcome::Beached);
    }
}
