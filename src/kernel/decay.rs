//! Exponential weight decay.

use crate::field::FieldSet;
use crate::particle::Particle;

use super::{Kernel, KernelOutcome, DECAY_RATE, WEIGHT_THRESHOLD};

/// Default decay rate: one-day e-folding time.
pub(crate) const DEFAULT_DECAY_RATE: f64 = 1.0 / 86400.0;
/// Default weight below which a particle is removed.
pub(crate) const DEFAULT_WEIGHT_THRESHOLD: f64 = 1e-3;

/// Exponential decay of the particle weight.
///
/// Each step multiplies the weight by `exp(-decay_rate * dt)`; once it
/// falls below `weight_threshold` the particle is deleted. Both
/// parameters are field-set constants (defaults: 1/86400 s⁻¹ and 1e-3).
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightDecay;

impl Kernel for WeightDecay {
    fn name(&self) -> &'static str {
        "Decay"
    }

    fn step(&self, p: &mut Particle, fields: &FieldSet, _time: f64, dt: f64) -> KernelOutcome {
        let rate = fields.constant_or(DECAY_RATE, DEFAULT_DECAY_RATE);
        p.weight *= (-rate * dt).exp();

        let threshold = fields.constant_or(WEIGHT_THRESHOLD, DEFAULT_WEIGHT_THRESHOLD);
        if p.weight < threshold {
            return KernelOutcome::Delete;
        }
        KernelOutcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldSet, Mesh};

    #[test]
    fn test_one_efolding_day() {
        let mut fields = FieldSet::uniform(Mesh::Flat, 0.0, 0.0);
        fields.add_constant(DECAY_RATE, 1.0 / 86400.0);
        fields.add_constant(WEIGHT_THRESHOLD, 1e-3);

        let mut p = Particle::new(1, 0.0, 0.0).with_weight(1.0);
        // 24 hourly steps make one e-folding day
        for _ in 0..24 {
            assert_eq!(
                WeightDecay.step(&mut p, &fields, 0.0, 3600.0),
                KernelOutcome::Ok
            );
        }
        assert!((p.weight - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_deletes_below_threshold() {
        let mut fields = FieldSet::uniform(Mesh::Flat, 0.0, 0.0);
        fields.add_constant(DECAY_RATE, 1.0 / 86400.0);
        fields.add_constant(WEIGHT_THRESHOLD, 1e-3);

        let mut p = Particle::new(1, 0.0, 0.0).with_weight(1.0);
        // ln(1e-3) is about -6.9: the weight crosses the threshold during
        // the seventh simulated day
        let mut deleted_at = None;
        for day in 1..=10 {
            if WeightDecay.step(&mut p, &fields, 0.0, 86400.0) == KernelOutcome::Delete {
                deleted_at = Some(day);
                break;
            }
        }
        assert_eq!(deleted_at, Some(7));
    }

    #[test]
    fn test_defaults_apply() {
        let fields = FieldSet::uniform(Mesh::Flat, 0.0, 0.0);
        let mut p = Particle::new(1, 0.0, 0.0).with_weight(1.0);

        WeightDecay.step(&mut p, &fields, 0.0, 86400.0);
        assert!((p.weight - (-1.0f64).exp()).abs() < 1e-12);
    }
}
