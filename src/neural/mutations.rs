//! Weight mutation parameters and the per-layer mutation pass.

use super::layer::Layer;
use crate::random::ProbabilitySource;

/// Parameters for one weight mutation pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightMutation {
    /// Probability of perturbing each weight
    pub shift_chance: f32,
    /// Probability of replacing each weight
    pub new_chance: f32,
    /// Upper bound of the additive perturbation
    pub shift_top: f32,
    /// Lower bound of the additive perturbation
    pub shift_bottom: f32,
    /// Upper bound of replacement weights
    pub new_top: f32,
    /// Lower bound of replacement weights
    pub new_bottom: f32,
}

impl WeightMutation {
    /// A pass that leaves every weight untouched
    pub fn none() -> Self {
        Self {
            shift_chance: 0.0,
            new_chance: 0.0,
            shift_top: 0.0,
            shift_bottom: 0.0,
            new_top: 0.0,
            new_bottom: 0.0,
        }
    }
}

impl Layer {
    /// Mutate every weight with two independent trials.
    ///
    /// The shift trial adds a sample from `[shift_bottom, shift_top]`; the new
    /// trial then overwrites the weight with a sample from
    /// `[new_bottom, new_top]`. Both can hit the same weight.
    pub fn mutate<R: ProbabilitySource + ?Sized>(&mut self, mutation: &WeightMutation, rng: &mut R) {
        for w in self.weights_mut().iter_mut() {
            if rng.prob() < mutation.shift_chance {
                *w += rng.uniform(mutation.shift_bottom, mutation.shift_top);
            }
            if rng.prob() < mutation.new_chance {
                *w = rng.uniform(mutation.new_bottom, mutation.new_top);
            }
        }
    }
}
