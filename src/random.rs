//! Uniform probability source used by every stochastic decision.

use rand::{Rng, RngCore};

/// Source of uniform probabilities in `[0, 1)`.
///
/// Every random decision in the engine draws exactly one value through
/// [`ProbabilitySource::prob`], so a scripted source replays a run exactly.
pub trait ProbabilitySource {
    /// Next probability in `[0, 1)`
    fn prob(&mut self) -> f32;

    /// Uniform sample between `low` and `high`, scaled from one probability draw
    #[inline]
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        self.prob() * (high - low) + low
    }
}

impl<R: RngCore> ProbabilitySource for R {
    #[inline]
    fn prob(&mut self) -> f32 {
        self.gen::<f32>()
    }
}
