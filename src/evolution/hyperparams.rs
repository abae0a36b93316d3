//! Self-adapting mutation hyperparameters.
//!
//! Every population carries its own eight hyperparameters. Each generation
//! they are mutated with fixed per-field rules ([`ParameterBounds`]) before
//! being used to mutate network weights.

use crate::neural::WeightMutation;
use crate::random::ProbabilitySource;
use serde::{Deserialize, Serialize};

pub const DEFAULT_KILL_RATIO: f32 = 0.5;
pub const DEFAULT_MUTATE_RATIO: f32 = 0.5;
pub const DEFAULT_WEIGHT_SHIFT_RANGE_TOP: f32 = 0.1;
pub const DEFAULT_WEIGHT_SHIFT_RANGE_BOTTOM: f32 = -0.1;
pub const DEFAULT_NEW_WEIGHT_RANGE_TOP: f32 = 1.0;
pub const DEFAULT_NEW_WEIGHT_RANGE_BOTTOM: f32 = -1.0;
pub const DEFAULT_WEIGHT_SHIFT_CHANCE: f32 = 0.1;
pub const DEFAULT_WEIGHT_NEW_CHANCE: f32 = 0.01;

pub const KILL_RATIO_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.05,
    max: 0.95,
    new_min: 0.1,
    new_max: 0.9,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::Current,
};

pub const MUTATE_RATIO_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.05,
    max: 0.95,
    new_min: 0.1,
    new_max: 0.9,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::Current,
};

pub const WEIGHT_SHIFT_RANGE_TOP_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.0,
    max: 2.0,
    new_min: 0.0,
    new_max: 1.0,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::Current,
};

pub const WEIGHT_SHIFT_RANGE_BOTTOM_BOUNDS: ParameterBounds = ParameterBounds {
    min: -2.0,
    max: 0.0,
    new_min: -1.0,
    new_max: 0.0,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::MutateRatio,
};

pub const NEW_WEIGHT_RANGE_TOP_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.0,
    max: 4.0,
    new_min: 0.0,
    new_max: 2.0,
    new_chance: 0.02,
    shift_min: -0.1,
    shift_max: 0.1,
    shift_chance: 0.2,
    anchor: ShiftAnchor::Current,
};

pub const NEW_WEIGHT_RANGE_BOTTOM_BOUNDS: ParameterBounds = ParameterBounds {
    min: -4.0,
    max: 0.0,
    new_min: -2.0,
    new_max: 0.0,
    new_chance: 0.02,
    shift_min: -0.1,
    shift_max: 0.1,
    shift_chance: 0.2,
    anchor: ShiftAnchor::MutateRatio,
};

pub const WEIGHT_SHIFT_CHANCE_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.0,
    max: 1.0,
    new_min: 0.0,
    new_max: 0.5,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::MutateRatio,
};

pub const WEIGHT_NEW_CHANCE_BOUNDS: ParameterBounds = ParameterBounds {
    min: 0.0,
    max: 0.25,
    new_min: 0.0,
    new_max: 0.1,
    new_chance: 0.02,
    shift_min: -0.05,
    shift_max: 0.05,
    shift_chance: 0.2,
    anchor: ShiftAnchor::MutateRatio,
};

/// Clamp `value` into `[low, high]`. NaN maps to `low`.
#[inline]
pub fn clamp(value: f32, low: f32, high: f32) -> f32 {
    value.max(low).min(high)
}

/// What a shift mutation is added to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftAnchor {
    /// The field's own current value
    Current,
    /// The population's current mutate ratio
    MutateRatio,
}

/// Legal range and mutation rule of one hyperparameter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    /// Lowest legal value
    pub min: f32,
    /// Highest legal value
    pub max: f32,
    /// Lower bound of fresh draws
    pub new_min: f32,
    /// Upper bound of fresh draws
    pub new_max: f32,
    /// Probability of a fresh draw per generation
    pub new_chance: f32,
    /// Lower bound of shift amounts
    pub shift_min: f32,
    /// Upper bound of shift amounts
    pub shift_max: f32,
    /// Probability of a shift per generation
    pub shift_chance: f32,
    /// Base value a shift is added to
    pub anchor: ShiftAnchor,
}

impl ParameterBounds {
    /// Run the new trial, then the shift trial, then clamp
    pub fn mutate<R: ProbabilitySource + ?Sized>(&self, value: f32, mutate_ratio: f32, rng: &mut R) -> f32 {
        let mut value = value;
        if rng.prob() < self.new_chance {
            value = rng.uniform(self.new_min, self.new_max);
        }
        if rng.prob() < self.shift_chance {
            let shift = rng.uniform(self.shift_min, self.shift_max);
            value = match self.anchor {
                ShiftAnchor::Current => value + shift,
                ShiftAnchor::MutateRatio => mutate_ratio + shift,
            };
        }
        self.clamp(value)
    }

    /// Fresh draw from the new range, clamped
    pub fn randomize<R: ProbabilitySource + ?Sized>(&self, rng: &mut R) -> f32 {
        self.clamp(rng.uniform(self.new_min, self.new_max))
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        clamp(value, self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if !(self.min <= self.max) {
            return Err(format!("{}: min must not exceed max", name));
        }
        if !(self.new_min <= self.new_max) {
            return Err(format!("{}: new_min must not exceed new_max", name));
        }
        if !(self.shift_min <= self.shift_max) {
            return Err(format!("{}: shift_min must not exceed shift_max", name));
        }
        for (label, chance) in [("new_chance", self.new_chance), ("shift_chance", self.shift_chance)] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(format!("{}: {} must be in [0, 1]", name, label));
            }
        }
        Ok(())
    }
}

/// Bounds and mutation rules for all eight hyperparameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParameterBounds {
    pub kill_ratio: ParameterBounds,
    pub mutate_ratio: ParameterBounds,
    pub weight_shift_range_top: ParameterBounds,
    pub weight_shift_range_bottom: ParameterBounds,
    pub new_weight_range_top: ParameterBounds,
    pub new_weight_range_bottom: ParameterBounds,
    pub weight_shift_chance: ParameterBounds,
    pub weight_new_chance: ParameterBounds,
}

impl Default for HyperParameterBounds {
    fn default() -> Self {
        Self {
            kill_ratio: KILL_RATIO_BOUNDS,
            mutate_ratio: MUTATE_RATIO_BOUNDS,
            weight_shift_range_top: WEIGHT_SHIFT_RANGE_TOP_BOUNDS,
            weight_shift_range_bottom: WEIGHT_SHIFT_RANGE_BOTTOM_BOUNDS,
            new_weight_range_top: NEW_WEIGHT_RANGE_TOP_BOUNDS,
            new_weight_range_bottom: NEW_WEIGHT_RANGE_BOTTOM_BOUNDS,
            weight_shift_chance: WEIGHT_SHIFT_CHANCE_BOUNDS,
            weight_new_chance: WEIGHT_NEW_CHANCE_BOUNDS,
        }
    }
}

impl HyperParameterBounds {
    /// Set every field's shift anchor at once
    pub fn with_anchor(mut self, anchor: ShiftAnchor) -> Self {
        for bounds in self.fields_mut() {
            bounds.anchor = anchor;
        }
        self
    }

    fn fields_mut(&mut self) -> [&mut ParameterBounds; 8] {
        [
            &mut self.kill_ratio,
            &mut self.mutate_ratio,
            &mut self.weight_shift_range_top,
            &mut self.weight_shift_range_bottom,
            &mut self.new_weight_range_top,
            &mut self.new_weight_range_bottom,
            &mut self.weight_shift_chance,
            &mut self.weight_new_chance,
        ]
    }

    /// Validate every field plus the cross-field constraints.
    ///
    /// Range bottoms may not reach above their tops so that resolving a
    /// crossed pair keeps both values inside their bounds. Ratios must stay
    /// below 1 so the best network always survives.
    pub fn validate(&self) -> Result<(), String> {
        self.kill_ratio.validate("kill_ratio")?;
        self.mutate_ratio.validate("mutate_ratio")?;
        self.weight_shift_range_top.validate("weight_shift_range_top")?;
        self.weight_shift_range_bottom.validate("weight_shift_range_bottom")?;
        self.new_weight_range_top.validate("new_weight_range_top")?;
        self.new_weight_range_bottom.validate("new_weight_range_bottom")?;
        self.weight_shift_chance.validate("weight_shift_chance")?;
        self.weight_new_chance.validate("weight_new_chance")?;

        for (name, ratio) in [("kill_ratio", &self.kill_ratio), ("mutate_ratio", &self.mutate_ratio)] {
            if ratio.min < 0.0 || ratio.max >= 1.0 {
                return Err(format!("{} bounds must lie in [0, 1)", name));
            }
        }
        for (name, chance) in [
            ("weight_shift_chance", &self.weight_shift_chance),
            ("weight_new_chance", &self.weight_new_chance),
        ] {
            if chance.min < 0.0 || chance.max > 1.0 {
                return Err(format!("{} bounds must lie in [0, 1]", name));
            }
        }
        for (name, top, bottom) in [
            ("weight_shift_range", &self.weight_shift_range_top, &self.weight_shift_range_bottom),
            ("new_weight_range", &self.new_weight_range_top, &self.new_weight_range_bottom),
        ] {
            if bottom.min > top.min || bottom.max > top.max {
                return Err(format!("{}: bottom bounds must not exceed top bounds", name));
            }
        }
        Ok(())
    }
}

/// The eight evolving hyperparameters of a population
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParameters {
    pub kill_ratio: f32,
    pub mutate_ratio: f32,
    pub weight_shift_range_top: f32,
    pub weight_shift_range_bottom: f32,
    pub new_weight_range_top: f32,
    pub new_weight_range_bottom: f32,
    pub weight_shift_chance: f32,
    pub weight_new_chance: f32,
}

impl Default for HyperParameters {
    fn default() -> Self {
        Self {
            kill_ratio: DEFAULT_KILL_RATIO,
            mutate_ratio: DEFAULT_MUTATE_RATIO,
            weight_shift_range_top: DEFAULT_WEIGHT_SHIFT_RANGE_TOP,
            weight_shift_range_bottom: DEFAULT_WEIGHT_SHIFT_RANGE_BOTTOM,
            new_weight_range_top: DEFAULT_NEW_WEIGHT_RANGE_TOP,
            new_weight_range_bottom: DEFAULT_NEW_WEIGHT_RANGE_BOTTOM,
            weight_shift_chance: DEFAULT_WEIGHT_SHIFT_CHANCE,
            weight_new_chance: DEFAULT_WEIGHT_NEW_CHANCE,
        }
    }
}

impl HyperParameters {
    /// Self-mutate all fields in their fixed order
    pub fn mutate<R: ProbabilitySource + ?Sized>(&mut self, bounds: &HyperParameterBounds, rng: &mut R) {
        self.kill_ratio = bounds.kill_ratio.mutate(self.kill_ratio, self.mutate_ratio, rng);
        self.mutate_ratio = bounds.mutate_ratio.mutate(self.mutate_ratio, self.mutate_ratio, rng);

        self.weight_shift_range_top =
            bounds
                .weight_shift_range_top
                .mutate(self.weight_shift_range_top, self.mutate_ratio, rng);
        self.weight_shift_range_bottom =
            bounds
                .weight_shift_range_bottom
                .mutate(self.weight_shift_range_bottom, self.mutate_ratio, rng);
        self.resolve_weight_shift_range();

        self.new_weight_range_top =
            bounds
                .new_weight_range_top
                .mutate(self.new_weight_range_top, self.mutate_ratio, rng);
        self.new_weight_range_bottom =
            bounds
                .new_weight_range_bottom
                .mutate(self.new_weight_range_bottom, self.mutate_ratio, rng);
        self.resolve_new_weight_range();

        self.weight_shift_chance =
            bounds
                .weight_shift_chance
                .mutate(self.weight_shift_chance, self.mutate_ratio, rng);
        self.weight_new_chance =
            bounds
                .weight_new_chance
                .mutate(self.weight_new_chance, self.mutate_ratio, rng);
    }

    /// Replace every field with a fresh draw from its new range
    pub fn randomize<R: ProbabilitySource + ?Sized>(&mut self, bounds: &HyperParameterBounds, rng: &mut R) {
        self.weight_shift_range_top = bounds.weight_shift_range_top.randomize(rng);
        self.weight_shift_range_bottom = bounds.weight_shift_range_bottom.randomize(rng);
        self.new_weight_range_top = bounds.new_weight_range_top.randomize(rng);
        self.new_weight_range_bottom = bounds.new_weight_range_bottom.randomize(rng);
        self.kill_ratio = bounds.kill_ratio.randomize(rng);
        self.mutate_ratio = bounds.mutate_ratio.randomize(rng);
        self.weight_shift_chance = bounds.weight_shift_chance.randomize(rng);
        self.weight_new_chance = bounds.weight_new_chance.randomize(rng);
        self.resolve_weight_shift_range();
        self.resolve_new_weight_range();
    }

    /// Pull a crossed shift range back to its midpoint
    pub fn resolve_weight_shift_range(&mut self) {
        resolve_range(&mut self.weight_shift_range_top, &mut self.weight_shift_range_bottom);
    }

    /// Pull a crossed new-weight range back to its midpoint
    pub fn resolve_new_weight_range(&mut self) {
        resolve_range(&mut self.new_weight_range_top, &mut self.new_weight_range_bottom);
    }

    /// Clamp every field into its bounds, then resolve both ranges
    pub fn clamp_to(&mut self, bounds: &HyperParameterBounds) {
        self.kill_ratio = bounds.kill_ratio.clamp(self.kill_ratio);
        self.mutate_ratio = bounds.mutate_ratio.clamp(self.mutate_ratio);
        self.weight_shift_range_top = bounds.weight_shift_range_top.clamp(self.weight_shift_range_top);
        self.weight_shift_range_bottom = bounds.weight_shift_range_bottom.clamp(self.weight_shift_range_bottom);
        self.new_weight_range_top = bounds.new_weight_range_top.clamp(self.new_weight_range_top);
        self.new_weight_range_bottom = bounds.new_weight_range_bottom.clamp(self.new_weight_range_bottom);
        self.weight_shift_chance = bounds.weight_shift_chance.clamp(self.weight_shift_chance);
        self.weight_new_chance = bounds.weight_new_chance.clamp(self.weight_new_chance);
        self.resolve_weight_shift_range();
        self.resolve_new_weight_range();
    }

    /// Check every field lies in its bounds
    pub fn is_within(&self, bounds: &HyperParameterBounds) -> bool {
        bounds.kill_ratio.contains(self.kill_ratio)
            && bounds.mutate_ratio.contains(self.mutate_ratio)
            && bounds.weight_shift_range_top.contains(self.weight_shift_range_top)
            && bounds.weight_shift_range_bottom.contains(self.weight_shift_range_bottom)
            && bounds.new_weight_range_top.contains(self.new_weight_range_top)
            && bounds.new_weight_range_bottom.contains(self.new_weight_range_bottom)
            && bounds.weight_shift_chance.contains(self.weight_shift_chance)
            && bounds.weight_new_chance.contains(self.weight_new_chance)
    }

    /// Weight mutation pass described by the current values
    pub fn weight_mutation(&self) -> WeightMutation {
        WeightMutation {
            shift_chance: self.weight_shift_chance,
            new_chance: self.weight_new_chance,
            shift_top: self.weight_shift_range_top,
            shift_bottom: self.weight_shift_range_bottom,
            new_top: self.new_weight_range_top,
            new_bottom: self.new_weight_range_bottom,
        }
    }
}

fn resolve_range(top: &mut f32, bottom: &mut f32) {
    if *top < *bottom {
        let difference = *bottom - *top;
        *top += difference / 2.0;
        *bottom -= difference / 2.0;
    }
}
