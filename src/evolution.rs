//! Evolution mechanics: self-adapting hyperparameters and the population controller.

pub mod hyperparams;
mod population;

pub use hyperparams::{clamp, HyperParameterBounds, HyperParameters, ParameterBounds, ShiftAnchor};
pub use population::{GenerationState, HyperParameterGroup};
