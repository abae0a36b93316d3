//! Neural network representation.
//!
//! - Layers holding node values and the weight matrix to the next layer
//! - Forward propagation by pumping values layer to layer
//! - Weight mutations (additive shifts and fresh replacements)

mod layer;
mod mutations;
mod network;

pub use layer::{Layer, RANDOMIZE_WEIGHT_NEW_MAX, RANDOMIZE_WEIGHT_NEW_MIN};
pub use mutations::WeightMutation;
pub use network::{Activation, Network};
