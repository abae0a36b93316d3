//! Feed-forward network built from pumped layers.

use super::layer::Layer;
use super::mutations::WeightMutation;
use crate::error::EvolutionError;
use crate::random::ProbabilitySource;
use serde::{Deserialize, Serialize};

/// Non-linearity applied to a layer's values after it is pumped into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Raw weighted sums
    #[default]
    Identity,
    Tanh,
    Sigmoid,
    Relu,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Tanh => x.tanh(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Relu => x.max(0.0),
        }
    }
}

/// Ordered layers plus the fitness last assigned by the evaluator
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
    activation: Activation,
    fitness: f32,
}

impl Network {
    /// Build a network from layer sizes, input layer first.
    ///
    /// Needs at least two sizes, none of them zero.
    pub fn new<R: ProbabilitySource + ?Sized>(
        sizes: &[usize],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        validate_sizes(sizes)?;

        let layers = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let next = sizes.get(i + 1).copied().unwrap_or(0);
                Layer::new(size, next, &mut *rng)
            })
            .collect();

        Ok(Self {
            layers,
            activation,
            fitness: 0.0,
        })
    }

    #[inline]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[inline]
    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::size_of_layer).collect()
    }

    pub fn n_inputs(&self) -> usize {
        self.layers[0].size_of_layer()
    }

    pub fn n_outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].size_of_layer()
    }

    /// Forward pass: load inputs, then pump layer by layer, activating each destination
    pub fn evaluate(&mut self, inputs: &[f32]) -> Vec<f32> {
        debug_assert_eq!(inputs.len(), self.n_inputs());

        self.layers[0].set_values(inputs);
        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let dest = &mut rest[0];
            done[i - 1].pump(dest);

            if self.activation != Activation::Identity {
                let activation = self.activation;
                dest.values_mut().mapv_inplace(|x| activation.apply(x));
            }
        }

        self.layers[self.layers.len() - 1].values().to_vec()
    }

    /// Apply the same weight mutation pass to every layer
    pub fn mutate<R: ProbabilitySource + ?Sized>(&mut self, mutation: &WeightMutation, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(mutation, rng);
        }
    }

    /// Total number of weights
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::weight_count).sum()
    }

    /// Check if network is valid (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(Layer::is_valid)
    }
}

fn validate_sizes(sizes: &[usize]) -> Result<(), EvolutionError> {
    if sizes.len() < 2 {
        return Err(EvolutionError::InvalidTopology(format!(
            "need at least 2 layer sizes, got {}",
            sizes.len()
        )));
    }
    if let Some(i) = sizes.iter().position(|&s| s == 0) {
        return Err(EvolutionError::InvalidTopology(format!("layer {} has size 0", i)));
    }
    Ok(())
}
