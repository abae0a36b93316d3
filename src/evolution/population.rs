//! Population controller: evaluation cursor, ranking, truncation and mutation.

use super::hyperparams::{HyperParameterBounds, HyperParameters};
use crate::config::{Config, ConfigError};
use crate::error::EvolutionError;
use crate::neural::{Activation, Network, WeightMutation};
use crate::stats::GenerationStats;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

/// Where the population is in its generation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationState {
    /// Network `index` is waiting to be evaluated
    Evaluating { index: usize },
    /// Every network has been evaluated; call `end_generation`
    Complete,
}

/// A fixed-size population of networks and its self-adapting hyperparameters.
///
/// Drivers pull networks through the cursor:
///
/// ```text
/// while let Some(net) = group.current_network_mut() {
///     net.set_fitness(score(net));
///     group.to_next_network();
/// }
/// group.end_generation()?;
/// ```
///
/// `run_generation` wraps that loop.
#[derive(Clone, Debug)]
pub struct HyperParameterGroup {
    networks: Vec<Network>,
    current_network_index: usize,
    hyperparameters: HyperParameters,
    bounds: HyperParameterBounds,
    generation: u64,
    stats_interval: u64,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl HyperParameterGroup {
    /// Create a population with default hyperparameters and a random seed
    pub fn new(layer_sizes: &[usize], networks_per_group: usize) -> Result<Self, EvolutionError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(layer_sizes, networks_per_group, seed)
    }

    /// Create a population with a specific seed for reproducibility
    pub fn new_with_seed(
        layer_sizes: &[usize],
        networks_per_group: usize,
        seed: u64,
    ) -> Result<Self, EvolutionError> {
        Self::build(
            layer_sizes,
            networks_per_group,
            Activation::Identity,
            HyperParameters::default(),
            HyperParameterBounds::default(),
            seed,
        )
    }

    /// Create a population from configuration. `seed` of `None` draws one.
    ///
    /// The configuration is validated first.
    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self, EvolutionError> {
        config.validate().map_err(|e| match e {
            ConfigError::Invalid(msg) => EvolutionError::InvalidConfig(msg),
            other => EvolutionError::InvalidConfig(other.to_string()),
        })?;

        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut group = Self::build(
            &config.population.layer_sizes,
            config.population.networks_per_group,
            config.population.activation,
            config.hyperparameters.initial,
            config.bounds,
            seed,
        )?;
        group.stats_interval = config.logging.stats_interval;
        if config.hyperparameters.randomize_initial {
            group.randomize_hyperparameters();
        }
        Ok(group)
    }

    fn build(
        layer_sizes: &[usize],
        networks_per_group: usize,
        activation: Activation,
        hyperparameters: HyperParameters,
        bounds: HyperParameterBounds,
        seed: u64,
    ) -> Result<Self, EvolutionError> {
        if networks_per_group == 0 {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let networks = (0..networks_per_group)
            .map(|_| Network::new(layer_sizes, activation, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        let mut hyperparameters = hyperparameters;
        hyperparameters.clamp_to(&bounds);

        log::debug!(
            "Population created: {} networks, layers {:?}, seed {}",
            networks_per_group,
            layer_sizes,
            seed
        );

        Ok(Self {
            networks,
            current_network_index: 0,
            hyperparameters,
            bounds,
            generation: 0,
            stats_interval: 0,
            rng,
            seed,
        })
    }

    // ----- evaluation cursor -----

    pub fn networks_per_group(&self) -> usize {
        self.networks.len()
    }

    pub fn current_network_index(&self) -> usize {
        self.current_network_index
    }

    pub fn state(&self) -> GenerationState {
        if self.current_network_index < self.networks.len() {
            GenerationState::Evaluating {
                index: self.current_network_index,
            }
        } else {
            GenerationState::Complete
        }
    }

    /// Network awaiting evaluation, `None` once the generation is complete
    pub fn current_network(&self) -> Option<&Network> {
        self.networks.get(self.current_network_index)
    }

    pub fn current_network_mut(&mut self) -> Option<&mut Network> {
        self.networks.get_mut(self.current_network_index)
    }

    /// Advance the cursor; saturates once every network is evaluated
    pub fn to_next_network(&mut self) {
        if self.current_network_index < self.networks.len() {
            self.current_network_index += 1;
        }
    }

    pub fn are_networks_done_running(&self) -> bool {
        self.state() == GenerationState::Complete
    }

    /// Evaluate every remaining network with `fitness`, then end the generation
    pub fn run_generation<F>(&mut self, mut fitness: F) -> Result<GenerationStats, EvolutionError>
    where
        F: FnMut(&mut Network) -> f32,
    {
        while let Some(network) = self.current_network_mut() {
            let score = fitness(network);
            network.set_fitness(score);
            self.to_next_network();
        }
        self.end_generation()
    }

    // ----- generation lifecycle -----

    /// Rank, truncate, self-mutate, mutate weights and restart the cursor.
    ///
    /// Fails without touching anything if networks remain unevaluated.
    pub fn end_generation(&mut self) -> Result<GenerationStats, EvolutionError> {
        if !self.are_networks_done_running() {
            return Err(EvolutionError::GenerationIncomplete {
                evaluated: self.current_network_index,
                total: self.networks.len(),
            });
        }

        self.sort_networks();
        let mut stats = GenerationStats::from_ranked(self.generation, &self.networks, self.hyperparameters);

        stats.kept = self.kill_networks();
        self.mutate_hyperparameters();
        stats.next_hyperparameters = self.hyperparameters;
        stats.mutated = self.mutate_networks();

        if !self.networks.iter().all(Network::is_valid) {
            log::warn!("Generation {}: non-finite weights after mutation", self.generation);
        }

        log::debug!("{}", stats);
        if self.stats_interval > 0 && self.generation % self.stats_interval == 0 {
            log::info!("{}", stats);
        }

        self.current_network_index = 0;
        self.generation += 1;
        Ok(stats)
    }

    /// Stable sort, best fitness first. NaN ranks last.
    pub fn sort_networks(&mut self) {
        self.networks.sort_by(|a, b| {
            rank_key(b.fitness())
                .partial_cmp(&rank_key(a.fitness()))
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Overwrite the bottom of the ranking with copies of the top.
    ///
    /// With `k = ceil(N * (1 - kill_ratio))`, slot `k + i` becomes a copy of
    /// slot `i`, in increasing order. Returns `k`.
    pub fn kill_networks(&mut self) -> usize {
        let n = self.networks.len();
        let k = split_index(n, self.hyperparameters.kill_ratio);
        for dst in k..n {
            let copy = self.networks[dst - k].clone();
            self.networks[dst] = copy;
        }
        k
    }

    /// Mutate the weights of slots `[ceil(N * (1 - mutate_ratio)), N)`.
    ///
    /// Returns the number of networks mutated.
    pub fn mutate_networks(&mut self) -> usize {
        let start = split_index(self.networks.len(), self.hyperparameters.mutate_ratio);
        let mutation = self.hyperparameters.weight_mutation();
        for network in &mut self.networks[start..] {
            network.mutate(&mutation, &mut self.rng);
        }
        self.networks.len() - start
    }

    /// Self-mutate the hyperparameters once
    pub fn mutate_hyperparameters(&mut self) {
        self.hyperparameters.mutate(&self.bounds, &mut self.rng);
    }

    /// Replace every hyperparameter with a fresh draw from its new range
    pub fn randomize_hyperparameters(&mut self) {
        self.hyperparameters.randomize(&self.bounds, &mut self.rng);
    }

    // ----- accessors -----

    /// Top-ranked network (meaningful after `end_generation`)
    pub fn best_network(&self) -> &Network {
        &self.networks[0]
    }

    pub fn best_network_fitness(&self) -> f32 {
        self.networks[0].fitness()
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn hyperparameters(&self) -> &HyperParameters {
        &self.hyperparameters
    }

    /// Replace the hyperparameters; values are clamped and ranges resolved
    pub fn set_hyperparameters(&mut self, hyperparameters: HyperParameters) {
        self.hyperparameters = hyperparameters;
        self.hyperparameters.clamp_to(&self.bounds);
    }

    pub fn bounds(&self) -> &HyperParameterBounds {
        &self.bounds
    }

    pub fn weight_mutation(&self) -> WeightMutation {
        self.hyperparameters.weight_mutation()
    }

    /// Number of completed generations
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Set how often (in generations) summaries are logged at info level; 0 disables
    pub fn set_stats_interval(&mut self, interval: u64) {
        self.stats_interval = interval;
    }

    #[cfg(test)]
    pub(crate) fn networks_mut(&mut self) -> &mut [Network] {
        &mut self.networks
    }
}

#[inline]
fn rank_key(fitness: f32) -> f32 {
    if fitness.is_nan() {
        f32::NEG_INFINITY
    } else {
        fitness
    }
}

/// `ceil(n * (1 - ratio))`, kept inside `[0, n]`
#[inline]
fn split_index(n: usize, ratio: f32) -> usize {
    let index = (n as f32 * (1.0 - ratio)).ceil();
    if index.is_nan() || index <= 0.0 {
        0
    } else {
        (index as usize).min(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(n: usize) -> HyperParameterGroup {
        HyperParameterGroup::new_with_seed(&[3, 4, 2], n, 99).unwrap()
    }

    fn assign(group: &mut HyperParameterGroup, fitnesses: &[f32]) {
        for (net, &f) in group.networks_mut().iter_mut().zip(fitnesses) {
            net.set_fitness(f);
        }
    }

    fn evaluate_all(group: &mut HyperParameterGroup, fitnesses: &[f32]) {
        let mut i = 0;
        while let Some(net) = group.current_network_mut() {
            net.set_fitness(fitnesses[i]);
            group.to_next_network();
            i += 1;
        }
    }

    #[test]
    fn test_split_index() {
        assert_eq!(split_index(4, 0.5), 2);
        assert_eq!(split_index(10, 0.25), 8);
        assert_eq!(split_index(10, 0.05), 10);
        assert_eq!(split_index(3, 0.5), 2);
        assert_eq!(split_index(5, 1.0), 0);
        assert_eq!(split_index(5, -1.0), 5);
        assert_eq!(split_index(5, f32::NAN), 0);
    }

    #[test]
    fn test_empty_population_rejected() {
        assert_eq!(
            HyperParameterGroup::new_with_seed(&[2, 1], 0, 1).unwrap_err(),
            EvolutionError::EmptyPopulation
        );
        assert!(matches!(
            HyperParameterGroup::new_with_seed(&[2], 4, 1),
            Err(EvolutionError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_cursor_state_machine() {
        let mut group = group(3);
        assert_eq!(group.state(), GenerationState::Evaluating { index: 0 });
        assert!(group.current_network().is_some());

        for expected in 1..=3 {
            group.to_next_network();
            assert_eq!(group.current_network_index(), expected);
        }

        assert_eq!(group.state(), GenerationState::Complete);
        assert!(group.are_networks_done_running());
        assert!(group.current_network().is_none());

        group.to_next_network();
        assert_eq!(group.current_network_index(), 3);
    }

    #[test]
    fn test_end_generation_requires_complete_evaluation() {
        let mut group = group(4);
        group.to_next_network();
        let before = group.clone();

        let err = group.end_generation().unwrap_err();

        assert_eq!(err, EvolutionError::GenerationIncomplete { evaluated: 1, total: 4 });
        assert_eq!(group.networks(), before.networks());
        assert_eq!(group.hyperparameters(), before.hyperparameters());
        assert_eq!(group.current_network_index(), 1);
        assert_eq!(group.generation(), 0);
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let mut group = group(5);
        assign(&mut group, &[1.0, 3.0, 2.0, 3.0, f32::NAN]);
        let tie_first = group.networks()[1].clone();
        let tie_second = group.networks()[3].clone();

        group.sort_networks();

        let fitness: Vec<f32> = group.networks().iter().map(Network::fitness).collect();
        assert_eq!(&fitness[..4], &[3.0, 3.0, 2.0, 1.0]);
        assert!(fitness[4].is_nan());
        assert_eq!(group.networks()[0], tie_first);
        assert_eq!(group.networks()[1], tie_second);
        assert_eq!(group.best_network_fitness(), 3.0);
        for pair in group.networks()[..4].windows(2) {
            assert!(pair[0].fitness() >= pair[1].fitness());
        }
    }

    #[test]
    fn test_kill_half_of_four() {
        let mut group = group(4);
        group.set_hyperparameters(HyperParameters {
            kill_ratio: 0.5,
            ..HyperParameters::default()
        });
        assign(&mut group, &[4.0, 3.0, 2.0, 1.0]);
        let before = group.networks().to_vec();

        let kept = group.kill_networks();

        assert_eq!(kept, 2);
        assert_eq!(group.networks()[0], before[0]);
        assert_eq!(group.networks()[1], before[1]);
        assert_eq!(group.networks()[2], before[0]);
        assert_eq!(group.networks()[3], before[1]);
    }

    #[test]
    fn test_kill_cycles_through_top_when_most_are_killed() {
        let mut group = group(5);
        group.set_hyperparameters(HyperParameters {
            kill_ratio: 0.6,
            ..HyperParameters::default()
        });
        assign(&mut group, &[5.0, 4.0, 3.0, 2.0, 1.0]);
        let before = group.networks().to_vec();

        let kept = group.kill_networks();

        assert_eq!(kept, 2);
        let fitness: Vec<f32> = group.networks().iter().map(Network::fitness).collect();
        assert_eq!(fitness, vec![5.0, 4.0, 5.0, 4.0, 5.0]);
        assert_eq!(group.networks()[4], before[0]);
    }

    #[test]
    fn test_mutate_networks_only_touches_suffix() {
        let mut group = group(10);
        group.set_hyperparameters(HyperParameters {
            mutate_ratio: 0.3,
            weight_shift_chance: 1.0,
            ..HyperParameters::default()
        });
        let before = group.networks().to_vec();

        let mutated = group.mutate_networks();

        assert_eq!(mutated, 3);
        assert_eq!(&group.networks()[..7], &before[..7]);
        for (after, before) in group.networks()[7..].iter().zip(&before[7..]) {
            assert_ne!(after, before);
        }
    }

    #[test]
    fn test_end_generation_pipeline() {
        let mut group = group(4);
        group.set_hyperparameters(HyperParameters {
            kill_ratio: 0.5,
            mutate_ratio: 0.5,
            ..HyperParameters::default()
        });
        evaluate_all(&mut group, &[1.0, 4.0, 2.0, 3.0]);
        let best = group.networks()[1].clone();

        let stats = group.end_generation().unwrap();

        assert_eq!(stats.generation, 0);
        assert_eq!(stats.best_fitness, 4.0);
        assert_eq!(stats.worst_fitness, 1.0);
        assert_eq!(stats.kept, 2);
        assert_eq!(stats.hyperparameters.kill_ratio, 0.5);
        assert_eq!(&stats.next_hyperparameters, group.hyperparameters());
        assert_eq!(group.generation(), 1);
        assert_eq!(group.current_network_index(), 0);
        assert_eq!(group.state(), GenerationState::Evaluating { index: 0 });
        // Index 0 sits outside the mutated suffix and keeps its weights
        assert_eq!(group.best_network(), &best);
        assert!(group.hyperparameters().is_within(group.bounds()));
    }

    #[test]
    fn test_run_generation_assigns_fitness_in_order() {
        let mut group = group(6);
        let mut calls = 0;

        let stats = group
            .run_generation(|_| {
                calls += 1;
                calls as f32
            })
            .unwrap();

        assert_eq!(calls, 6);
        assert_eq!(stats.best_fitness, 6.0);
        assert_eq!(stats.worst_fitness, 1.0);
        assert_eq!(group.best_network_fitness(), 6.0);
    }

    #[test]
    fn test_same_seed_same_evolution() {
        let fitness = |net: &mut Network| net.evaluate(&[0.5, -0.5, 1.0])[0];

        let mut a = group(8);
        let mut b = group(8);
        for _ in 0..5 {
            a.run_generation(fitness).unwrap();
            b.run_generation(fitness).unwrap();
        }

        assert_eq!(a.networks(), b.networks());
        assert_eq!(a.hyperparameters(), b.hyperparameters());
        assert_eq!(a.seed(), 99);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = group(4);
        let copy = original.clone();

        original.run_generation(|_| 1.0).unwrap();
        original.run_generation(|_| 1.0).unwrap();

        assert_eq!(copy.generation(), 0);
        assert_ne!(copy.networks(), original.networks());
    }

    #[test]
    fn test_from_config_rejects_invalid_bounds() {
        let mut config = Config::default();
        config.bounds.weight_shift_range_bottom.min = 0.5;
        config.bounds.weight_shift_range_bottom.max = 1.0;
        config.bounds.mutate_ratio.min = 1.0;
        config.bounds.mutate_ratio.max = 1.0;

        let result = HyperParameterGroup::from_config(&config, Some(1));

        assert!(matches!(result, Err(EvolutionError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_config_rejects_empty_population() {
        let mut config = Config::default();
        config.population.networks_per_group = 0;

        let result = HyperParameterGroup::from_config(&config, Some(1));

        assert!(matches!(result, Err(EvolutionError::InvalidConfig(_))));
    }

    #[test]
    fn test_set_hyperparameters_clamps() {
        let mut group = group(2);
        group.set_hyperparameters(HyperParameters {
            kill_ratio: 5.0,
            weight_shift_chance: -1.0,
            ..HyperParameters::default()
        });

        assert_eq!(group.hyperparameters().kill_ratio, group.bounds().kill_ratio.max);
        assert_eq!(group.hyperparameters().weight_shift_chance, 0.0);
    }
}
