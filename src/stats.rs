//! Per-generation statistics.

use crate::evolution::HyperParameters;
use crate::neural::Network;

/// Summary of one finished generation
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    /// Generation number (0 for the first)
    pub generation: u64,
    /// Fitness of the top-ranked network
    pub best_fitness: f32,
    /// Mean fitness across the population
    pub mean_fitness: f32,
    /// Fitness of the bottom-ranked network
    pub worst_fitness: f32,
    /// Networks preserved by truncation
    pub kept: usize,
    /// Networks whose weights were mutated
    pub mutated: usize,
    /// Hyperparameters in effect while this generation was ranked
    pub hyperparameters: HyperParameters,
    /// Hyperparameters after self-mutation, used for the next generation
    pub next_hyperparameters: HyperParameters,
}

impl GenerationStats {
    /// Build stats from a population already sorted best-first
    pub fn from_ranked(generation: u64, ranked: &[Network], hyperparameters: HyperParameters) -> Self {
        let best_fitness = ranked.first().map(Network::fitness).unwrap_or(0.0);
        let worst_fitness = ranked.last().map(Network::fitness).unwrap_or(0.0);
        let mean_fitness = if ranked.is_empty() {
            0.0
        } else {
            ranked.iter().map(Network::fitness).sum::<f32>() / ranked.len() as f32
        };

        Self {
            generation,
            best_fitness,
            mean_fitness,
            worst_fitness,
            kept: 0,
            mutated: 0,
            hyperparameters,
            next_hyperparameters: hyperparameters,
        }
    }
}

impl std::fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gen {:>5} | best {:>10.5} | mean {:>10.5} | worst {:>10.5} | kill {:.3} mutate {:.3} | shift [{:.3}, {:.3}] p={:.3} | new [{:.3}, {:.3}] p={:.3}",
            self.generation,
            self.best_fitness,
            self.mean_fitness,
            self.worst_fitness,
            self.hyperparameters.kill_ratio,
            self.hyperparameters.mutate_ratio,
            self.hyperparameters.weight_shift_range_bottom,
            self.hyperparameters.weight_shift_range_top,
            self.hyperparameters.weight_shift_chance,
            self.hyperparameters.new_weight_range_bottom,
            self.hyperparameters.new_weight_range_top,
            self.hyperparameters.weight_new_chance,
        )
    }
}

/// History of generation summaries
#[derive(Clone, Debug, Default)]
pub struct StatsHistory {
    pub entries: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.entries.push(stats);
    }

    pub fn latest(&self) -> Option<&GenerationStats> {
        self.entries.last()
    }

    /// Best fitness per generation, oldest first
    pub fn best_fitness_curve(&self) -> Vec<f32> {
        self.entries.iter().map(|s| s.best_fitness).collect()
    }

    /// Highest best fitness seen so far
    pub fn best_ever(&self) -> Option<f32> {
        self.entries
            .iter()
            .map(|s| s.best_fitness)
            .fold(None, |acc, f| Some(acc.map_or(f, |a: f32| a.max(f))))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::Activation;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ranked(fitnesses: &[f32]) -> Vec<Network> {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        fitnesses
            .iter()
            .map(|&f| {
                let mut net = Network::new(&[1, 1], Activation::Identity, &mut rng).unwrap();
                net.set_fitness(f);
                net
            })
            .collect()
    }

    #[test]
    fn test_stats_from_ranked() {
        let stats = GenerationStats::from_ranked(3, &ranked(&[4.0, 2.0, 0.0]), HyperParameters::default());
        assert_eq!(stats.generation, 3);
        assert_eq!(stats.best_fitness, 4.0);
        assert_eq!(stats.worst_fitness, 0.0);
        assert_relative_eq!(stats.mean_fitness, 2.0);
        assert_eq!(stats.next_hyperparameters, stats.hyperparameters);
    }

    #[test]
    fn test_history() {
        let mut history = StatsHistory::new();
        assert!(history.best_ever().is_none());

        for (generation, best) in [(0, 1.0), (1, 3.0), (2, 2.0)] {
            let mut stats = GenerationStats::from_ranked(generation, &ranked(&[best]), HyperParameters::default());
            stats.kept = 1;
            history.record(stats);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.best_fitness_curve(), vec![1.0, 3.0, 2.0]);
        assert_eq!(history.best_ever(), Some(3.0));
        assert_eq!(history.latest().map(|s| s.generation), Some(2));
    }
}
