//! # neuroevolve
//!
//! Self-adaptive genetic algorithm for evolving the weights of small
//! feed-forward neural networks, no gradients involved.
//!
//! ## Features
//!
//! - **Pumped layers**: each layer forward-propagates into the next through its weight matrix
//! - **Elitist truncation**: the worst networks are replaced by copies of the best
//! - **Self-adaptive**: kill ratio, mutate ratio, weight ranges and chances evolve each generation
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust
//! use neuroevolve::HyperParameterGroup;
//!
//! // 2 inputs, 1 output, 8 networks
//! let mut group = HyperParameterGroup::new_with_seed(&[2, 1], 8, 42).unwrap();
//!
//! for _ in 0..10 {
//!     // Reward networks whose output for (1, 1) is close to 2
//!     group
//!         .run_generation(|net| -(net.evaluate(&[1.0, 1.0])[0] - 2.0).abs())
//!         .unwrap();
//! }
//!
//! println!("Best fitness: {}", group.best_network_fitness());
//! ```
//!
//! ## Driving the cursor by hand
//!
//! ```rust
//! use neuroevolve::HyperParameterGroup;
//!
//! let mut group = HyperParameterGroup::new_with_seed(&[3, 2], 4, 7).unwrap();
//!
//! while !group.are_networks_done_running() {
//!     if let Some(net) = group.current_network_mut() {
//!         let out = net.evaluate(&[0.1, 0.2, 0.3]);
//!         net.set_fitness(out[0] + out[1]);
//!     }
//!     group.to_next_network();
//! }
//! group.end_generation().unwrap();
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use neuroevolve::{Config, HyperParameterGroup};
//!
//! let mut config = Config::default();
//! config.population.networks_per_group = 20;
//! config.hyperparameters.initial.kill_ratio = 0.3;
//!
//! let group = HyperParameterGroup::from_config(&config, Some(1)).unwrap();
//! assert_eq!(group.networks_per_group(), 20);
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod neural;
pub mod random;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use error::EvolutionError;
pub use evolution::{HyperParameterGroup, HyperParameters};
pub use neural::{Layer, Network};
pub use random::ProbabilitySource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
