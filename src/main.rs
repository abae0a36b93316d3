//! neuroevolve - CLI Entry Point
//!
//! Evolves a population on XOR to exercise the engine end to end.

use clap::{Parser, Subcommand};
use neuroevolve::stats::StatsHistory;
use neuroevolve::{Config, HyperParameterGroup, Network};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "neuroevolve")]
#[command(version)]
#[command(about = "Self-adaptive neuro-evolution of feed-forward network weights")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population on XOR
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to evolve
        #[arg(short, long, default_value = "500")]
        generations: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

/// XOR truth table; the third input is a constant bias
const XOR_CASES: [([f32; 3], f32); 4] = [
    ([0.0, 0.0, 1.0], 0.0),
    ([0.0, 1.0, 1.0], 1.0),
    ([1.0, 0.0, 1.0], 1.0),
    ([1.0, 1.0, 1.0], 0.0),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            seed,
            quiet,
        } => run_evolution(config, generations, seed, quiet),

        Commands::Init { output } => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
            generate_config(output)
        }
    }
}

fn run_evolution(
    config_path: PathBuf,
    generations: u64,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let (config, loaded) = if config_path.exists() {
        (Config::from_file(&config_path)?, true)
    } else {
        (Config::default(), false)
    };

    // Initialize logging
    let filter = if quiet { "warn" } else { config.logging.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if loaded {
        log::info!("Loaded config from: {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }

    let n_inputs = config.population.layer_sizes[0];
    let n_outputs = config.population.layer_sizes[config.population.layer_sizes.len() - 1];
    if n_inputs != 3 || n_outputs != 1 {
        return Err(format!(
            "XOR needs 3 inputs (two bits plus bias) and 1 output, got {} and {}",
            n_inputs, n_outputs
        )
        .into());
    }

    let mut group = HyperParameterGroup::from_config(&config, seed)?;
    log::info!(
        "Evolving {} networks {:?} for {} generations (seed {})",
        group.networks_per_group(),
        config.population.layer_sizes,
        generations,
        group.seed()
    );

    let mut history = StatsHistory::new();
    let start = Instant::now();

    for _ in 0..generations {
        let stats = group.run_generation(xor_fitness)?;
        history.record(stats);
    }

    let elapsed = start.elapsed();

    // The last end_generation ranked the final population at index 0
    let mut best = group.best_network().clone();
    let best_fitness = xor_fitness(&mut best);

    println!("=== Evolution Results ===");
    println!("Generations: {}", group.generation());
    println!("Time: {:.3}s", elapsed.as_secs_f64());
    println!("Best fitness: {:.6}", best_fitness);
    if let Some(best_ever) = history.best_ever() {
        println!("Best fitness seen: {:.6}", best_ever);
    }
    println!("Final hyperparameters: {:?}", group.hyperparameters());
    for (inputs, target) in XOR_CASES {
        let output = best.evaluate(&inputs)[0];
        println!("  {} xor {} -> {:.4} (target {})", inputs[0], inputs[1], output, target);
    }

    Ok(())
}

/// Negative mean squared error over the XOR table
fn xor_fitness(network: &mut Network) -> f32 {
    let error: f32 = XOR_CASES
        .iter()
        .map(|(inputs, target)| {
            let diff = network.evaluate(inputs)[0] - target;
            diff * diff
        })
        .sum();
    -error / XOR_CASES.len() as f32
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    log::info!("Configuration saved to: {:?}", output);
    Ok(())
}
