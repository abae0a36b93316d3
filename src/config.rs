//! Configuration system for populations and their evolution.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::evolution::{HyperParameterBounds, HyperParameters};
use crate::neural::Activation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationConfig,
    #[serde(default)]
    pub hyperparameters: HyperParameterConfig,
    #[serde(default)]
    pub bounds: HyperParameterBounds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Population shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Node count per layer, input layer first
    pub layer_sizes: Vec<usize>,
    /// Number of networks in the population
    pub networks_per_group: usize,
    /// Non-linearity applied after each pump
    #[serde(default)]
    pub activation: Activation,
}

/// Starting hyperparameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperParameterConfig {
    /// Values used for the first generation
    #[serde(default)]
    pub initial: HyperParameters,
    /// Draw fresh starting values from each field's new range instead
    #[serde(default)]
    pub randomize_initial: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between info-level summaries (0 disables)
    pub stats_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            hyperparameters: HyperParameterConfig::default(),
            bounds: HyperParameterBounds::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            // Two inputs plus a constant bias input
            layer_sizes: vec![3, 4, 1],
            networks_per_group: 50,
            activation: Activation::Tanh,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 10,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population.networks_per_group == 0 {
            return Err(ConfigError::Invalid("networks_per_group must be > 0".to_string()));
        }
        if self.population.layer_sizes.len() < 2 {
            return Err(ConfigError::Invalid(
                "layer_sizes needs an input and an output layer".to_string(),
            ));
        }
        if self.population.layer_sizes.contains(&0) {
            return Err(ConfigError::Invalid("layer sizes must be > 0".to_string()));
        }
        self.bounds.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "YAML error: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}
