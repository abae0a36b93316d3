//! Errors raised at the population and network boundaries.

/// Errors that can occur while building or driving a population
#[derive(Debug, Clone, PartialEq)]
pub enum EvolutionError {
    /// Layer size list cannot form a network
    InvalidTopology(String),
    /// Configuration rejected by validation
    InvalidConfig(String),
    /// A population needs at least one network
    EmptyPopulation,
    /// `end_generation` called before every network was evaluated
    GenerationIncomplete { evaluated: usize, total: usize },
}

impl std::fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTopology(msg) => write!(f, "Invalid topology: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Self::EmptyPopulation => write!(f, "Population must contain at least one network"),
            Self::GenerationIncomplete { evaluated, total } => write!(
                f,
                "Generation incomplete: {} of {} networks evaluated",
                evaluated, total
            ),
        }
    }
}

impl std::error::Error for EvolutionError {}
