/*
 * Error Module
 *
 * Error types for the flocking core. The per-frame algorithm has no
 * recoverable failures: everything here is a caller contract violation
 * reported instead of panicking or producing NaN.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by flock construction and the per-tick update.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error("agent declares a population of {declared} but the flock holds {actual}")]
    PopulationMismatch { declared: usize, actual: usize },

    #[error("agent index {index} is out of range for a flock of {len}")]
    AgentOutOfRange { index: usize, len: usize },

    #[error("neighbour cap {cap} exceeds the population size {population}")]
    NeighborCapExceedsPopulation { cap: usize, population: usize },

    #[error("target force strength must be finite and non-zero, got {0}")]
    InvalidForceStrength(f32),

    #[error("a flock group needs at least one agent per group")]
    EmptyGroup,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
