//! Error types for loadgen-core

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the load generator to its caller
///
/// Per-request failures never appear here; they are absorbed by the
/// executor and reported through the logger and metrics collaborators.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The configuration failed validation, no lanes were started
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The run was cancelled by the caller before its deadline
    #[error("load test cancelled")]
    Cancelled,

    /// A builder was missing a required field
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// `run` was invoked on a generator that already ran
    #[error("load generator has already been started")]
    AlreadyStarted,

    /// A lane could not be built from its settings
    #[error("worker error: {0}")]
    Worker(String),

    /// The lane plan does not fit in memory
    #[error("cannot start {lanes_per_target} lanes for each of {targets} targets")]
    TooManyLanes {
        /// Number of resolved targets
        targets: usize,
        /// Lanes requested per target
        lanes_per_target: usize,
    },
}

impl LoadError {
    /// Shorthand for a missing builder field
    pub fn missing_config(field: &'static str) -> Self {
        Self::MissingConfig(field)
    }

    /// Whether this error is the expected end of a caller-cancelled run
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LoadError>;
