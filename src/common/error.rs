//! Error types for rrt_environment

use thiserror::Error;

/// Main error type for the planning environment
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Sampling distribution name not recognised
    #[error("Unknown distribution: {0}")]
    UnknownDistribution(String),
    /// Every retry stage failed to produce a trajectory
    #[error("Integration failed after {attempts} attempts: {message}")]
    IntegrationFailed { message: String, attempts: usize },
    /// Control-window rejection sampling hit its attempt cap
    #[error("Sampling exhausted after {attempts} attempts")]
    SamplingExhausted { attempts: usize },
    /// Malformed half-space system
    #[error("Invalid obstacle: {0}")]
    InvalidObstacle(String),
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The retry loop was cancelled or ran past its deadline
    #[error("Cancelled")]
    Cancelled,
    /// Plotting backend failed
    #[error("Visualization error: {0}")]
    VisualizationError(String),
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
