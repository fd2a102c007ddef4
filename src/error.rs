use std::path::PathBuf;

/// Failures of the two-body solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// The launch state has at least escape energy (a <= 0).
    #[error("launch state is on an open trajectory (a = {semi_major_axis} m)")]
    HyperbolicOrbit { semi_major_axis: f64 },

    /// The launch state gives e >= 1 (e.g. a purely radial launch).
    #[error("launch state gives a degenerate orbit (e = {eccentricity})")]
    DegenerateOrbit { eccentricity: f64 },

    /// NaN or infinity somewhere in the inputs.
    #[error("non-finite value in orbit inputs")]
    NonFiniteInput,

    /// Halley iteration left a residual above tolerance.
    #[error(
        "Kepler's equation did not converge for M = {mean_anomaly}, e = {eccentricity} \
         (residual {residual:e})"
    )]
    NumericNonConvergence {
        mean_anomaly: f64,
        eccentricity: f64,
        residual: f64,
    },
}

/// Rejected user actions. None of these leave the simulation modified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("a satellite named {0:?} already exists")]
    DuplicateName(String),

    #[error("no parent body named {0:?}")]
    UnknownParent(String),

    #[error("no satellite named {0:?}")]
    UnknownSatellite(String),

    #[error("cannot launch: {0}")]
    DegenerateOrbit(#[from] OrbitError),

    #[error("invalid launch parameters: {0}")]
    InvalidLaunch(String),

    #[error("simulation rate must be non-negative, got {0}")]
    NegativeSimRate(f64),

    #[error("physics step must be a positive number of seconds, got {0}")]
    InvalidDeltaTime(f64),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
