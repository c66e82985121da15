use thiserror::Error;

/// Rejected pipeline configuration, reported before any audio is decoded.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Time step must be a positive number of seconds no shorter than one sample, got {0}")]
    InvalidTimeStep(f64),

    #[error("Sample rate must be greater than zero")]
    ZeroSampleRate,

    #[error("{name} must be a finite, non-negative number, got {value}")]
    InvalidFactor { name: &'static str, value: f32 },

    #[error("Split name is empty (use 'none', 'all' or a stem name)")]
    EmptySplit,
}
