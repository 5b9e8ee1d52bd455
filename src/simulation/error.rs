//! Errors raised while creating a simulation

use thiserror::Error;

/// Everything that can go wrong when setting up a simulation.
///
/// Stepping a state produced by this crate never fails, so every variant
/// originates from `create` or from config validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("density must be between 0 and 1 (got {0})")]
    InvalidDensity(f64),

    #[error("unknown topology '{0}' (expected single-lane, two-way or intersection)")]
    UnknownTopology(String),

    #[error("{name} must be between 0 and 1 (got {value})")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("{name} must be at least one step")]
    InvalidDuration { name: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;
