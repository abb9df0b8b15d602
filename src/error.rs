// src/error.rs
use thiserror::Error;

/// Errors raised by the projection core.
///
/// A reserve path dipping into the danger zone is not an error; it is
/// reported as a flag on the affected `ReservePathPoint`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Canonical name is not in the fixed series table.
    #[error("unknown series: {0}")]
    UnknownSeries(String),

    /// Scenario parameters rejected at definition time.
    #[error("invalid scenario '{name}': {reason}")]
    InvalidScenario { name: String, reason: String },

    /// Projection inputs outside the domain of the model.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ProjectionError {
    pub fn invalid_scenario(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidScenario {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
