//! Error types for plan optimization.

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum OptimizationError {
    #[error("Invalid budget: {0}")]
    InvalidBudget(#[from] ValidationError),

    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("Itinerary has no days")]
    EmptyItinerary,
}
