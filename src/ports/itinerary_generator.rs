//! ItineraryGenerator port - produces a base plan from trip preferences.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::trip::{ItinerarySummary, TripPreferences};

#[derive(Debug, Error)]
pub enum ItineraryGenerationError {
    #[error("Itinerary generation rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("Itinerary generator unavailable: {0}")]
    Unavailable(String),
}

/// Called at most once per pipeline run, with no retry.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate_itinerary(&self, preferences: &TripPreferences) -> Result<ItinerarySummary, ItineraryGenerationError>;
}
