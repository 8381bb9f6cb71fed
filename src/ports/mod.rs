//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and its collaborators. Adapters implement these ports.
//!
//! - `UserProfileSource` - behavioral profile lookup by user id
//! - `ItineraryGenerator` - base itinerary from trip preferences
//! - `ValidationEngine` - rule checks with a hard timeout

mod itinerary_generator;
mod user_profile_source;
mod validation_engine;

pub use itinerary_generator::{ItineraryGenerationError, ItineraryGenerator};
pub use user_profile_source::{ProfileSourceError, UserProfileSource};
pub use validation_engine::{ValidationEngine, ValidationIssue, ValidationReport};
