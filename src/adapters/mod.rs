//! Adapters - Implementations of port interfaces.
//!
//! - `profile_source` - In-memory and filesystem user profile sources
//! - `itinerary` - Deterministic template itinerary generator
//! - `itinerary_validation` - Rule-based validation engine with a timeout

pub mod itinerary;
pub mod itinerary_validation;
pub mod profile_source;
