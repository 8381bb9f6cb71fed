//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, categories, errors)
//! - `trip` - Profiles, budgets, itineraries, preferences, live factors
//! - `prediction` - Adherence scoring
//! - `optimization` - Bounded plan optimization and tactical suggestions
//! - `risk` - Categorized risk assessment
//! - `contingency` - Contingency plans, protocols and reserves
//! - `contract` - Travel contract generation, signing and status

pub mod contingency;
pub mod contract;
pub mod foundation;
pub mod optimization;
pub mod prediction;
pub mod risk;
pub mod trip;
