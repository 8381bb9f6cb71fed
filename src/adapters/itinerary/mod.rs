//! Itinerary generator adapters.

mod template;

pub use template::{TemplateCosts, TemplateItineraryGenerator};
