//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the BaaP guarantee domain.

mod budget_category;
mod errors;
mod ids;
mod probability;
mod timestamp;

pub use budget_category::{BudgetCategory, CategoryAmounts};
pub use errors::ValidationError;
pub use ids::{ContractId, UserId};
pub use probability::Probability;
pub use timestamp::Timestamp;
