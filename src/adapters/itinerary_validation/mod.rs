//! Rule-based validation engine adapter.

mod rules;

pub use rules::{RuleValidationEngine, RuleValidationSettings};
