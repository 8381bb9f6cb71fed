//! Plan Optimization - a single bounded pass that lifts predicted adherence.
//!
//! Steps run in fixed order (budget increase, category reallocation,
//! itinerary adjustments), each skipped when its trigger is false, followed
//! by one authoritative re-score. There is no retry loop: an unreachable
//! target is reported through `OptimizedPlan::success`.

mod errors;
mod optimizer;
mod tactical;
mod values;

pub use errors::OptimizationError;
pub use optimizer::{OptimizerSettings, PlanOptimizer};
pub use tactical::suggest_tactics;
pub use values::{
    Ease, Guarantee, OptimizationConstraints, Optimization, OptimizationKind, OptimizedPlan,
    TacticalSuggestion,
};
