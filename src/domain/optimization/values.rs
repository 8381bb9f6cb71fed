//! Optimization inputs and outputs.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BudgetCategory, Probability};
use crate::domain::prediction::AdherencePrediction;
use crate::domain::trip::{BudgetBreakdown, ChangeFlags, ItinerarySummary};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConstraints {
    /// Fraction of the original total the budget may grow by.
    pub max_budget_increase: f64,
    pub min_adherence_target: f64,
    pub change_flags: ChangeFlags,
}

impl Default for OptimizationConstraints {
    fn default() -> Self {
        Self {
            max_budget_increase: 0.2,
            min_adherence_target: 0.95,
            change_flags: ChangeFlags::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationKind {
    BudgetIncrease,
    CategoryReallocation,
    TransportSubstitution,
    AccommodationDowngrade,
    ActivityTrim,
}

/// One change applied to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    pub kind: OptimizationKind,
    pub description: String,
    pub adherence_impact: f64,
    /// Positive when the change adds spend, negative for savings.
    pub cost_delta: f64,
    pub category: Option<BudgetCategory>,
    pub day_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Easy,
    Moderate,
    Hard,
}

/// Advisory, reversible behavior change. Never applied to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalSuggestion {
    pub id: String,
    pub category: BudgetCategory,
    pub title: String,
    pub description: String,
    pub potential_savings: f64,
    pub ease: Ease,
    pub day_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guarantee {
    pub coverage_percent: f64,
    pub conditions: Vec<String>,
    pub fallback_triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedPlan {
    pub success: bool,
    /// `min(final_prediction.success_probability, target)`.
    pub guaranteed_adherence: Probability,
    /// Running estimate accumulated from the per-step impacts.
    pub projected_adherence: f64,
    pub itinerary: ItinerarySummary,
    pub budget: BudgetBreakdown,
    pub buffer_amount: f64,
    pub optimizations: Vec<Optimization>,
    pub tactical_suggestions: Vec<TacticalSuggestion>,
    pub guarantee: Guarantee,
    pub final_prediction: AdherencePrediction,
}

impl OptimizedPlan {
    pub fn total_savings(&self) -> f64 {
        self.optimizations
            .iter()
            .filter(|o| o.cost_delta < 0.0)
            .map(|o| -o.cost_delta)
            .sum()
    }
}
