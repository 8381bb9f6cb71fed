//! Prediction output types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BudgetCategory, Probability};

/// The four weighted sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub user_behavior: f64,
    pub plan_complexity: f64,
    pub market_conditions: f64,
    pub historical_performance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    Low,
    Medium,
    High,
}

/// An adherence-specific risk found by the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceRisk {
    pub factor: String,
    pub impact: ImpactTier,
    pub probability: Probability,
    pub mitigation: Option<String>,
    /// Budget category the risk presses on, if any.
    pub category: Option<BudgetCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    IncreaseBudget,
    ReduceCategory,
    TrackExpenses,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub description: String,
    pub amount: Option<f64>,
    pub category: Option<BudgetCategory>,
    pub expected_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherencePrediction {
    /// In `[0, 0.99]`.
    pub success_probability: Probability,
    /// In `[0.5, 0.95]`.
    pub confidence: Probability,
    pub breakdown: ScoreBreakdown,
    pub risk_factors: Vec<AdherenceRisk>,
    pub recommendations: Vec<Recommendation>,
}

impl AdherencePrediction {
    /// Categories named by high-impact risks, in first-seen order, without repeats.
    pub fn high_risk_categories(&self) -> Vec<BudgetCategory> {
        let mut categories = Vec::new();
        for risk in self.risk_factors.iter().filter(|r| r.impact == ImpactTier::High) {
            if let Some(category) = risk.category {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }
        categories
    }

    pub fn high_impact_count(&self) -> usize {
        self.risk_factors
            .iter()
            .filter(|r| r.impact == ImpactTier::High)
            .count()
    }
}
