//! Risk taxonomy and assessment output.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Budget,
    Schedule,
    HealthSafety,
    External,
    UserBehavior,
}

impl RiskCategory {
    pub fn all() -> &'static [RiskCategory; 5] {
        &[
            RiskCategory::Budget,
            RiskCategory::Schedule,
            RiskCategory::HealthSafety,
            RiskCategory::External,
            RiskCategory::UserBehavior,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Budget => "budget",
            RiskCategory::Schedule => "schedule",
            RiskCategory::HealthSafety => "health_safety",
            RiskCategory::External => "external",
            RiskCategory::UserBehavior => "user_behavior",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall level derived from the mean risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Thresholds at 0.3, 0.6 and 0.8.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationMode {
    Automatic,
    Manual,
    Preventive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationStrategy {
    pub strategy: String,
    /// Expected reduction of the risk, in `[0, 1]`.
    pub effectiveness: f64,
    pub cost: f64,
    pub mode: MitigationMode,
}

impl MitigationStrategy {
    pub fn new(strategy: impl Into<String>, effectiveness: f64, cost: f64, mode: MitigationMode) -> Self {
        Self {
            strategy: strategy.into(),
            effectiveness,
            cost,
            mode,
        }
    }
}

/// One categorized risk. `risk_score` is always `likelihood * impact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub id: String,
    pub category: RiskCategory,
    /// Machine-readable kind such as `schedule_overload`.
    pub kind: String,
    pub description: String,
    pub likelihood: f64,
    pub impact: f64,
    pub risk_score: f64,
    pub triggers: Vec<String>,
    /// Ranked, most effective first.
    pub mitigations: Vec<MitigationStrategy>,
    pub monitoring_points: Vec<String>,
    pub contingency_stubs: Vec<String>,
}

impl RiskFactor {
    pub fn new(
        id: impl Into<String>,
        category: RiskCategory,
        kind: impl Into<String>,
        description: impl Into<String>,
        likelihood: f64,
        impact: f64,
    ) -> Self {
        let likelihood = likelihood.clamp(0.0, 1.0);
        let impact = impact.clamp(0.0, 1.0);
        Self {
            id: id.into(),
            category,
            kind: kind.into(),
            description: description.into(),
            likelihood,
            impact,
            risk_score: likelihood * impact,
            triggers: Vec::new(),
            mitigations: Vec::new(),
            monitoring_points: Vec::new(),
            contingency_stubs: Vec::new(),
        }
    }

    pub fn with_triggers(mut self, triggers: &[&str]) -> Self {
        self.triggers = triggers.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Sets the mitigations, ranking them by effectiveness.
    pub fn with_mitigations(mut self, mut mitigations: Vec<MitigationStrategy>) -> Self {
        mitigations.sort_by(|a, b| b.effectiveness.total_cmp(&a.effectiveness));
        self.mitigations = mitigations;
        self
    }

    pub fn with_monitoring(mut self, points: &[&str]) -> Self {
        self.monitoring_points = points.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_contingencies(mut self, stubs: &[&str]) -> Self {
        self.contingency_stubs = stubs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn best_mitigation(&self) -> Option<&MitigationStrategy> {
        self.mitigations.first()
    }
}

/// Share of the summed risk score per category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub budget: f64,
    pub schedule: f64,
    pub health_safety: f64,
    pub external: f64,
    pub user_behavior: f64,
}

impl RiskDistribution {
    /// Normalizes summed scores per category. All zero when nothing scored.
    pub fn from_factors(factors: &[RiskFactor]) -> Self {
        let mut distribution = Self::default();
        for factor in factors {
            *distribution.slot(factor.category) += factor.risk_score;
        }
        let total = distribution.total();
        if total > 0.0 {
            for category in RiskCategory::all() {
                *distribution.slot(*category) /= total;
            }
        }
        distribution
    }

    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Budget => self.budget,
            RiskCategory::Schedule => self.schedule,
            RiskCategory::HealthSafety => self.health_safety,
            RiskCategory::External => self.external,
            RiskCategory::UserBehavior => self.user_behavior,
        }
    }

    pub fn total(&self) -> f64 {
        self.budget + self.schedule + self.health_safety + self.external + self.user_behavior
    }

    fn slot(&mut self, category: RiskCategory) -> &mut f64 {
        match category {
            RiskCategory::Budget => &mut self.budget,
            RiskCategory::Schedule => &mut self.schedule,
            RiskCategory::HealthSafety => &mut self.health_safety,
            RiskCategory::External => &mut self.external,
            RiskCategory::UserBehavior => &mut self.user_behavior,
        }
    }
}

/// A factor ranked by expected monetary loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalFailurePoint {
    pub risk_id: String,
    pub description: String,
    pub likelihood: f64,
    /// `impact * total_budget`.
    pub potential_loss: f64,
    /// `likelihood * potential_loss`.
    pub expected_loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringPhase {
    PreTrip,
    DailyDuringTrip,
    EmergencyTriggers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStage {
    pub phase: MonitoringPhase,
    pub timing: String,
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Low,
    Medium,
    High,
}

impl ActionPriority {
    /// High at 0.6 and above, medium at 0.3 and above.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.6 {
            ActionPriority::High
        } else if score >= 0.3 {
            ActionPriority::Medium
        } else {
            ActionPriority::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action: String,
    pub priority: ActionPriority,
    /// The factor this action addresses, if any.
    pub risk_id: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub distribution: RiskDistribution,
    pub critical_failure_points: Vec<CriticalFailurePoint>,
    pub monitoring_schedule: Vec<MonitoringStage>,
    pub recommended_actions: Vec<RecommendedAction>,
}

impl RiskAssessment {
    pub fn factor(&self, kind: &str) -> Option<&RiskFactor> {
        self.factors.iter().find(|f| f.kind == kind)
    }

    pub fn has_category(&self, category: RiskCategory) -> bool {
        self.factors.iter().any(|f| f.category == category)
    }

    /// Factors ordered by risk score, highest first.
    pub fn ranked(&self) -> Vec<&RiskFactor> {
        let mut ranked: Vec<&RiskFactor> = self.factors.iter().collect();
        ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
    }

    #[test]
    fn factor_score_is_product() {
        let factor = RiskFactor::new("r", RiskCategory::Budget, "k", "d", 0.5, 0.4);
        assert!((factor.risk_score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn mitigations_are_ranked() {
        let factor = RiskFactor::new("r", RiskCategory::Budget, "k", "d", 0.5, 0.4).with_mitigations(vec![
            MitigationStrategy::new("weak", 0.2, 0.0, MitigationMode::Manual),
            MitigationStrategy::new("strong", 0.9, 0.0, MitigationMode::Automatic),
        ]);
        assert_eq!(factor.best_mitigation().unwrap().strategy, "strong");
    }

    #[test]
    fn distribution_normalizes() {
        let factors = vec![
            RiskFactor::new("a", RiskCategory::Budget, "k", "d", 0.5, 0.5),
            RiskFactor::new("b", RiskCategory::External, "k", "d", 0.5, 0.5),
            RiskFactor::new("c", RiskCategory::External, "k", "d", 1.0, 0.5),
        ];
        let distribution = RiskDistribution::from_factors(&factors);
        assert!((distribution.total() - 1.0).abs() < 1e-9);
        assert!((distribution.get(RiskCategory::External) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_distribution_is_zero() {
        assert_eq!(RiskDistribution::from_factors(&[]).total(), 0.0);
    }
}
