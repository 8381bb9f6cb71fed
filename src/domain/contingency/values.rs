//! Contingency planning output types.

use serde::{Deserialize, Serialize};

use crate::domain::risk::RiskLevel;

/// How quickly a plan must be executed once triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTime {
    Immediate,
    Hours,
    Days,
}

impl ResponseTime {
    pub fn minutes(&self) -> u32 {
        match self {
            ResponseTime::Immediate => 30,
            ResponseTime::Hours => 120,
            ResponseTime::Days => 1440,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyAction {
    pub action_type: String,
    pub description: String,
    pub cost: f64,
    pub time_to_execute_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequiredResources {
    pub contacts: Vec<String>,
    pub documents: Vec<String>,
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationPlan {
    pub notify: Vec<String>,
    pub message: String,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyPlan {
    pub id: String,
    pub trigger_condition: String,
    pub likelihood: f64,
    pub impact: f64,
    pub response_time: ResponseTime,
    pub primary_action: ContingencyAction,
    /// Ranked, first is tried first.
    pub backup_actions: Vec<ContingencyAction>,
    pub resources: RequiredResources,
    pub communication: CommunicationPlan,
    pub recovery_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyProtocol {
    pub scenario: String,
    pub immediate_actions: Vec<String>,
    pub emergency_contacts: Vec<String>,
    pub recovery: String,
}

/// Fractions of the total budget reserved per resource, keyed by risk level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceShares {
    pub emergency_fund: f64,
    pub backup_transport: f64,
    pub alternative_accommodation: f64,
    pub communication: f64,
}

impl ResourceShares {
    pub fn for_level(level: RiskLevel) -> Self {
        let (emergency_fund, backup_transport, alternative_accommodation, communication) = match level {
            RiskLevel::Low => (0.05, 0.03, 0.03, 0.02),
            RiskLevel::Medium => (0.08, 0.05, 0.05, 0.03),
            RiskLevel::High => (0.10, 0.06, 0.06, 0.04),
            RiskLevel::Critical => (0.12, 0.08, 0.08, 0.05),
        };
        Self {
            emergency_fund,
            backup_transport,
            alternative_accommodation,
            communication,
        }
    }
}

/// Reserve amounts in budget currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub shares: ResourceShares,
    pub emergency_fund: f64,
    pub backup_transport: f64,
    pub alternative_accommodation: f64,
    pub communication: f64,
}

impl ResourceAllocation {
    pub fn from_shares(shares: ResourceShares, total_budget: f64) -> Self {
        Self {
            shares,
            emergency_fund: total_budget * shares.emergency_fund,
            backup_transport: total_budget * shares.backup_transport,
            alternative_accommodation: total_budget * shares.alternative_accommodation,
            communication: total_budget * shares.communication,
        }
    }

    pub fn total(&self) -> f64 {
        self.emergency_fund + self.backup_transport + self.alternative_accommodation + self.communication
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringTrigger {
    pub condition: String,
    pub threshold: f64,
    pub action: String,
    pub notification: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessMetrics {
    /// `min(1, plans / 10)`.
    pub coverage: f64,
    pub average_response_minutes: f64,
    /// Reserved resources per covered scenario.
    pub cost_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyPlanningResult {
    pub primary: Vec<ContingencyPlan>,
    pub secondary: Vec<ContingencyPlan>,
    pub emergency_protocols: Vec<EmergencyProtocol>,
    pub resources: ResourceAllocation,
    pub monitoring_triggers: Vec<MonitoringTrigger>,
    pub metrics: SuccessMetrics,
}

impl ContingencyPlanningResult {
    pub fn plan_count(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn plan(&self, id: &str) -> Option<&ContingencyPlan> {
        self.primary.iter().chain(self.secondary.iter()).find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_shares_match_table() {
        let shares = ResourceShares::for_level(RiskLevel::Critical);
        assert_eq!(shares.emergency_fund, 0.12);
        assert_eq!(shares.communication, 0.05);
    }

    #[test]
    fn allocation_scales_with_budget() {
        let allocation = ResourceAllocation::from_shares(ResourceShares::for_level(RiskLevel::Low), 1_000_000.0);
        assert!((allocation.emergency_fund - 50_000.0).abs() < 1e-6);
        assert!((allocation.total() - 130_000.0).abs() < 1e-6);
    }

    #[test]
    fn response_minutes() {
        assert_eq!(ResponseTime::Immediate.minutes(), 30);
        assert_eq!(ResponseTime::Hours.minutes(), 120);
        assert_eq!(ResponseTime::Days.minutes(), 1440);
    }
}
