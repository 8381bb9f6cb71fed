//! Contract sections.

use serde::{Deserialize, Serialize};

use crate::domain::contingency::{ContingencyPlan, EmergencyProtocol, ResourceAllocation};
use crate::domain::foundation::{ContractId, Timestamp, UserId};
use crate::domain::optimization::TacticalSuggestion;
use crate::domain::risk::{CriticalFailurePoint, MonitoringStage, RiskFactor, RiskLevel};
use crate::domain::trip::{BudgetBreakdown, ItinerarySummary};

/// Commercial terms a contract is generated under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub validity_days: u32,
    /// Adherence the provider commits to, e.g. 0.95.
    pub guarantee_level: f64,
    /// Flat fee in budget currency.
    pub service_fee: f64,
    /// Fraction of the total budget charged for the guarantee.
    pub guarantee_premium_rate: f64,
    pub refund_policy: String,
}

impl Default for ContractTerms {
    fn default() -> Self {
        Self {
            validity_days: 30,
            guarantee_level: 0.95,
            service_fee: 0.0,
            guarantee_premium_rate: 0.02,
            refund_policy: "Full refund of the guarantee premium if adherence falls below the guaranteed level while all conditions were met".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTerms {
    pub name: String,
    pub obligations: Vec<String>,
    pub service_fee: f64,
    pub guarantee_premium: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerParty {
    pub user_id: UserId,
    pub obligations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parties {
    pub provider: ProviderTerms,
    pub customer: CustomerParty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeSection {
    pub level: f64,
    pub coverage: String,
    pub conditions: Vec<String>,
    pub exclusions: Vec<String>,
    pub claim_process: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    pub itinerary: ItinerarySummary,
    pub budget: BudgetBreakdown,
    pub buffer_amount: f64,
    pub adherence: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskManagementSection {
    pub risk_level: RiskLevel,
    pub overall_risk_score: f64,
    /// Top five by risk score.
    pub top_risks: Vec<RiskFactor>,
    pub critical_failure_points: Vec<CriticalFailurePoint>,
    pub monitoring_schedule: Vec<MonitoringStage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencySection {
    pub primary: Vec<ContingencyPlan>,
    pub emergency_protocols: Vec<EmergencyProtocol>,
    pub reserves: ResourceAllocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalTerms {
    pub refund_policy: String,
    pub liability_cap: f64,
    pub governing_law: String,
    pub dispute_resolution: String,
    pub amendments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub initial_adherence: f64,
    pub current_adherence: f64,
    pub adherence_target: f64,
    pub optimizations_applied: usize,
    pub projected_savings: f64,
    pub overall_risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub signer: String,
    pub value: String,
    pub signed_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signatures {
    pub provider: Signature,
    pub customer: Option<Signature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelContract {
    pub contract_id: ContractId,
    pub generated_at: Timestamp,
    pub valid_until: Timestamp,
    pub parties: Parties,
    pub guarantee: GuaranteeSection,
    pub plan: PlanSection,
    pub risk_management: RiskManagementSection,
    pub tactical_suggestions: Vec<TacticalSuggestion>,
    pub contingencies: ContingencySection,
    pub legal: LegalTerms,
    pub performance: PerformanceSnapshot,
    pub signatures: Signatures,
}

impl TravelContract {
    pub fn is_customer_signed(&self) -> bool {
        self.signatures.customer.is_some()
    }
}
