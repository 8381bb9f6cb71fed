//! Risk Assessment - a categorized operational risk sweep.
//!
//! Broader than the adherence risks found during prediction: this sweep feeds
//! contingency planning and the contract's risk disclosures.

mod assessor;
mod values;

pub use assessor::RiskAssessor;
pub use values::{
    ActionPriority, CriticalFailurePoint, MitigationMode, MitigationStrategy, MonitoringPhase,
    MonitoringStage, RecommendedAction, RiskAssessment, RiskCategory, RiskDistribution,
    RiskFactor, RiskLevel,
};
