//! Contract lifecycle status and the internal consistency check.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::values::TravelContract;

/// Lowest guarantee level a valid contract may carry.
pub const MIN_GUARANTEE_LEVEL: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Provider signed, customer signature outstanding.
    PendingSignature,
    Active,
    Expired,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractStatus::PendingSignature => "pending_signature",
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
        };
        f.write_str(label)
    }
}

pub fn status(contract: &TravelContract) -> ContractStatus {
    status_at(contract, Timestamp::now())
}

/// Expiry wins over signature state.
pub fn status_at(contract: &TravelContract, now: Timestamp) -> ContractStatus {
    if now.is_after(&contract.valid_until) {
        ContractStatus::Expired
    } else if contract.is_customer_signed() {
        ContractStatus::Active
    } else {
        ContractStatus::PendingSignature
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Checks the contract's internal consistency. Pure; does not look at the clock.
pub fn validate_contract(contract: &TravelContract) -> ContractValidation {
    let mut errors = Vec::new();

    if contract.guarantee.level < MIN_GUARANTEE_LEVEL {
        errors.push(format!(
            "Guarantee level {:.1}% is below the {:.0}% minimum",
            contract.guarantee.level * 100.0,
            MIN_GUARANTEE_LEVEL * 100.0
        ));
    }
    if !contract.valid_until.is_after(&contract.generated_at) {
        errors.push("Contract validity ends before it starts".to_string());
    }
    let performance = &contract.performance;
    if performance.current_adherence < performance.adherence_target {
        errors.push(format!(
            "Current adherence {:.1}% is below the {:.1}% target",
            performance.current_adherence * 100.0,
            performance.adherence_target * 100.0
        ));
    }
    if contract.plan.itinerary.is_empty() {
        errors.push("Contract has no itinerary".to_string());
    }
    if contract.plan.budget.total_budget <= 0.0 {
        errors.push("Contract has no budget".to_string());
    }

    ContractValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
