//! Contract generation configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::contract::ContractTerms;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Name shown as the signing provider
    pub provider_name: String,

    /// HMAC key for provider signatures
    pub signing_key: SecretString,

    pub validity_days: u32,

    /// Flat fee in budget currency
    pub service_fee: f64,

    /// Fraction of the total budget charged for the guarantee
    pub guarantee_premium_rate: f64,

    pub refund_policy: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        let terms = ContractTerms::default();
        Self {
            provider_name: "BaaP Travel".to_string(),
            signing_key: SecretString::new(String::new()),
            validity_days: terms.validity_days,
            service_fee: terms.service_fee,
            guarantee_premium_rate: terms.guarantee_premium_rate,
            refund_policy: terms.refund_policy,
        }
    }
}

impl ContractConfig {
    /// Terms for a contract guaranteeing `guarantee_level`.
    pub fn terms(&self, guarantee_level: f64) -> ContractTerms {
        ContractTerms {
            validity_days: self.validity_days,
            guarantee_level,
            service_fee: self.service_fee,
            guarantee_premium_rate: self.guarantee_premium_rate,
            refund_policy: self.refund_policy.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("CONTRACT__PROVIDER_NAME"));
        }
        if self.signing_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("CONTRACT__SIGNING_KEY"));
        }
        if self.validity_days == 0 {
            return Err(ValidationError::OutOfRange {
                field: "contract.validity_days",
                min: 1.0,
                max: f64::from(u32::MAX),
                actual: 0.0,
            });
        }
        ValidationError::check_range("contract.service_fee", self.service_fee, 0.0, f64::MAX)?;
        ValidationError::check_range("contract.guarantee_premium_rate", self.guarantee_premium_rate, 0.0, 1.0)?;
        Ok(())
    }
}
