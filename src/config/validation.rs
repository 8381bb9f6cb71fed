//! Itinerary validation engine configuration

use serde::Deserialize;

use crate::adapters::itinerary_validation::RuleValidationSettings;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Hard limit for a whole rule run, in milliseconds
    pub timeout_ms: u64,

    pub max_hop_km: f64,

    /// Allowed relative gap between a day's total and its parts
    pub cost_tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let settings = RuleValidationSettings::default();
        Self {
            timeout_ms: settings.timeout_ms,
            max_hop_km: settings.max_hop_km,
            cost_tolerance: settings.cost_tolerance,
        }
    }
}

impl ValidationConfig {
    pub fn settings(&self) -> RuleValidationSettings {
        RuleValidationSettings {
            timeout_ms: self.timeout_ms,
            max_hop_km: self.max_hop_km,
            cost_tolerance: self.cost_tolerance,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(ValidationError::InvalidTimeout);
        }
        ValidationError::check_range("validation.max_hop_km", self.max_hop_km, 0.0, 20_000.0)?;
        ValidationError::check_range("validation.cost_tolerance", self.cost_tolerance, 0.0, 1.0)?;
        Ok(())
    }
}
