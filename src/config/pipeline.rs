//! Pipeline tuning configuration

use serde::Deserialize;

use crate::domain::foundation::CategoryAmounts;
use crate::domain::optimization::OptimizerSettings;
use crate::domain::trip::AllocationRatios;

use super::error::ValidationError;

/// Default split of a fresh budget across the five categories.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub accommodation: f64,
    pub transportation: f64,
    pub food: f64,
    pub activities: f64,
    pub miscellaneous: f64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            accommodation: 0.35,
            transportation: 0.20,
            food: 0.20,
            activities: 0.15,
            miscellaneous: 0.10,
        }
    }
}

/// Targets and limits for a guarantee run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Adherence target when the request does not carry one
    pub guarantee_target: f64,

    /// Budget growth allowed when the request does not carry one
    pub max_budget_increase: f64,

    /// Fraction of the total that category allocations may exceed it by
    pub budget_tolerance: f64,

    pub high_daily_food_budget: f64,

    pub currency: String,

    pub allocation: AllocationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            guarantee_target: 0.95,
            max_budget_increase: 0.2,
            budget_tolerance: 0.05,
            high_daily_food_budget: 300_000.0,
            currency: "IDR".to_string(),
            allocation: AllocationConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn allocation_ratios(&self) -> Result<AllocationRatios, ValidationError> {
        let a = &self.allocation;
        AllocationRatios::new(CategoryAmounts::new([
            a.accommodation,
            a.transportation,
            a.food,
            a.activities,
            a.miscellaneous,
        ]))
        .map_err(|e| ValidationError::InvalidAllocation(e.to_string()))
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            budget_tolerance: self.budget_tolerance,
            high_daily_food_budget: self.high_daily_food_budget,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range("pipeline.guarantee_target", self.guarantee_target, 0.0, 1.0)?;
        ValidationError::check_range("pipeline.max_budget_increase", self.max_budget_increase, 0.0, 1.0)?;
        ValidationError::check_range("pipeline.budget_tolerance", self.budget_tolerance, 0.0, 1.0)?;
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PIPELINE__CURRENCY"));
        }
        self.allocation_ratios()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::BudgetCategory;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        let ratios = config.allocation_ratios().unwrap();
        assert_eq!(ratios.ratio(BudgetCategory::Accommodation), 0.35);
    }

    #[test]
    fn overfull_allocation_is_rejected() {
        let mut config = PipelineConfig::default();
        config.allocation.food = 0.5;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAllocation(_))));
    }

    #[test]
    fn target_above_one_is_rejected() {
        let config = PipelineConfig {
            guarantee_target: 1.2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::OutOfRange { .. })));
    }
}
