//! Budget breakdown across the five categories.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BudgetCategory, CategoryAmounts, ValidationError};

/// Fractions of the total assigned to each category when a budget is first split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationRatios(CategoryAmounts);

impl AllocationRatios {
    pub fn new(ratios: CategoryAmounts) -> Result<Self, ValidationError> {
        if ratios.iter().any(|(_, r)| r < 0.0) {
            return Err(ValidationError::invalid_format(
                "allocation_ratios",
                "ratios must be non-negative",
            ));
        }
        let sum = ratios.sum();
        if sum > 1.0 + 1e-9 {
            return Err(ValidationError::out_of_range("allocation_ratios", 0.0, 1.0, sum));
        }
        Ok(Self(ratios))
    }

    pub fn ratio(&self, category: BudgetCategory) -> f64 {
        self.0[category]
    }
}

impl Default for AllocationRatios {
    fn default() -> Self {
        Self(CategoryAmounts::new([0.35, 0.20, 0.20, 0.15, 0.10]))
    }
}

/// A total budget and its per-category allocations.
///
/// The categories may sum to less than the total (the remainder is an
/// unallocated buffer) but never to more than the total plus tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub total_budget: f64,
    pub categories: CategoryAmounts,
    pub currency: String,
}

impl BudgetBreakdown {
    pub fn new(total_budget: f64, categories: CategoryAmounts, currency: impl Into<String>) -> Self {
        Self {
            total_budget,
            categories,
            currency: currency.into(),
        }
    }

    /// Splits `total_budget` using the given ratios.
    pub fn from_total(total_budget: f64, ratios: &AllocationRatios, currency: impl Into<String>) -> Self {
        let categories = CategoryAmounts::from_fn(|c| total_budget * ratios.ratio(c));
        Self::new(total_budget, categories, currency)
    }

    pub fn amount(&self, category: BudgetCategory) -> f64 {
        self.categories[category]
    }

    /// Sum of all category allocations.
    pub fn allocated(&self) -> f64 {
        self.categories.sum()
    }

    /// Unallocated remainder; negative when categories exceed the total.
    pub fn remainder(&self) -> f64 {
        self.total_budget - self.allocated()
    }

    /// Fraction of the total assigned to `category`.
    pub fn share(&self, category: BudgetCategory) -> f64 {
        if self.total_budget <= 0.0 {
            return 0.0;
        }
        self.categories[category] / self.total_budget
    }

    /// Checks the total is positive and the categories do not exceed it by more
    /// than `tolerance` (a fraction of the total).
    pub fn validate(&self, tolerance: f64) -> Result<(), ValidationError> {
        if self.total_budget <= 0.0 || !self.total_budget.is_finite() {
            return Err(ValidationError::out_of_range(
                "total_budget",
                0.0,
                f64::MAX,
                self.total_budget,
            ));
        }
        if let Some((category, amount)) = self.categories.iter().find(|(_, a)| *a < 0.0) {
            return Err(ValidationError::invalid_format(
                "categories",
                format!("{} allocation is negative ({})", category, amount),
            ));
        }
        let limit = self.total_budget * (1.0 + tolerance);
        if self.allocated() > limit {
            return Err(ValidationError::invalid_format(
                "categories",
                format!(
                    "category sum {:.2} exceeds total {:.2} beyond tolerance",
                    self.allocated(),
                    self.total_budget
                ),
            ));
        }
        Ok(())
    }

    /// Returns a new breakdown with total and every category grown by `fraction`.
    pub fn increased_by(&self, fraction: f64) -> Self {
        let factor = 1.0 + fraction;
        Self {
            total_budget: self.total_budget * factor,
            categories: self.categories.scaled(factor),
            currency: self.currency.clone(),
        }
    }

    /// Returns a new breakdown with the given categories and the same total.
    pub fn with_categories(&self, categories: CategoryAmounts) -> Self {
        Self {
            total_budget: self.total_budget,
            categories,
            currency: self.currency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BudgetBreakdown {
        BudgetBreakdown::from_total(5_000_000.0, &AllocationRatios::default(), "IDR")
    }

    #[test]
    fn from_total_applies_default_ratios() {
        let budget = sample();
        assert!((budget.amount(BudgetCategory::Accommodation) - 1_750_000.0).abs() < 1e-6);
        assert!((budget.amount(BudgetCategory::Miscellaneous) - 500_000.0).abs() < 1e-6);
        assert!(budget.remainder().abs() < 1e-6);
    }

    #[test]
    fn ratios_summing_above_one_are_rejected() {
        let ratios = CategoryAmounts::new([0.5, 0.3, 0.2, 0.1, 0.1]);
        assert!(AllocationRatios::new(ratios).is_err());
    }

    #[test]
    fn validate_allows_remainder_buffer() {
        let budget = BudgetBreakdown::new(1000.0, CategoryAmounts::new([300.0, 200.0, 200.0, 100.0, 0.0]), "IDR");
        assert!(budget.validate(0.0).is_ok());
        assert!((budget.remainder() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_overallocation_beyond_tolerance() {
        let budget = BudgetBreakdown::new(1000.0, CategoryAmounts::new([400.0, 300.0, 200.0, 100.0, 60.0]), "IDR");
        assert!(budget.validate(0.05).is_err());
        assert!(budget.validate(0.10).is_ok());
    }

    #[test]
    fn increased_by_scales_total_and_categories() {
        let budget = sample().increased_by(0.2);
        assert!((budget.total_budget - 6_000_000.0).abs() < 1e-6);
        assert!((budget.amount(BudgetCategory::Food) - 1_200_000.0).abs() < 1e-6);
        assert!((budget.share(BudgetCategory::Accommodation) - 0.35).abs() < 1e-9);
    }
}
