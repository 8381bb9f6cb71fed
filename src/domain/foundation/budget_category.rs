//! BudgetCategory enum and the dense per-category amount table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// The five budget categories every allocation is split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    Accommodation,
    Transportation,
    Food,
    Activities,
    Miscellaneous,
}

impl BudgetCategory {
    /// Returns all categories in canonical order.
    pub fn all() -> &'static [BudgetCategory; 5] {
        &[
            BudgetCategory::Accommodation,
            BudgetCategory::Transportation,
            BudgetCategory::Food,
            BudgetCategory::Activities,
            BudgetCategory::Miscellaneous,
        ]
    }

    /// Returns the 0-based index of this category in the canonical order.
    pub fn index(&self) -> usize {
        match self {
            BudgetCategory::Accommodation => 0,
            BudgetCategory::Transportation => 1,
            BudgetCategory::Food => 2,
            BudgetCategory::Activities => 3,
            BudgetCategory::Miscellaneous => 4,
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BudgetCategory::Accommodation => "Accommodation",
            BudgetCategory::Transportation => "Transportation",
            BudgetCategory::Food => "Food",
            BudgetCategory::Activities => "Activities",
            BudgetCategory::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One amount per [`BudgetCategory`], stored densely in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAmounts([f64; 5]);

impl CategoryAmounts {
    /// All categories at zero.
    pub const ZERO: Self = Self([0.0; 5]);

    /// Creates a table from amounts in canonical order.
    pub fn new(amounts: [f64; 5]) -> Self {
        Self(amounts)
    }

    /// Builds a table by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(BudgetCategory) -> f64) -> Self {
        let mut amounts = [0.0; 5];
        for category in BudgetCategory::all() {
            amounts[category.index()] = f(*category);
        }
        Self(amounts)
    }

    /// Iterates `(category, amount)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (BudgetCategory, f64)> + '_ {
        BudgetCategory::all().iter().map(move |c| (*c, self.0[c.index()]))
    }

    /// Sum of all categories.
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Mean of the five amounts.
    pub fn mean(&self) -> f64 {
        self.sum() / self.0.len() as f64
    }

    /// Population coefficient of variation. Zero when the mean is zero.
    pub fn coefficient_of_variation(&self) -> f64 {
        let mean = self.mean();
        if mean.abs() < f64::EPSILON {
            return 0.0;
        }
        let variance = self.0.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / self.0.len() as f64;
        variance.sqrt() / mean
    }

    /// Returns a new table with every amount multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|a| a * factor))
    }

    /// Returns a new table with `amount` moved from one category to another.
    pub fn with_transfer(&self, from: BudgetCategory, to: BudgetCategory, amount: f64) -> Self {
        let mut next = *self;
        next[from] -= amount;
        next[to] += amount;
        next
    }
}

impl Index<BudgetCategory> for CategoryAmounts {
    type Output = f64;

    fn index(&self, category: BudgetCategory) -> &f64 {
        &self.0[category.index()]
    }
}

impl IndexMut<BudgetCategory> for CategoryAmounts {
    fn index_mut(&mut self, category: BudgetCategory) -> &mut f64 {
        &mut self.0[category.index()]
    }
}
