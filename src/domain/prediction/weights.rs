//! Scoring configuration passed to the predictor.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Predictions never promise certainty.
pub const MAX_SUCCESS_PROBABILITY: f64 = 0.99;

/// Weights applied to the four sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionWeights {
    pub user_behavior: f64,
    pub plan_complexity: f64,
    pub market_conditions: f64,
    pub historical_performance: f64,
}

impl Default for PredictionWeights {
    fn default() -> Self {
        Self {
            user_behavior: 0.40,
            plan_complexity: 0.25,
            market_conditions: 0.20,
            historical_performance: 0.15,
        }
    }
}

impl PredictionWeights {
    pub fn total(&self) -> f64 {
        self.user_behavior + self.plan_complexity + self.market_conditions + self.historical_performance
    }

    /// Weights must be non-negative and sum to 1.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let all = [
            self.user_behavior,
            self.plan_complexity,
            self.market_conditions,
            self.historical_performance,
        ];
        if all.iter().any(|w| *w < 0.0) {
            return Err(ValidationError::invalid_format("weights", "weights must be non-negative"));
        }
        if (self.total() - 1.0).abs() > 1e-6 {
            return Err(ValidationError::out_of_range("weights", 1.0, 1.0, self.total()));
        }
        Ok(())
    }
}

/// Seasonal and city pricing knowledge used by the market-conditions score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCalendar {
    pub peak_months: Vec<u32>,
    pub shoulder_months: Vec<u32>,
    /// Lowercase city names.
    pub expensive_cities: Vec<String>,
}

impl Default for MarketCalendar {
    fn default() -> Self {
        Self {
            peak_months: vec![6, 7, 8, 12, 1],
            shoulder_months: vec![4, 5, 9, 10, 11],
            expensive_cities: [
                "tokyo", "singapore", "hong kong", "london", "paris", "new york", "zurich",
                "geneva", "oslo", "copenhagen", "sydney", "dubai", "reykjavik",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl MarketCalendar {
    pub fn is_peak(&self, month: u32) -> bool {
        self.peak_months.contains(&month)
    }

    pub fn is_shoulder(&self, month: u32) -> bool {
        self.shoulder_months.contains(&month)
    }

    pub fn is_expensive_city(&self, city: &str) -> bool {
        let city = city.trim().to_lowercase();
        self.expensive_cities.iter().any(|c| *c == city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(PredictionWeights::default().validate().is_ok());
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let weights = PredictionWeights {
            user_behavior: 0.9,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn calendar_classifies_months_and_cities() {
        let calendar = MarketCalendar::default();
        assert!(calendar.is_peak(12));
        assert!(calendar.is_shoulder(10));
        assert!(!calendar.is_peak(3) && !calendar.is_shoulder(3));
        assert!(calendar.is_expensive_city(" Tokyo "));
        assert!(!calendar.is_expensive_city("Bandung"));
    }
}
