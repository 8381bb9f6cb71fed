//! Behavioral profile supplied by the user profile source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UserId, ValidationError};

/// Preferred per-day spend, in the budget's currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendRange {
    pub min: f64,
    pub max: f64,
}

impl SpendRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if min < 0.0 || max < min {
            return Err(ValidationError::invalid_format(
                "preferred_daily_spend",
                format!("expected 0 <= min <= max, got {}..{}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// A completed trip from the traveler's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrip {
    pub budget: f64,
    pub actual_spent: f64,
    /// 1.0 when the trip stayed within budget, `budget / actual_spent` otherwise.
    pub adherence: f64,
    pub trip_type: String,
    pub ended_on: NaiveDate,
}

impl HistoricalTrip {
    /// Records a trip, deriving its adherence ratio from budget and spend.
    pub fn new(
        budget: f64,
        actual_spent: f64,
        trip_type: impl Into<String>,
        ended_on: NaiveDate,
    ) -> Self {
        let adherence = if actual_spent <= budget || actual_spent <= 0.0 {
            1.0
        } else {
            (budget / actual_spent).clamp(0.0, 1.0)
        };
        Self {
            budget,
            actual_spent,
            adherence,
            trip_type: trip_type.into(),
            ended_on,
        }
    }
}

/// Behavioral scores in `[0, 1]` plus optional trip history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub price_sensitivity: f64,
    pub activity_preference: f64,
    pub risk_tolerance: f64,
    pub spontaneity_score: f64,
    pub social_preference: f64,
    #[serde(default)]
    pub preferred_daily_spend: Option<SpendRange>,
    #[serde(default)]
    pub historical_trips: Vec<HistoricalTrip>,
}

impl UserProfile {
    /// Creates a profile with every score at the neutral midpoint.
    pub fn neutral(user_id: UserId) -> Self {
        Self {
            user_id,
            price_sensitivity: 0.5,
            activity_preference: 0.5,
            risk_tolerance: 0.5,
            spontaneity_score: 0.5,
            social_preference: 0.5,
            preferred_daily_spend: None,
            historical_trips: Vec::new(),
        }
    }

    /// Checks every behavioral score lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scores = [
            ("price_sensitivity", self.price_sensitivity),
            ("activity_preference", self.activity_preference),
            ("risk_tolerance", self.risk_tolerance),
            ("spontaneity_score", self.spontaneity_score),
            ("social_preference", self.social_preference),
        ];
        for (field, value) in scores {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
            }
        }
        Ok(())
    }

    /// History sorted oldest first.
    pub fn history_chronological(&self) -> Vec<HistoricalTrip> {
        let mut trips = self.historical_trips.clone();
        trips.sort_by_key(|t| t.ended_on);
        trips
    }
}
