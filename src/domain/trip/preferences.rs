//! What the traveler asked for.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::itinerary::AccommodationTier;

/// Which kinds of itinerary change the optimizer may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFlags {
    #[serde(default = "default_true")]
    pub allow_budget_increase: bool,
    #[serde(default = "default_true")]
    pub allow_transport_changes: bool,
    #[serde(default = "default_true")]
    pub allow_accommodation_changes: bool,
    #[serde(default = "default_true")]
    pub allow_activity_changes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChangeFlags {
    fn default() -> Self {
        Self {
            allow_budget_increase: true,
            allow_transport_changes: true,
            allow_accommodation_changes: true,
            allow_activity_changes: true,
        }
    }
}

impl ChangeFlags {
    /// Only budget changes; the itinerary is left as-is.
    pub fn budget_only() -> Self {
        Self {
            allow_budget_increase: true,
            allow_transport_changes: false,
            allow_accommodation_changes: false,
            allow_activity_changes: false,
        }
    }
}

/// Trip request parameters. Callers validate `budget > 0`, `days >= 1` and
/// `travelers >= 1` before handing these to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPreferences {
    pub budget: f64,
    pub days: u32,
    pub travelers: u32,
    pub accommodation_type: AccommodationTier,
    pub cities: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub constraints: Option<ChangeFlags>,
}

impl TripPreferences {
    pub fn change_flags(&self) -> ChangeFlags {
        self.constraints.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flags_default_to_allowed() {
        let flags: ChangeFlags = serde_json::from_str(r#"{"allow_transport_changes": false}"#).unwrap();
        assert!(!flags.allow_transport_changes);
        assert!(flags.allow_budget_increase);
        assert!(flags.allow_activity_changes);
    }

    #[test]
    fn preferences_deserialize_without_constraints() {
        let json = r#"{
            "budget": 5000000.0,
            "days": 3,
            "travelers": 2,
            "accommodation_type": "moderate",
            "cities": ["Bandung"],
            "start_date": "2025-03-10"
        }"#;
        let prefs: TripPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.change_flags(), ChangeFlags::default());
        assert!(prefs.interests.is_empty());
    }
}
