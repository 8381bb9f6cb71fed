//! ValidationEngine port - rule checks over a generated itinerary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::trip::{ItinerarySummary, TripPreferences};

/// One rule finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub message: String,
    pub day_index: Option<u32>,
}

impl ValidationIssue {
    pub fn new(rule: impl Into<String>, message: impl Into<String>, day_index: Option<u32>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            day_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// 0-100.
    pub score: u8,
}

impl ValidationReport {
    /// Report for a run that did not finish in time.
    pub fn timed_out(timeout_ms: u64) -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationIssue::new(
                "timeout",
                format!("Validation did not complete within {} ms", timeout_ms),
                None,
            )],
            warnings: Vec::new(),
            score: 0,
        }
    }
}

/// Never fails outright: timeouts and rule failures come back as an
/// invalid report.
#[async_trait]
pub trait ValidationEngine: Send + Sync {
    async fn validate_itinerary(
        &self,
        itinerary: &ItinerarySummary,
        preferences: Option<&TripPreferences>,
    ) -> ValidationReport;
}
