//! Request and response types for a guarantee run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::contingency::ContingencyPlanningResult;
use crate::domain::contract::TravelContract;
use crate::domain::foundation::UserId;
use crate::domain::optimization::OptimizedPlan;
use crate::domain::prediction::AdherencePrediction;
use crate::domain::risk::{RiskAssessment, RiskLevel};
use crate::domain::trip::{ItinerarySummary, RealTimeFactors, TripPreferences};

/// Inbound request. Numeric preference fields are expected to be validated
/// by the caller (`budget > 0`, `days >= 1`, `travelers >= 1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeRequest {
    pub user_id: UserId,
    pub preferences: TripPreferences,
    /// Skips itinerary generation when present.
    #[serde(default)]
    pub existing_itinerary: Option<ItinerarySummary>,
    /// Falls back to the configured target.
    #[serde(default)]
    pub guarantee_target: Option<f64>,
    #[serde(default)]
    pub max_budget_increase: Option<f64>,
    #[serde(default)]
    pub realtime: Option<RealTimeFactors>,
}

impl GuaranteeRequest {
    pub fn new(user_id: UserId, preferences: TripPreferences) -> Self {
        Self {
            user_id,
            preferences,
            existing_itinerary: None,
            guarantee_target: None,
            max_budget_increase: None,
            realtime: None,
        }
    }

    pub fn with_itinerary(mut self, itinerary: ItinerarySummary) -> Self {
        self.existing_itinerary = Some(itinerary);
        self
    }

    pub fn with_target(mut self, guarantee_target: f64) -> Self {
        self.guarantee_target = Some(guarantee_target);
        self
    }

    pub fn with_max_budget_increase(mut self, max_budget_increase: f64) -> Self {
        self.max_budget_increase = Some(max_budget_increase);
        self
    }

    pub fn with_realtime(mut self, realtime: RealTimeFactors) -> Self {
        self.realtime = Some(realtime);
        self
    }
}

/// Headline numbers. All zero when the run failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeSummary {
    pub adherence_guarantee: f64,
    pub total_budget: f64,
    pub risk_level: Option<RiskLevel>,
    pub optimizations_applied: usize,
    pub tactical_suggestions: usize,
}

/// Full output of every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineComponents {
    pub prediction: AdherencePrediction,
    pub optimization: OptimizedPlan,
    pub risk_assessment: RiskAssessment,
    pub contingency_planning: ContingencyPlanningResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Correlates the response with the run's log span.
    pub run_id: Uuid,
    pub processing_time_ms: u64,
    /// Stages that completed, in run order.
    pub engines_used: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeResponse {
    pub success: bool,
    pub contract: Option<TravelContract>,
    pub summary: GuaranteeSummary,
    pub components: Option<PipelineComponents>,
    pub metadata: ResponseMetadata,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl GuaranteeResponse {
    pub(crate) fn failure(error: String, metadata: ResponseMetadata, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            contract: None,
            summary: GuaranteeSummary::default(),
            components: None,
            metadata,
            errors: vec![error],
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
