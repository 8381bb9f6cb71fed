//! ContingencyPlanner - selects catalog plans and sizes the reserves.

use tracing::debug;

use crate::domain::risk::{RiskAssessment, RiskCategory};
use crate::domain::trip::{BudgetBreakdown, ItinerarySummary, RealTimeFactors, UserProfile};

use super::catalog::{self, PlanContext};
use super::values::{ContingencyPlanningResult, ResourceAllocation, ResourceShares, ResponseTime, SuccessMetrics};

const FULL_COVERAGE_PLANS: f64 = 10.0;
const BASELINE_TRANSPORT_LIKELIHOOD: f64 = 0.1;
const BASELINE_HEALTH_LIKELIHOOD: f64 = 0.05;
const BASELINE_OVERRUN_LIKELIHOOD: f64 = 0.1;
const IMPULSIVE_SPONTANEITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default)]
pub struct ContingencyPlanner;

impl ContingencyPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        itinerary: &ItinerarySummary,
        budget: &BudgetBreakdown,
        assessment: &RiskAssessment,
        profile: Option<&UserProfile>,
        realtime: Option<&RealTimeFactors>,
    ) -> ContingencyPlanningResult {
        let resources = ResourceAllocation::from_shares(
            ResourceShares::for_level(assessment.risk_level),
            budget.total_budget,
        );

        let largest_transport_leg = itinerary
            .days
            .iter()
            .map(|d| d.transportation_cost())
            .fold(0.0, f64::max);
        let ctx = PlanContext {
            total_budget: budget.total_budget,
            daily_budget: budget.total_budget / itinerary.day_count().max(1) as f64,
            largest_transport_leg,
            currency: &budget.currency,
            alerts: realtime.map(|r| r.alerts.as_slice()).unwrap_or(&[]),
        };

        let transport_likelihood = assessment
            .factor("transportation_delay")
            .map_or(BASELINE_TRANSPORT_LIKELIHOOD, |f| f.likelihood);
        let health_likelihood = max_likelihood(assessment, RiskCategory::HealthSafety)
            .unwrap_or(BASELINE_HEALTH_LIKELIHOOD);
        let overrun_likelihood = max_likelihood(assessment, RiskCategory::Budget)
            .into_iter()
            .chain(max_likelihood(assessment, RiskCategory::UserBehavior))
            .fold(BASELINE_OVERRUN_LIKELIHOOD, f64::max);
        let overrun_response = if profile.is_some_and(|p| p.spontaneity_score > IMPULSIVE_SPONTANEITY) {
            ResponseTime::Immediate
        } else {
            ResponseTime::Hours
        };

        let mut primary = vec![
            catalog::transport_failure(&ctx, transport_likelihood),
            catalog::health_emergency(&ctx, health_likelihood),
            catalog::budget_overrun(&ctx, overrun_likelihood, overrun_response, resources.emergency_fund),
        ];
        if let Some(weather) = assessment.factor("weather_disruption") {
            primary.push(catalog::weather_disruption(&ctx, weather.likelihood));
        }

        let secondary = vec![catalog::lost_documents(&ctx), catalog::accommodation_issue(&ctx)];

        let covered = primary.len() + secondary.len();
        let average_response_minutes = primary
            .iter()
            .chain(secondary.iter())
            .map(|p| f64::from(p.response_time.minutes()))
            .sum::<f64>()
            / covered as f64;
        let metrics = SuccessMetrics {
            coverage: (covered as f64 / FULL_COVERAGE_PLANS).min(1.0),
            average_response_minutes,
            cost_efficiency: resources.total() / covered as f64,
        };

        debug!(
            primary = primary.len(),
            secondary = secondary.len(),
            reserved = resources.total(),
            "Contingency plans prepared"
        );

        ContingencyPlanningResult {
            primary,
            secondary,
            emergency_protocols: catalog::emergency_protocols(),
            resources,
            monitoring_triggers: catalog::monitoring_triggers(),
            metrics,
        }
    }
}

fn max_likelihood(assessment: &RiskAssessment, category: RiskCategory) -> Option<f64> {
    assessment
        .factors
        .iter()
        .filter(|f| f.category == category)
        .map(|f| f.likelihood)
        .reduce(f64::max)
}
