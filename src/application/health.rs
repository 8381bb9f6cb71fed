//! Component health probes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::contingency::ContingencyPlanningResult;
use crate::domain::contract::ContractInputs;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::optimization::{OptimizationConstraints, OptimizedPlan};
use crate::domain::prediction::{AdherencePrediction, MAX_SUCCESS_PROBABILITY};
use crate::domain::risk::RiskAssessment;
use crate::domain::trip::{
    Accommodation, AccommodationTier, BudgetBreakdown, Day, Destination, ItinerarySummary,
    Location, TripPreferences,
};
use crate::ports::ItineraryGenerationError;

use super::orchestrator::BaapOrchestrator;

const PROBE_USER: &str = "health-probe";
const PROBE_BUDGET: f64 = 1_000_000.0;

/// Ordered from best to worst so the overall status is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: String,
    pub status: HealthStatus,
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn healthy(component: &str) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Healthy,
            detail: None,
        }
    }

    fn degraded(component: &str, detail: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Degraded,
            detail: Some(detail.into()),
        }
    }

    fn unhealthy(component: &str, detail: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Unhealthy,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub checked_at: Timestamp,
}

impl HealthReport {
    /// Unhealthy if any component is, else degraded if any is, else healthy.
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let status = components
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            status,
            components,
            checked_at: Timestamp::now(),
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.component == name)
    }
}

impl BaapOrchestrator {
    /// Probes every collaborator and stage with a one-day trip.
    pub async fn health_check(&self) -> HealthReport {
        let itinerary = probe_itinerary();
        let budget = BudgetBreakdown::from_total(PROBE_BUDGET, &self.defaults.ratios, self.defaults.currency.clone());
        let mut components = Vec::with_capacity(8);

        components.push(self.probe_profile_source().await);
        components.push(self.probe_itinerary_generator().await);
        components.push(self.probe_validation_engine(&itinerary).await);

        let prediction = self.predictor.predict(&budget, None, &itinerary, None);
        components.push(check_prediction(&prediction));

        let plan = self.optimizer.optimize(
            &itinerary,
            &budget,
            &prediction,
            None,
            &OptimizationConstraints::default(),
        );
        let plan = match plan {
            Ok(plan) => {
                components.push(ComponentHealth::healthy("plan_optimization"));
                Some(plan)
            }
            Err(e) => {
                components.push(ComponentHealth::unhealthy("plan_optimization", e.to_string()));
                None
            }
        };

        let assessment = self.assessor.assess(&itinerary, &budget, None, &prediction, None);
        components.push(check_assessment(&assessment));

        let contingency = self.planner.plan(&itinerary, &budget, &assessment, None, None);
        components.push(if contingency.plan_count() > 0 {
            ComponentHealth::healthy("contingency_planning")
        } else {
            ComponentHealth::degraded("contingency_planning", "no plans produced")
        });

        components.push(match plan {
            Some(plan) => self.probe_contracts(&plan, &prediction, &assessment, &contingency),
            None => ComponentHealth::degraded("contract_generator", "skipped, no optimized plan"),
        });

        let report = HealthReport::from_components(components);
        if report.status == HealthStatus::Healthy {
            info!("Health check passed");
        } else {
            warn!(status = ?report.status, "Health check found problems");
        }
        report
    }

    async fn probe_profile_source(&self) -> ComponentHealth {
        let user = match UserId::new(PROBE_USER) {
            Ok(user) => user,
            Err(e) => return ComponentHealth::unhealthy("profile_source", e.to_string()),
        };
        match self.profile_source.get_user_profile(&user).await {
            Ok(_) => ComponentHealth::healthy("profile_source"),
            Err(e) => ComponentHealth::unhealthy("profile_source", e.to_string()),
        }
    }

    async fn probe_itinerary_generator(&self) -> ComponentHealth {
        match self.itinerary_generator.generate_itinerary(&probe_preferences()).await {
            Ok(itinerary) if !itinerary.is_empty() => ComponentHealth::healthy("itinerary_generator"),
            Ok(_) => ComponentHealth::degraded("itinerary_generator", "returned an empty itinerary"),
            Err(e @ ItineraryGenerationError::Rejected(_)) => {
                ComponentHealth::degraded("itinerary_generator", e.to_string())
            }
            Err(e) => ComponentHealth::unhealthy("itinerary_generator", e.to_string()),
        }
    }

    async fn probe_validation_engine(&self, itinerary: &ItinerarySummary) -> ComponentHealth {
        let report = self.validation_engine.validate_itinerary(itinerary, None).await;
        if report.is_valid {
            return ComponentHealth::healthy("validation_engine");
        }
        let detail = report
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if report.errors.iter().any(|e| e.rule == "timeout") {
            ComponentHealth::unhealthy("validation_engine", detail)
        } else {
            ComponentHealth::degraded("validation_engine", detail)
        }
    }

    fn probe_contracts(
        &self,
        plan: &OptimizedPlan,
        prediction: &AdherencePrediction,
        assessment: &RiskAssessment,
        contingency: &ContingencyPlanningResult,
    ) -> ComponentHealth {
        let user = match UserId::new(PROBE_USER) {
            Ok(user) => user,
            Err(e) => return ComponentHealth::unhealthy("contract_generator", e.to_string()),
        };
        let terms = self.contract_config.terms(self.defaults.guarantee_target);
        let generated = self.contracts.generate(
            ContractInputs {
                customer: &user,
                profile: None,
                plan,
                prediction,
                assessment,
                contingency,
            },
            &terms,
        );
        match generated.and_then(|contract| self.contracts.verify_provider_signature(&contract)) {
            Ok(()) => ComponentHealth::healthy("contract_generator"),
            Err(e) => ComponentHealth::unhealthy("contract_generator", e.to_string()),
        }
    }
}

fn check_prediction(prediction: &AdherencePrediction) -> ComponentHealth {
    let probability = prediction.success_probability.value();
    let confidence = prediction.confidence.value();
    if (0.0..=MAX_SUCCESS_PROBABILITY).contains(&probability) && (0.5..=0.95).contains(&confidence) {
        ComponentHealth::healthy("adherence_prediction")
    } else {
        ComponentHealth::degraded(
            "adherence_prediction",
            format!("out-of-range output: probability {}, confidence {}", probability, confidence),
        )
    }
}

fn check_assessment(assessment: &RiskAssessment) -> ComponentHealth {
    let total = assessment.distribution.total();
    let expected = if assessment.factors.iter().any(|f| f.risk_score > 0.0) { 1.0 } else { 0.0 };
    if (total - expected).abs() <= 1e-6 {
        ComponentHealth::healthy("risk_assessment")
    } else {
        ComponentHealth::degraded("risk_assessment", format!("distribution sums to {}", total))
    }
}

fn probe_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default()
}

fn probe_preferences() -> TripPreferences {
    TripPreferences {
        budget: PROBE_BUDGET,
        days: 1,
        travelers: 1,
        accommodation_type: AccommodationTier::Budget,
        cities: vec!["Bandung".to_string()],
        interests: Vec::new(),
        themes: Vec::new(),
        start_date: probe_date(),
        constraints: None,
    }
}

fn probe_itinerary() -> ItinerarySummary {
    ItinerarySummary::new(vec![Day::new(
        1,
        probe_date(),
        vec![Destination {
            id: "probe-1".to_string(),
            name: "Gedung Sate".to_string(),
            category: "culture".to_string(),
            location: Location::city("Bandung"),
            scheduled_time: None,
            duration_minutes: 90,
            estimated_cost: 100_000.0,
            rating: 4.5,
            tags: Vec::new(),
        }],
        Some(Accommodation {
            name: "Probe guesthouse".to_string(),
            tier: AccommodationTier::Budget,
            cost: 300_000.0,
        }),
        None,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::itinerary::TemplateItineraryGenerator;
    use crate::adapters::itinerary_validation::RuleValidationEngine;
    use crate::adapters::profile_source::InMemoryProfileSource;
    use crate::config::AppConfig;
    use crate::ports::{ProfileSourceError, UserProfileSource};
    use crate::domain::trip::UserProfile;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Arc;

    struct DownProfileSource;

    #[async_trait]
    impl UserProfileSource for DownProfileSource {
        async fn get_user_profile(&self, _user_id: &UserId) -> Result<Option<UserProfile>, ProfileSourceError> {
            Err(ProfileSourceError::Unavailable("timeout".to_string()))
        }
    }

    fn orchestrator(profile_source: Arc<dyn UserProfileSource>) -> BaapOrchestrator {
        let mut config = AppConfig::default();
        config.contract.signing_key = SecretString::new("health-key".to_string());
        BaapOrchestrator::new(
            profile_source,
            Arc::new(TemplateItineraryGenerator::default()),
            Arc::new(RuleValidationEngine::from_config(&config.validation)),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn overall_status_is_the_worst_component() {
        let report = HealthReport::from_components(vec![
            ComponentHealth::healthy("a"),
            ComponentHealth::degraded("b", "slow"),
        ]);
        assert_eq!(report.status, HealthStatus::Degraded);

        let report = HealthReport::from_components(vec![
            ComponentHealth::degraded("b", "slow"),
            ComponentHealth::unhealthy("c", "down"),
            ComponentHealth::healthy("a"),
        ]);
        assert_eq!(report.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn all_components_healthy_with_working_collaborators() {
        let report = orchestrator(Arc::new(InMemoryProfileSource::new())).health_check().await;

        assert_eq!(report.status, HealthStatus::Healthy, "{:?}", report.components);
        assert_eq!(report.components.len(), 8);
    }

    #[tokio::test]
    async fn failing_profile_source_makes_the_system_unhealthy() {
        let report = orchestrator(Arc::new(DownProfileSource)).health_check().await;

        assert_eq!(report.status, HealthStatus::Unhealthy);
        let profile = report.component("profile_source").unwrap();
        assert_eq!(profile.status, HealthStatus::Unhealthy);
        assert!(profile.detail.as_deref().unwrap().contains("timeout"));
        assert_eq!(
            report.component("adherence_prediction").unwrap().status,
            HealthStatus::Healthy
        );
    }
}
