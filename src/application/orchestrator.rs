//! BaapOrchestrator - runs the guarantee pipeline end to end.
//!
//! Stages run in a fixed order: profile lookup, itinerary (generated unless
//! supplied), validation, prediction, optimization, risk assessment,
//! contingency planning, contract generation. The orchestrator is the only
//! error boundary: every failure becomes an entry in `errors` and the run
//! returns a zeroed response instead of propagating.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;

use crate::config::{AppConfig, ConfigError, ContractConfig};
use crate::domain::contingency::ContingencyPlanner;
use crate::domain::contract::{
    sign, status, validate_contract, ContractError, ContractGenerator, ContractInputs,
    ContractStatus, TravelContract,
};
use crate::domain::foundation::Timestamp;
use crate::domain::optimization::{
    OptimizationConstraints, OptimizationError, OptimizerSettings, PlanOptimizer,
};
use crate::domain::prediction::{AdherencePredictor, MarketCalendar};
use crate::domain::risk::RiskAssessor;
use crate::domain::trip::{AllocationRatios, BudgetBreakdown, ItinerarySummary};
use crate::ports::{
    ItineraryGenerationError, ItineraryGenerator, ProfileSourceError, UserProfileSource,
    ValidationEngine,
};

use super::guarantee::{
    GuaranteeRequest, GuaranteeResponse, GuaranteeSummary, PipelineComponents, ResponseMetadata,
};

/// Failures that abort a run. Never leaves the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Profile lookup failed: {0}")]
    ProfileLookup(#[from] ProfileSourceError),

    #[error(transparent)]
    ItineraryGeneration(#[from] ItineraryGenerationError),

    #[error("Itinerary failed validation: {}", .0.join("; "))]
    InvalidItinerary(Vec<String>),

    #[error("Optimization failed: {0}")]
    Optimization(#[from] OptimizationError),

    #[error("Contract generation failed: {0}")]
    Contract(#[from] ContractError),
}

/// Defaults applied when a request leaves a field unset.
#[derive(Debug, Clone)]
pub(crate) struct PipelineDefaults {
    pub guarantee_target: f64,
    pub max_budget_increase: f64,
    pub ratios: AllocationRatios,
    pub currency: String,
}

/// Warnings and completed stages collected while a run progresses.
#[derive(Debug, Default)]
struct RunLog {
    engines_used: Vec<String>,
    warnings: Vec<String>,
}

impl RunLog {
    fn completed(&mut self, engine: &str) {
        self.engines_used.push(engine.to_string());
    }
}

struct Completed {
    contract: TravelContract,
    components: PipelineComponents,
}

/// Owns one instance of every stage and the three collaborators.
pub struct BaapOrchestrator {
    pub(crate) profile_source: Arc<dyn UserProfileSource>,
    pub(crate) itinerary_generator: Arc<dyn ItineraryGenerator>,
    pub(crate) validation_engine: Arc<dyn ValidationEngine>,
    pub(crate) predictor: AdherencePredictor,
    pub(crate) optimizer: PlanOptimizer,
    pub(crate) assessor: RiskAssessor,
    pub(crate) planner: ContingencyPlanner,
    pub(crate) contracts: ContractGenerator,
    pub(crate) contract_config: ContractConfig,
    pub(crate) optimizer_settings: OptimizerSettings,
    pub(crate) defaults: PipelineDefaults,
}

impl BaapOrchestrator {
    /// Builds every stage from a validated configuration.
    pub fn new(
        profile_source: Arc<dyn UserProfileSource>,
        itinerary_generator: Arc<dyn ItineraryGenerator>,
        validation_engine: Arc<dyn ValidationEngine>,
        config: &AppConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let calendar = MarketCalendar::default();
        let predictor = AdherencePredictor::new(Default::default(), calendar.clone());
        let optimizer_settings = config.pipeline.optimizer_settings();

        Ok(Self {
            profile_source,
            itinerary_generator,
            validation_engine,
            optimizer: PlanOptimizer::new(predictor.clone(), optimizer_settings),
            predictor,
            assessor: RiskAssessor::new(calendar),
            planner: ContingencyPlanner::new(),
            contracts: ContractGenerator::new(
                config.contract.provider_name.clone(),
                config.contract.signing_key.clone(),
            ),
            contract_config: config.contract.clone(),
            optimizer_settings,
            defaults: PipelineDefaults {
                guarantee_target: config.pipeline.guarantee_target,
                max_budget_increase: config.pipeline.max_budget_increase,
                ratios: config.pipeline.allocation_ratios()?,
                currency: config.pipeline.currency.clone(),
            },
        })
    }

    /// Replaces the scoring engine, e.g. with a custom weight table.
    pub fn with_predictor(mut self, predictor: AdherencePredictor) -> Self {
        self.optimizer = PlanOptimizer::new(predictor.clone(), self.optimizer_settings);
        self.predictor = predictor;
        self
    }

    /// Runs the whole pipeline. Never returns an error; failures are
    /// reported in the response.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, run_id = field::Empty))]
    pub async fn handle(&self, request: GuaranteeRequest) -> GuaranteeResponse {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));
        let mut log = RunLog::default();

        let outcome = self.run(&request, &mut log).await;
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(Completed { contract, components }) => {
                info!(
                    contract_id = %contract.contract_id,
                    adherence = components.optimization.guaranteed_adherence.value(),
                    warnings = log.warnings.len(),
                    processing_time_ms,
                    "Guarantee pipeline completed"
                );
                GuaranteeResponse {
                    success: true,
                    summary: GuaranteeSummary {
                        adherence_guarantee: components.optimization.guaranteed_adherence.value(),
                        total_budget: components.optimization.budget.total_budget,
                        risk_level: Some(components.risk_assessment.risk_level),
                        optimizations_applied: components.optimization.optimizations.len(),
                        tactical_suggestions: components.optimization.tactical_suggestions.len(),
                    },
                    metadata: ResponseMetadata {
                        run_id,
                        processing_time_ms,
                        engines_used: log.engines_used,
                        confidence: components.optimization.final_prediction.confidence.value(),
                    },
                    contract: Some(contract),
                    components: Some(components),
                    errors: Vec::new(),
                    warnings: log.warnings,
                }
            }
            Err(err) => {
                warn!(error = %err, processing_time_ms, "Guarantee pipeline failed");
                GuaranteeResponse::failure(
                    err.to_string(),
                    ResponseMetadata {
                        run_id,
                        processing_time_ms,
                        engines_used: log.engines_used,
                        confidence: 0.0,
                    },
                    log.warnings,
                )
            }
        }
    }

    async fn run(&self, request: &GuaranteeRequest, log: &mut RunLog) -> Result<Completed, PipelineError> {
        let preferences = &request.preferences;

        let profile = self.profile_source.get_user_profile(&request.user_id).await?;
        if profile.is_none() {
            debug!("No profile on record, scoring with neutral behavior");
        }
        let profile = profile.as_ref();
        log.completed("profile_source");

        let itinerary = match &request.existing_itinerary {
            Some(itinerary) => itinerary.clone(),
            None => {
                let generated = self.itinerary_generator.generate_itinerary(preferences).await?;
                log.completed("itinerary_generator");
                generated
            }
        };

        self.check_itinerary(&itinerary, request, log).await?;

        let budget = BudgetBreakdown::from_total(preferences.budget, &self.defaults.ratios, self.defaults.currency.clone());
        let history = profile.map(|p| p.historical_trips.as_slice());
        let prediction = self.predictor.predict(&budget, profile, &itinerary, history);
        log.completed("adherence_prediction");

        let constraints = OptimizationConstraints {
            max_budget_increase: request
                .max_budget_increase
                .unwrap_or(self.defaults.max_budget_increase),
            min_adherence_target: request.guarantee_target.unwrap_or(self.defaults.guarantee_target),
            change_flags: preferences.change_flags(),
        };
        let plan = self
            .optimizer
            .optimize(&itinerary, &budget, &prediction, profile, &constraints)?;
        log.completed("plan_optimization");
        if !plan.success {
            log.warnings.push(format!(
                "Adherence target {:.0}% is unreachable; guaranteeing {:.1}% instead",
                constraints.min_adherence_target * 100.0,
                plan.guaranteed_adherence.value() * 100.0
            ));
        }

        let realtime = request.realtime.as_ref();
        let assessment = self.assessor.assess(
            &plan.itinerary,
            &plan.budget,
            profile,
            &plan.final_prediction,
            realtime,
        );
        log.completed("risk_assessment");

        let contingency = self
            .planner
            .plan(&plan.itinerary, &plan.budget, &assessment, profile, realtime);
        log.completed("contingency_planning");

        let terms = self.contract_config.terms(constraints.min_adherence_target);
        let contract = self.contracts.generate(
            ContractInputs {
                customer: &request.user_id,
                profile,
                plan: &plan,
                prediction: &prediction,
                assessment: &assessment,
                contingency: &contingency,
            },
            &terms,
        )?;
        log.completed("contract_generator");

        let consistency = validate_contract(&contract);
        if !consistency.is_valid {
            warn!(contract_id = %contract.contract_id, "Generated contract failed consistency checks");
            log.warnings
                .extend(consistency.errors.into_iter().map(|e| format!("Contract: {}", e)));
        }

        Ok(Completed {
            contract,
            components: PipelineComponents {
                prediction,
                optimization: plan,
                risk_assessment: assessment,
                contingency_planning: contingency,
            },
        })
    }

    async fn check_itinerary(
        &self,
        itinerary: &ItinerarySummary,
        request: &GuaranteeRequest,
        log: &mut RunLog,
    ) -> Result<(), PipelineError> {
        let report = self
            .validation_engine
            .validate_itinerary(itinerary, Some(&request.preferences))
            .await;
        log.warnings.extend(
            report
                .warnings
                .iter()
                .map(|w| format!("Itinerary {}: {}", w.rule, w.message)),
        );
        if !report.is_valid {
            return Err(PipelineError::InvalidItinerary(
                report.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        debug!(score = report.score, "Itinerary validated");
        log.completed("validation_engine");
        Ok(())
    }

    /// Customer signature. The provider signature is verified first so a
    /// tampered contract cannot be countersigned.
    pub fn sign_contract(&self, contract: &TravelContract, signature: &str) -> Result<TravelContract, ContractError> {
        self.contracts.verify_provider_signature(contract)?;
        let signed = sign(contract, signature, Timestamp::now())?;
        info!(contract_id = %signed.contract_id, "Contract signed by customer");
        Ok(signed)
    }

    pub fn contract_status(&self, contract: &TravelContract) -> ContractStatus {
        status(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::itinerary::TemplateItineraryGenerator;
    use crate::adapters::profile_source::InMemoryProfileSource;
    use crate::domain::foundation::UserId;
    use crate::domain::trip::{AccommodationTier, TripPreferences, UserProfile};
    use crate::ports::{ValidationIssue, ValidationReport};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ─────────────────────────────────────────────────────────────────────
    // Mock implementations
    // ─────────────────────────────────────────────────────────────────────

    struct FailingProfileSource;

    #[async_trait]
    impl UserProfileSource for FailingProfileSource {
        async fn get_user_profile(&self, _user_id: &UserId) -> Result<Option<UserProfile>, ProfileSourceError> {
            Err(ProfileSourceError::Unavailable("connection refused".to_string()))
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
        inner: TemplateItineraryGenerator,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                inner: TemplateItineraryGenerator::default(),
            }
        }
    }

    #[async_trait]
    impl ItineraryGenerator for CountingGenerator {
        async fn generate_itinerary(
            &self,
            preferences: &TripPreferences,
        ) -> Result<ItinerarySummary, ItineraryGenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.generate_itinerary(preferences).await
        }
    }

    struct StubValidation {
        report: ValidationReport,
    }

    impl StubValidation {
        fn passing() -> Self {
            Self {
                report: ValidationReport {
                    is_valid: true,
                    errors: Vec::new(),
                    warnings: vec![ValidationIssue::new("geographic_distance", "long hop", Some(1))],
                    score: 95,
                },
            }
        }

        fn timing_out() -> Self {
            Self {
                report: ValidationReport::timed_out(5000),
            }
        }
    }

    #[async_trait]
    impl ValidationEngine for StubValidation {
        async fn validate_itinerary(
            &self,
            _itinerary: &ItinerarySummary,
            _preferences: Option<&TripPreferences>,
        ) -> ValidationReport {
            self.report.clone()
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.contract.signing_key = SecretString::new("unit-test-key".to_string());
        config
    }

    fn preferences() -> TripPreferences {
        TripPreferences {
            budget: 5_000_000.0,
            days: 3,
            travelers: 2,
            accommodation_type: AccommodationTier::Moderate,
            cities: vec!["Bandung".to_string()],
            interests: vec!["culture".to_string(), "food".to_string()],
            themes: Vec::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            constraints: None,
        }
    }

    fn request() -> GuaranteeRequest {
        GuaranteeRequest::new(UserId::new("traveler-1").unwrap(), preferences())
    }

    fn orchestrator(
        profile_source: Arc<dyn UserProfileSource>,
        generator: Arc<dyn ItineraryGenerator>,
        validation: StubValidation,
    ) -> BaapOrchestrator {
        BaapOrchestrator::new(profile_source, generator, Arc::new(validation), &config()).unwrap()
    }

    #[test]
    fn construction_requires_a_signing_key() {
        let result = BaapOrchestrator::new(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            Arc::new(StubValidation::passing()),
            &AppConfig::default(),
        );
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn completed_run_lists_every_stage() {
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::passing(),
        );

        let response = orchestrator.handle(request()).await;

        assert!(response.success, "errors: {:?}", response.errors);
        assert!(response.contract.is_some());
        assert_eq!(
            response.metadata.engines_used,
            vec![
                "profile_source",
                "itinerary_generator",
                "validation_engine",
                "adherence_prediction",
                "plan_optimization",
                "risk_assessment",
                "contingency_planning",
                "contract_generator",
            ]
        );
        assert!(response
            .warnings
            .iter()
            .any(|w| w.starts_with("Itinerary geographic_distance")));
    }

    #[tokio::test]
    async fn supplied_itinerary_skips_generation() {
        let generator = Arc::new(CountingGenerator::new());
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            generator.clone(),
            StubValidation::passing(),
        );
        let itinerary = TemplateItineraryGenerator::default()
            .generate_itinerary(&preferences())
            .await
            .unwrap();

        let response = orchestrator.handle(request().with_itinerary(itinerary)).await;

        assert!(response.success);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert!(!response
            .metadata
            .engines_used
            .contains(&"itinerary_generator".to_string()));
    }

    #[tokio::test]
    async fn profile_source_failure_is_reported_not_raised() {
        let orchestrator = orchestrator(
            Arc::new(FailingProfileSource),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::passing(),
        );

        let response = orchestrator.handle(request()).await;

        assert!(!response.success);
        assert!(response.contract.is_none());
        assert!(response.components.is_none());
        assert_eq!(response.summary, GuaranteeSummary::default());
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].contains("connection refused"));
        assert!(response.metadata.engines_used.is_empty());
    }

    #[tokio::test]
    async fn validation_timeout_aborts_the_run() {
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::timing_out(),
        );

        let response = orchestrator.handle(request()).await;

        assert!(!response.success);
        assert!(response.errors[0].starts_with("Itinerary failed validation"));
        assert!(response.errors[0].contains("5000 ms"));
    }

    #[tokio::test]
    async fn rejected_preferences_surface_generator_errors() {
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::passing(),
        );
        let mut request = request();
        request.preferences.cities.clear();

        let response = orchestrator.handle(request).await;

        assert!(!response.success);
        assert!(response.errors[0].contains("at least one city"));
    }

    #[tokio::test]
    async fn request_target_overrides_configured_default() {
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::passing(),
        );

        let response = orchestrator.handle(request().with_target(0.5)).await;

        let contract = response.contract.unwrap();
        assert_eq!(contract.performance.adherence_target, 0.5);
        assert!(response.summary.adherence_guarantee <= 0.5);
    }

    #[tokio::test]
    async fn countersigning_requires_an_untampered_contract() {
        let orchestrator = orchestrator(
            Arc::new(InMemoryProfileSource::new()),
            Arc::new(TemplateItineraryGenerator::default()),
            StubValidation::passing(),
        );
        let contract = orchestrator.handle(request()).await.contract.unwrap();

        let signed = orchestrator.sign_contract(&contract, "traveler-1").unwrap();
        assert!(signed.is_customer_signed());
        assert_eq!(orchestrator.contract_status(&signed), ContractStatus::Active);
        assert_eq!(orchestrator.contract_status(&contract), ContractStatus::PendingSignature);

        let mut tampered = contract.clone();
        tampered.plan.buffer_amount += 1.0;
        assert!(matches!(
            orchestrator.sign_contract(&tampered, "traveler-1"),
            Err(ContractError::InvalidSignature)
        ));
    }
}
