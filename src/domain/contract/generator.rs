//! ContractGenerator - assembles, signs and verifies travel contracts.

use std::sync::atomic::{AtomicU64, Ordering};

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::info;

use crate::domain::contingency::ContingencyPlanningResult;
use crate::domain::foundation::{ContractId, Timestamp, UserId};
use crate::domain::optimization::OptimizedPlan;
use crate::domain::prediction::AdherencePrediction;
use crate::domain::risk::RiskAssessment;
use crate::domain::trip::UserProfile;

use super::errors::ContractError;
use super::values::{
    ContingencySection, ContractTerms, CustomerParty, GuaranteeSection, LegalTerms, Parties,
    PerformanceSnapshot, PlanSection, ProviderTerms, RiskManagementSection, Signature, Signatures,
    TravelContract,
};

type HmacSha256 = Hmac<Sha256>;

const TOP_RISKS: usize = 5;
const HIGH_SPONTANEITY: f64 = 0.7;

/// Upstream outputs a contract is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct ContractInputs<'a> {
    pub customer: &'a UserId,
    pub profile: Option<&'a UserProfile>,
    pub plan: &'a OptimizedPlan,
    pub prediction: &'a AdherencePrediction,
    pub assessment: &'a RiskAssessment,
    pub contingency: &'a ContingencyPlanningResult,
}

/// Builds contracts and signs them on behalf of the provider.
///
/// Contract ids combine the generation instant with a per-generator counter
/// so two contracts built in the same millisecond stay distinguishable.
pub struct ContractGenerator {
    provider_name: String,
    signing_key: SecretString,
    sequence: AtomicU64,
}

impl ContractGenerator {
    pub fn new(provider_name: impl Into<String>, signing_key: SecretString) -> Self {
        Self {
            provider_name: provider_name.into(),
            signing_key,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn generate(&self, inputs: ContractInputs<'_>, terms: &ContractTerms) -> Result<TravelContract, ContractError> {
        self.generate_at(inputs, terms, Timestamp::now())
    }

    /// Same as [`generate`](Self::generate) with an explicit generation instant.
    pub fn generate_at(
        &self,
        inputs: ContractInputs<'_>,
        terms: &ContractTerms,
        generated_at: Timestamp,
    ) -> Result<TravelContract, ContractError> {
        validate_terms(terms)?;

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let contract_id = ContractId::from_parts(generated_at.as_unix_millis(), sequence);
        let plan = inputs.plan;
        let total_budget = plan.budget.total_budget;
        let level = plan.guaranteed_adherence.value();

        let mut contract = TravelContract {
            contract_id,
            generated_at,
            valid_until: generated_at.add_days(i64::from(terms.validity_days)),
            parties: Parties {
                provider: ProviderTerms {
                    name: self.provider_name.clone(),
                    obligations: vec![
                        "Deliver the optimized itinerary and budget as contracted".to_string(),
                        "Run the monitoring schedule and notify on every trigger".to_string(),
                        "Fund listed contingencies up to the reserved amounts".to_string(),
                    ],
                    service_fee: terms.service_fee,
                    guarantee_premium: total_budget * terms.guarantee_premium_rate,
                },
                customer: CustomerParty {
                    user_id: inputs.customer.clone(),
                    obligations: customer_obligations(inputs.profile),
                },
            },
            guarantee: GuaranteeSection {
                level,
                coverage: format!(
                    "{:.1}% probability that total spend stays within {:.0} {}",
                    level * 100.0,
                    total_budget,
                    plan.budget.currency
                ),
                conditions: plan.guarantee.conditions.clone(),
                exclusions: exclusions(),
                claim_process: claim_process(),
            },
            plan: PlanSection {
                itinerary: plan.itinerary.clone(),
                budget: plan.budget.clone(),
                buffer_amount: plan.buffer_amount,
                adherence: plan.final_prediction.success_probability.value(),
                confidence: plan.final_prediction.confidence.value(),
            },
            risk_management: RiskManagementSection {
                risk_level: inputs.assessment.risk_level,
                overall_risk_score: inputs.assessment.overall_risk_score,
                top_risks: inputs
                    .assessment
                    .ranked()
                    .into_iter()
                    .take(TOP_RISKS)
                    .cloned()
                    .collect(),
                critical_failure_points: inputs.assessment.critical_failure_points.clone(),
                monitoring_schedule: inputs.assessment.monitoring_schedule.clone(),
            },
            tactical_suggestions: plan.tactical_suggestions.clone(),
            contingencies: ContingencySection {
                primary: inputs.contingency.primary.clone(),
                emergency_protocols: inputs.contingency.emergency_protocols.clone(),
                reserves: inputs.contingency.resources,
            },
            legal: LegalTerms {
                refund_policy: terms.refund_policy.clone(),
                liability_cap: total_budget * terms.guarantee_premium_rate + terms.service_fee,
                governing_law: "Republic of Indonesia".to_string(),
                dispute_resolution: "Mediation first, then arbitration in Jakarta".to_string(),
                amendments: "Changes require a new contract signed by both parties".to_string(),
            },
            performance: PerformanceSnapshot {
                initial_adherence: inputs.prediction.success_probability.value(),
                current_adherence: plan.final_prediction.success_probability.value(),
                adherence_target: terms.guarantee_level,
                optimizations_applied: plan.optimizations.len(),
                projected_savings: plan.total_savings(),
                overall_risk_score: inputs.assessment.overall_risk_score,
            },
            signatures: Signatures {
                provider: Signature {
                    signer: self.provider_name.clone(),
                    value: String::new(),
                    signed_at: generated_at,
                },
                customer: None,
            },
        };

        contract.signatures.provider.value = self.provider_signature(&contract)?;

        info!(
            contract_id = %contract.contract_id,
            user_id = %inputs.customer,
            level,
            "Travel contract generated"
        );

        Ok(contract)
    }

    /// Recomputes the provider HMAC and compares it in constant time.
    pub fn verify_provider_signature(&self, contract: &TravelContract) -> Result<(), ContractError> {
        let expected = self.provider_signature(contract)?;
        let actual = contract.signatures.provider.value.as_bytes();
        if expected.len() != actual.len() || !bool::from(expected.as_bytes().ct_eq(actual)) {
            return Err(ContractError::InvalidSignature);
        }
        Ok(())
    }

    fn provider_signature(&self, contract: &TravelContract) -> Result<String, ContractError> {
        let body = signing_payload(contract)?;
        let mut mac = HmacSha256::new_from_slice(self.signing_key.expose_secret().as_bytes())
            .map_err(|e| ContractError::SigningKey(e.to_string()))?;
        mac.update(&body);
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }
}

/// Contract body without the signatures block, as canonical JSON.
fn signing_payload(contract: &TravelContract) -> Result<Vec<u8>, ContractError> {
    let mut value = serde_json::to_value(contract)?;
    if let Some(fields) = value.as_object_mut() {
        fields.remove("signatures");
    }
    Ok(serde_json::to_vec(&value)?)
}

/// Returns a new contract carrying the customer's signature.
pub fn sign(contract: &TravelContract, signature: &str, signed_at: Timestamp) -> Result<TravelContract, ContractError> {
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(ContractError::EmptySignature);
    }
    if contract.is_customer_signed() {
        return Err(ContractError::AlreadySigned(contract.contract_id.to_string()));
    }

    let mut signed = contract.clone();
    signed.signatures.customer = Some(Signature {
        signer: contract.parties.customer.user_id.to_string(),
        value: signature.to_string(),
        signed_at,
    });
    Ok(signed)
}

fn validate_terms(terms: &ContractTerms) -> Result<(), ContractError> {
    if terms.validity_days == 0 {
        return Err(ContractError::InvalidTerms("validity_days must be at least 1".to_string()));
    }
    if !(0.0..=1.0).contains(&terms.guarantee_level) {
        return Err(ContractError::InvalidTerms(format!(
            "guarantee_level must be within [0, 1], got {}",
            terms.guarantee_level
        )));
    }
    if terms.service_fee < 0.0 || terms.guarantee_premium_rate < 0.0 {
        return Err(ContractError::InvalidTerms("fees must be non-negative".to_string()));
    }
    Ok(())
}

fn customer_obligations(profile: Option<&UserProfile>) -> Vec<String> {
    let mut obligations = vec![
        "Follow the contracted itinerary".to_string(),
        "Log expenses at least once per day".to_string(),
        "Report contingency triggers within 24 hours".to_string(),
    ];
    if profile.is_some_and(|p| p.spontaneity_score > HIGH_SPONTANEITY) {
        obligations.push("Record every unplanned purchase as it happens".to_string());
    }
    obligations
}

fn exclusions() -> Vec<String> {
    [
        "Force majeure events including natural disasters and civil unrest",
        "Spending outside the contracted itinerary",
        "Changes made by the customer without provider approval",
        "Medical costs covered by travel insurance",
        "Exchange rate movements above 10%",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn claim_process() -> Vec<String> {
    [
        "Submit the expense log and receipts within 14 days of trip end",
        "Provider reviews adherence to the guarantee conditions",
        "Approved claims are refunded within 30 days",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contingency::ContingencyPlanner;
    use crate::domain::contract::{status_at, validate_contract, ContractStatus};
    use crate::domain::optimization::{OptimizationConstraints, OptimizerSettings, PlanOptimizer};
    use crate::domain::prediction::AdherencePredictor;
    use crate::domain::risk::RiskAssessor;
    use crate::domain::trip::{
        Accommodation, AccommodationTier, AllocationRatios, BudgetBreakdown, Day, Destination,
        ItinerarySummary, Location,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    struct Fixture {
        user: UserId,
        plan: OptimizedPlan,
        prediction: AdherencePrediction,
        assessment: RiskAssessment,
        contingency: ContingencyPlanningResult,
    }

    impl Fixture {
        fn inputs(&self) -> ContractInputs<'_> {
            ContractInputs {
                customer: &self.user,
                profile: None,
                plan: &self.plan,
                prediction: &self.prediction,
                assessment: &self.assessment,
                contingency: &self.contingency,
            }
        }
    }

    fn fixture() -> Fixture {
        let days = (1..=3)
            .map(|i| {
                Day::new(
                    i,
                    NaiveDate::from_ymd_opt(2025, 3, i).unwrap(),
                    vec![Destination {
                        id: format!("d{}", i),
                        name: "Gedung Sate".to_string(),
                        category: "culture".to_string(),
                        location: Location::city("Bandung"),
                        scheduled_time: None,
                        duration_minutes: 90,
                        estimated_cost: 50_000.0,
                        rating: 4.6,
                        tags: Vec::new(),
                    }],
                    Some(Accommodation {
                        name: "Hotel Braga".to_string(),
                        tier: AccommodationTier::Moderate,
                        cost: 400_000.0,
                    }),
                    None,
                )
            })
            .collect();
        let itinerary = ItinerarySummary::new(days);
        let budget = BudgetBreakdown::from_total(5_000_000.0, &AllocationRatios::default(), "IDR");
        let predictor = AdherencePredictor::default();
        let prediction = predictor.predict(&budget, None, &itinerary, None);
        let plan = PlanOptimizer::new(predictor, OptimizerSettings::default())
            .optimize(&itinerary, &budget, &prediction, None, &OptimizationConstraints::default())
            .unwrap();
        let assessment = RiskAssessor::default().assess(&plan.itinerary, &plan.budget, None, &prediction, None);
        let contingency = ContingencyPlanner::new().plan(&plan.itinerary, &plan.budget, &assessment, None, None);
        Fixture {
            user: UserId::new("traveler-1").unwrap(),
            plan,
            prediction,
            assessment,
            contingency,
        }
    }

    fn generator() -> ContractGenerator {
        ContractGenerator::new("BaaP Travel", SecretString::new("test-signing-key".to_string()))
    }

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn ids_are_sequenced() {
        let f = fixture();
        let gen = generator();
        let now = at(2025, 1, 10);
        let a = gen.generate_at(f.inputs(), &ContractTerms::default(), now).unwrap();
        let b = gen.generate_at(f.inputs(), &ContractTerms::default(), now).unwrap();

        let millis = now.as_unix_millis();
        assert_eq!(a.contract_id.as_str(), format!("BaaP-{}-000001", millis));
        assert_eq!(b.contract_id.as_str(), format!("BaaP-{}-000002", millis));
    }

    #[test]
    fn sections_come_from_upstream() {
        let f = fixture();
        let contract = generator()
            .generate_at(f.inputs(), &ContractTerms::default(), at(2025, 1, 10))
            .unwrap();

        assert_eq!(contract.plan.itinerary, f.plan.itinerary);
        assert_eq!(contract.tactical_suggestions, f.plan.tactical_suggestions);
        assert_eq!(contract.contingencies.primary, f.contingency.primary);
        assert!(contract.risk_management.top_risks.len() <= 5);
        assert_eq!(contract.guarantee.level, f.plan.guaranteed_adherence.value());
        assert!((contract.parties.provider.guarantee_premium - f.plan.budget.total_budget * 0.02).abs() < 1e-6);
        assert_eq!(contract.valid_until, at(2025, 2, 9));
    }

    #[test]
    fn provider_signature_verifies_and_detects_tampering() {
        let f = fixture();
        let gen = generator();
        let contract = gen.generate_at(f.inputs(), &ContractTerms::default(), at(2025, 1, 10)).unwrap();
        assert_eq!(contract.signatures.provider.value.len(), 64);
        assert!(gen.verify_provider_signature(&contract).is_ok());

        let mut tampered = contract.clone();
        tampered.guarantee.level = 0.99;
        assert!(matches!(
            gen.verify_provider_signature(&tampered),
            Err(ContractError::InvalidSignature)
        ));

        let other = ContractGenerator::new("BaaP Travel", SecretString::new("other-key".to_string()));
        assert!(other.verify_provider_signature(&contract).is_err());
    }

    #[test]
    fn signing_returns_a_new_contract() {
        let f = fixture();
        let gen = generator();
        let contract = gen.generate_at(f.inputs(), &ContractTerms::default(), at(2025, 1, 10)).unwrap();
        let signed = sign(&contract, "Traveler One", at(2025, 1, 11)).unwrap();

        assert!(!contract.is_customer_signed());
        assert!(signed.is_customer_signed());
        assert_eq!(signed.signatures.customer.as_ref().unwrap().signer, "traveler-1");
        // customer signature does not disturb the provider's
        assert!(gen.verify_provider_signature(&signed).is_ok());

        assert!(matches!(sign(&signed, "again", at(2025, 1, 12)), Err(ContractError::AlreadySigned(_))));
        assert!(matches!(sign(&contract, "  ", at(2025, 1, 12)), Err(ContractError::EmptySignature)));
    }

    #[test]
    fn status_follows_signature_and_expiry() {
        let f = fixture();
        let contract = generator()
            .generate_at(f.inputs(), &ContractTerms::default(), at(2025, 1, 10))
            .unwrap();
        let signed = sign(&contract, "Traveler One", at(2025, 1, 11)).unwrap();

        assert_eq!(status_at(&contract, at(2025, 1, 15)), ContractStatus::PendingSignature);
        assert_eq!(status_at(&signed, at(2025, 1, 15)), ContractStatus::Active);
        assert_eq!(status_at(&contract, at(2025, 3, 1)), ContractStatus::Expired);
        assert_eq!(status_at(&signed, at(2025, 3, 1)), ContractStatus::Expired);
    }

    #[test]
    fn validation_flags_unmet_target() {
        let f = fixture();
        let contract = generator()
            .generate_at(f.inputs(), &ContractTerms::default(), at(2025, 1, 10))
            .unwrap();
        let validation = validate_contract(&contract);

        // no profile caps the prediction well below a 95% target
        assert!(!validation.is_valid);
        assert!(validation.errors.iter().any(|e| e.contains("target")));
    }

    #[test]
    fn validation_passes_consistent_contract() {
        let f = fixture();
        let terms = ContractTerms {
            guarantee_level: 0.5,
            ..Default::default()
        };
        let mut contract = generator().generate_at(f.inputs(), &terms, at(2025, 1, 10)).unwrap();
        contract.guarantee.level = 0.92;

        let validation = validate_contract(&contract);
        assert!(validation.is_valid, "{:?}", validation.errors);
    }

    #[test]
    fn zero_validity_is_rejected() {
        let f = fixture();
        let terms = ContractTerms {
            validity_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            generator().generate_at(f.inputs(), &terms, at(2025, 1, 10)),
            Err(ContractError::InvalidTerms(_))
        ));
    }
}
