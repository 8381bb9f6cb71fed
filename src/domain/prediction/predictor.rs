//! AdherencePredictor - rule-based scoring of a budget/itinerary/profile triple.

use tracing::debug;

use crate::domain::foundation::{BudgetCategory, Probability};
use crate::domain::trip::{BudgetBreakdown, HistoricalTrip, ItinerarySummary, UserProfile};

use super::values::{
    AdherencePrediction, AdherenceRisk, ImpactTier, Recommendation, RecommendationKind,
    ScoreBreakdown,
};
use super::weights::{MarketCalendar, PredictionWeights, MAX_SUCCESS_PROBABILITY};

const NEUTRAL_SCORE: f64 = 0.5;
const RECOMMENDATION_THRESHOLD: f64 = 0.85;
const RECOMMENDATION_TARGET: f64 = 0.95;
const CATEGORY_SHARE_LIMIT: f64 = 0.30;
const HIGH_SPONTANEITY: f64 = 0.7;
const RECENT_TRIPS: usize = 3;

const MIN_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

/// Stateless predictor holding its scoring configuration.
#[derive(Debug, Clone, Default)]
pub struct AdherencePredictor {
    weights: PredictionWeights,
    calendar: MarketCalendar,
}

impl AdherencePredictor {
    pub fn new(weights: PredictionWeights, calendar: MarketCalendar) -> Self {
        Self { weights, calendar }
    }

    pub fn weights(&self) -> &PredictionWeights {
        &self.weights
    }

    /// Scores the plan. Identical inputs always produce identical output.
    pub fn predict(
        &self,
        budget: &BudgetBreakdown,
        profile: Option<&UserProfile>,
        itinerary: &ItinerarySummary,
        history: Option<&[HistoricalTrip]>,
    ) -> AdherencePrediction {
        let history = history.filter(|h| !h.is_empty());

        let breakdown = ScoreBreakdown {
            user_behavior: user_behavior_score(profile, budget, itinerary),
            plan_complexity: plan_complexity_score(itinerary, budget),
            market_conditions: market_conditions_score(itinerary, &self.calendar),
            historical_performance: historical_performance_score(history),
        };

        let probability = combine(&self.weights, &breakdown);
        let risk_factors = self.extract_risks(&breakdown, profile, itinerary, history.is_some());
        let recommendations = recommendations(probability, budget, profile);
        let high_impact = risk_factors
            .iter()
            .filter(|r| r.impact == ImpactTier::High)
            .count();
        let confidence = confidence(profile.is_some(), history.is_some(), high_impact, itinerary);

        debug!(
            probability,
            confidence,
            risks = risk_factors.len(),
            "Adherence prediction computed"
        );

        AdherencePrediction {
            success_probability: Probability::new(probability),
            confidence: Probability::new(confidence),
            breakdown,
            risk_factors,
            recommendations,
        }
    }

    fn extract_risks(
        &self,
        breakdown: &ScoreBreakdown,
        profile: Option<&UserProfile>,
        itinerary: &ItinerarySummary,
        has_history: bool,
    ) -> Vec<AdherenceRisk> {
        let mut risks = Vec::new();

        if let Some(profile) = profile {
            if breakdown.user_behavior < 0.6 {
                risks.push(risk(
                    "High price sensitivity mismatch",
                    ImpactTier::High,
                    0.8,
                    "Pre-book fixed-price activities and set a daily discretionary cap",
                    Some(BudgetCategory::Activities),
                ));
            }
            if profile.spontaneity_score > HIGH_SPONTANEITY {
                risks.push(risk(
                    "Spontaneous spending tendency",
                    ImpactTier::Medium,
                    0.6,
                    "Keep an unplanned-spend allowance and log purchases as they happen",
                    Some(BudgetCategory::Miscellaneous),
                ));
            }
        }

        if itinerary.day_count() > 10 {
            risks.push(risk(
                "Extended trip duration",
                ImpactTier::Medium,
                0.5,
                "Review cumulative spend at the end of every third day",
                Some(BudgetCategory::Food),
            ));
        }

        if itinerary.cities().len() > 3 {
            risks.push(risk(
                "Multi-city transfers",
                ImpactTier::Medium,
                0.5,
                "Book intercity legs in advance to lock in fares",
                Some(BudgetCategory::Transportation),
            ));
        }

        if itinerary
            .start_month()
            .is_some_and(|m| self.calendar.is_peak(m))
        {
            risks.push(risk(
                "Peak season pricing",
                ImpactTier::High,
                0.7,
                "Reserve accommodation early and prefer refundable rates",
                Some(BudgetCategory::Accommodation),
            ));
        }

        if has_history && breakdown.historical_performance < 0.6 {
            risks.push(risk(
                "Weak historical budget adherence",
                ImpactTier::High,
                0.7,
                "Enable daily spend alerts and review past overspend categories",
                None,
            ));
        }

        risks.sort_by(|a, b| {
            b.impact.cmp(&a.impact).then(
                b.probability
                    .value()
                    .total_cmp(&a.probability.value()),
            )
        });
        risks
    }
}

fn risk(
    factor: &str,
    impact: ImpactTier,
    probability: f64,
    mitigation: &str,
    category: Option<BudgetCategory>,
) -> AdherenceRisk {
    AdherenceRisk {
        factor: factor.to_string(),
        impact,
        probability: Probability::new(probability),
        mitigation: Some(mitigation.to_string()),
        category,
    }
}

/// Weighted sum of the sub-scores, capped below certainty.
pub(crate) fn combine(weights: &PredictionWeights, breakdown: &ScoreBreakdown) -> f64 {
    let raw = weights.user_behavior * breakdown.user_behavior
        + weights.plan_complexity * breakdown.plan_complexity
        + weights.market_conditions * breakdown.market_conditions
        + weights.historical_performance * breakdown.historical_performance;
    raw.clamp(0.0, MAX_SUCCESS_PROBABILITY)
}

pub(crate) fn user_behavior_score(
    profile: Option<&UserProfile>,
    budget: &BudgetBreakdown,
    itinerary: &ItinerarySummary,
) -> f64 {
    let Some(profile) = profile else {
        return NEUTRAL_SCORE;
    };

    let balance = 1.0 - 2.0 * (profile.activity_preference - 0.5).abs();
    let score = 0.5
        + 0.3 * (1.0 - profile.price_sensitivity)
        + 0.2 * profile.risk_tolerance
        - 0.2 * profile.spontaneity_score
        + 0.1 * balance
        + 0.2 * budget_alignment(profile, budget, itinerary);
    score.clamp(0.0, 1.0)
}

/// Step function comparing per-day budget against the preferred spend range.
pub(crate) fn budget_alignment(
    profile: &UserProfile,
    budget: &BudgetBreakdown,
    itinerary: &ItinerarySummary,
) -> f64 {
    let Some(range) = profile.preferred_daily_spend else {
        return NEUTRAL_SCORE;
    };
    let days = itinerary.day_count().max(1) as f64;
    let per_day = budget.total_budget / days;

    if range.contains(per_day) {
        0.8
    } else if per_day > range.max && per_day <= range.max * 1.5 {
        0.6
    } else if per_day < range.min && per_day >= range.min * 0.5 {
        0.4
    } else {
        0.2
    }
}

pub(crate) fn plan_complexity_score(itinerary: &ItinerarySummary, budget: &BudgetBreakdown) -> f64 {
    let days = itinerary.day_count();
    let destinations = itinerary.destination_count();
    let cities = itinerary.cities().len();

    let thresholds = [
        days > 7,
        days > 14,
        destinations > 10,
        destinations > 20,
        cities > 3,
        cities > 5,
        budget.categories.coefficient_of_variation() > 0.5,
    ];
    let crossed = thresholds.iter().filter(|t| **t).count() as f64;
    (1.0 - 0.1 * crossed).max(0.3)
}

pub(crate) fn market_conditions_score(itinerary: &ItinerarySummary, calendar: &MarketCalendar) -> f64 {
    let mut score: f64 = 0.8;
    if let Some(month) = itinerary.start_month() {
        if calendar.is_peak(month) {
            score -= 0.1;
        } else if calendar.is_shoulder(month) {
            score -= 0.05;
        }
    }
    if itinerary
        .destinations()
        .any(|d| calendar.is_expensive_city(&d.location.city))
    {
        score -= 0.1;
    }
    score.max(0.5)
}

pub(crate) fn historical_performance_score(history: Option<&[HistoricalTrip]>) -> f64 {
    let Some(history) = history.filter(|h| !h.is_empty()) else {
        return NEUTRAL_SCORE;
    };

    let mut trips: Vec<&HistoricalTrip> = history.iter().collect();
    trips.sort_by_key(|t| t.ended_on);

    let overall = mean(trips.iter().map(|t| t.adherence));
    let recent = mean(trips.iter().rev().take(RECENT_TRIPS).map(|t| t.adherence));
    (0.6 * overall + 0.4 * recent).clamp(0.0, 1.0)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn recommendations(
    probability: f64,
    budget: &BudgetBreakdown,
    profile: Option<&UserProfile>,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if probability < RECOMMENDATION_THRESHOLD {
        let increase = ((RECOMMENDATION_TARGET - probability) * budget.total_budget).ceil();
        out.push(Recommendation {
            kind: RecommendationKind::IncreaseBudget,
            description: format!(
                "Increase total budget by {:.0} {} to reach a 95% adherence target",
                increase, budget.currency
            ),
            amount: Some(increase),
            category: None,
            expected_improvement: RECOMMENDATION_TARGET - probability,
        });
    }

    for (category, amount) in budget.categories.iter() {
        if budget.share(category) > CATEGORY_SHARE_LIMIT {
            out.push(Recommendation {
                kind: RecommendationKind::ReduceCategory,
                description: format!(
                    "{} takes {:.0}% of the budget; reduce it by 10-15%",
                    category,
                    budget.share(category) * 100.0
                ),
                amount: Some(amount * 0.15),
                category: Some(category),
                expected_improvement: 0.02,
            });
        }
    }

    if profile.is_some_and(|p| p.spontaneity_score > HIGH_SPONTANEITY) {
        out.push(Recommendation {
            kind: RecommendationKind::TrackExpenses,
            description: "Track expenses in real time to contain impulse purchases".to_string(),
            amount: None,
            category: None,
            expected_improvement: 0.05,
        });
    }

    out
}

fn confidence(
    has_profile: bool,
    has_history: bool,
    high_impact_risks: usize,
    itinerary: &ItinerarySummary,
) -> f64 {
    let mut confidence = 0.8;
    if !has_profile {
        confidence -= 0.2;
    }
    if !has_history {
        confidence -= 0.1;
    }
    confidence -= 0.05 * high_impact_risks as f64;
    if itinerary.day_count() <= 7 && itinerary.cities().len() <= 2 {
        confidence += 0.1;
    }
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
