//! Adherence Prediction - probability that a traveler stays within budget.
//!
//! Pure, deterministic scoring. Four sub-scores (user behavior, plan
//! complexity, market conditions, historical performance) are combined with
//! an explicit [`PredictionWeights`] table; the result is capped below
//! certainty.

mod predictor;
mod values;
mod weights;

pub use predictor::AdherencePredictor;
pub use values::{
    AdherencePrediction, AdherenceRisk, ImpactTier, Recommendation, RecommendationKind,
    ScoreBreakdown,
};
pub use weights::{MarketCalendar, PredictionWeights, MAX_SUCCESS_PROBABILITY};
