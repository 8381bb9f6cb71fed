//! PlanOptimizer - budget, reallocation and itinerary steps plus re-scoring.

use tracing::{debug, info};

use crate::domain::foundation::{BudgetCategory, Probability};
use crate::domain::prediction::{AdherencePrediction, AdherencePredictor};
use crate::domain::trip::{BudgetBreakdown, ChangeFlags, Day, ItinerarySummary, UserProfile};

use super::errors::OptimizationError;
use super::tactical::suggest_tactics;
use super::values::{Guarantee, OptimizationConstraints, Optimization, OptimizationKind, OptimizedPlan};

const BUDGET_GAP_MULTIPLIER: f64 = 1.5;
const BUDGET_IMPACT_FACTOR: f64 = 0.8;

const REALLOCATION_CATEGORY_SHARE: f64 = 0.10;
const REALLOCATION_TOTAL_CAP: f64 = 0.05;
const REALLOCATION_IMPACT: f64 = 0.02;

const TRANSPORT_TRIGGER: f64 = 1.2;
const TRANSPORT_MAX_SAVING: f64 = 0.30;
const TRANSPORT_IMPACT: f64 = 0.03;

const ACCOMMODATION_TRIGGER: f64 = 1.3;
const ACCOMMODATION_MAX_SAVING: f64 = 0.20;
const ACCOMMODATION_IMPACT: f64 = 0.04;

const ACTIVITY_TRIGGER: f64 = 1.2;
const ACTIVITY_MAX_TRIM: f64 = 0.50;
const ACTIVITY_FLOOR: f64 = 0.80;
const ACTIVITY_IMPACT: f64 = 0.02;

const MAX_BUFFER_SHARE: f64 = 0.15;

/// Tunables that are not part of the per-call constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    /// Fraction of the total that category allocations may exceed it by.
    pub budget_tolerance: f64,
    /// Per-day food allocation above which local eateries are suggested.
    pub high_daily_food_budget: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            budget_tolerance: 0.05,
            high_daily_food_budget: 300_000.0,
        }
    }
}

/// Runs the optimization pass. Holds the predictor it re-scores with.
#[derive(Debug, Clone)]
pub struct PlanOptimizer {
    predictor: AdherencePredictor,
    settings: OptimizerSettings,
}

impl PlanOptimizer {
    pub fn new(predictor: AdherencePredictor, settings: OptimizerSettings) -> Self {
        Self { predictor, settings }
    }

    pub fn optimize(
        &self,
        itinerary: &ItinerarySummary,
        budget: &BudgetBreakdown,
        prediction: &AdherencePrediction,
        profile: Option<&UserProfile>,
        constraints: &OptimizationConstraints,
    ) -> Result<OptimizedPlan, OptimizationError> {
        validate_constraints(constraints)?;
        budget.validate(self.settings.budget_tolerance)?;
        if itinerary.is_empty() {
            return Err(OptimizationError::EmptyItinerary);
        }

        let target = constraints.min_adherence_target;
        let current = prediction.success_probability.value();
        let flags = constraints.change_flags;

        let mut pass = Pass {
            budget: budget.clone(),
            itinerary: itinerary.clone(),
            projected: current,
            optimizations: Vec::new(),
        };

        if pass.projected < target && flags.allow_budget_increase {
            pass.increase_budget(current, target, constraints.max_budget_increase);
        }
        pass.reallocate(prediction);
        pass.adjust_itinerary(&flags);

        let tactical_suggestions = suggest_tactics(&pass.itinerary, &pass.budget, &self.settings);

        let history = profile.map(|p| p.historical_trips.as_slice());
        let final_prediction = self
            .predictor
            .predict(&pass.budget, profile, &pass.itinerary, history);
        let final_probability = final_prediction.success_probability.value();
        let guaranteed = final_probability.min(target);
        let success = guaranteed >= target;

        let gap = target - final_probability;
        let buffer_amount = if gap > 0.0 {
            pass.budget.total_budget * (2.0 * gap).min(MAX_BUFFER_SHARE)
        } else {
            0.0
        };

        info!(
            current,
            final_probability,
            target,
            success,
            applied = pass.optimizations.len(),
            "Plan optimization finished"
        );

        let guarantee = guarantee_terms(guaranteed, &pass.budget, pass.itinerary.day_count());

        Ok(OptimizedPlan {
            success,
            guaranteed_adherence: Probability::new(guaranteed),
            projected_adherence: pass.projected,
            itinerary: pass.itinerary,
            budget: pass.budget,
            buffer_amount,
            optimizations: pass.optimizations,
            tactical_suggestions,
            guarantee,
            final_prediction,
        })
    }
}

fn validate_constraints(constraints: &OptimizationConstraints) -> Result<(), OptimizationError> {
    if !(0.0..=1.0).contains(&constraints.min_adherence_target) {
        return Err(OptimizationError::InvalidConstraints(format!(
            "min_adherence_target must be within [0, 1], got {}",
            constraints.min_adherence_target
        )));
    }
    if constraints.max_budget_increase < 0.0 || !constraints.max_budget_increase.is_finite() {
        return Err(OptimizationError::InvalidConstraints(format!(
            "max_budget_increase must be non-negative, got {}",
            constraints.max_budget_increase
        )));
    }
    Ok(())
}

/// Working state of one optimization pass.
struct Pass {
    budget: BudgetBreakdown,
    itinerary: ItinerarySummary,
    projected: f64,
    optimizations: Vec<Optimization>,
}

impl Pass {
    fn record(&mut self, optimization: Optimization) {
        self.projected += optimization.adherence_impact;
        self.optimizations.push(optimization);
    }

    fn increase_budget(&mut self, current: f64, target: f64, max_increase: f64) {
        let required = ((target - current) * BUDGET_GAP_MULTIPLIER).max(0.0);
        let applied = required.min(max_increase);
        if applied <= 0.0 {
            return;
        }

        let added = self.budget.total_budget * applied;
        self.budget = self.budget.increased_by(applied);
        debug!(applied, added, "Budget increase applied");

        self.record(Optimization {
            kind: OptimizationKind::BudgetIncrease,
            description: format!(
                "Increase total budget by {:.1}% ({:.0} {}), keeping category ratios",
                applied * 100.0,
                added,
                self.budget.currency
            ),
            adherence_impact: BUDGET_IMPACT_FACTOR * applied,
            cost_delta: added,
            category: None,
            day_index: None,
        });
    }

    fn reallocate(&mut self, prediction: &AdherencePrediction) {
        for category in prediction.high_risk_categories() {
            if category == BudgetCategory::Miscellaneous {
                continue;
            }
            let moved = (self.budget.amount(category) * REALLOCATION_CATEGORY_SHARE)
                .min(self.budget.total_budget * REALLOCATION_TOTAL_CAP);
            if moved <= 0.0 {
                continue;
            }

            let categories = self
                .budget
                .categories
                .with_transfer(category, BudgetCategory::Miscellaneous, moved);
            self.budget = self.budget.with_categories(categories);

            self.record(Optimization {
                kind: OptimizationKind::CategoryReallocation,
                description: format!(
                    "Move {:.0} {} from {} into the miscellaneous buffer",
                    moved, self.budget.currency, category
                ),
                adherence_impact: REALLOCATION_IMPACT,
                cost_delta: 0.0,
                category: Some(category),
                day_index: None,
            });
        }
    }

    fn adjust_itinerary(&mut self, flags: &ChangeFlags) {
        let days = self.itinerary.day_count().max(1) as f64;
        let transport_share = self.budget.amount(BudgetCategory::Transportation) / days;
        let lodging_share = self.budget.amount(BudgetCategory::Accommodation) / days;
        let activity_share = self.budget.amount(BudgetCategory::Activities) / days;

        let mut changes = Vec::new();
        let mut adjusted_days = Vec::with_capacity(self.itinerary.days.len());

        for mut day in std::mem::take(&mut self.itinerary.days) {
            if flags.allow_transport_changes {
                if let Some(change) = substitute_transport(&mut day, transport_share) {
                    changes.push(change);
                }
            }
            if flags.allow_accommodation_changes {
                if let Some(change) = downgrade_accommodation(&mut day, lodging_share) {
                    changes.push(change);
                }
            }
            if flags.allow_activity_changes {
                if let Some(change) = trim_activity(&mut day, activity_share) {
                    changes.push(change);
                }
            }
            adjusted_days.push(day.recomputed());
        }

        self.itinerary = ItinerarySummary::new(adjusted_days);
        for change in changes {
            self.record(change);
        }
    }
}

fn substitute_transport(day: &mut Day, fair_share: f64) -> Option<Optimization> {
    let leg = day.transportation.as_mut()?;
    if leg.cost <= fair_share * TRANSPORT_TRIGGER {
        return None;
    }
    let cheaper = leg.mode.downgrade()?;
    let saving = (leg.cost * TRANSPORT_MAX_SAVING).min(leg.cost - fair_share);
    let previous = leg.mode;
    leg.mode = cheaper;
    leg.cost -= saving;

    Some(Optimization {
        kind: OptimizationKind::TransportSubstitution,
        description: format!(
            "Day {}: replace {} with {}",
            day.day_index,
            previous.label(),
            cheaper.label()
        ),
        adherence_impact: TRANSPORT_IMPACT,
        cost_delta: -saving,
        category: Some(BudgetCategory::Transportation),
        day_index: Some(day.day_index),
    })
}

fn downgrade_accommodation(day: &mut Day, fair_share: f64) -> Option<Optimization> {
    let stay = day.accommodation.as_mut()?;
    if stay.cost <= fair_share * ACCOMMODATION_TRIGGER {
        return None;
    }
    let lower = stay.tier.downgrade()?;
    let saving = (stay.cost * ACCOMMODATION_MAX_SAVING).min(stay.cost - fair_share);
    stay.tier = lower;
    stay.cost -= saving;

    Some(Optimization {
        kind: OptimizationKind::AccommodationDowngrade,
        description: format!(
            "Day {}: move {} down to a {:?} tier room",
            day.day_index, stay.name, lower
        ),
        adherence_impact: ACCOMMODATION_IMPACT,
        cost_delta: -saving,
        category: Some(BudgetCategory::Accommodation),
        day_index: Some(day.day_index),
    })
}

fn trim_activity(day: &mut Day, fair_share: f64) -> Option<Optimization> {
    let spend = day.activity_cost();
    if spend <= fair_share * ACTIVITY_TRIGGER {
        return None;
    }
    let floor = fair_share * ACTIVITY_FLOOR;
    let priciest = day
        .destinations
        .iter_mut()
        .filter(|d| !d.is_food())
        .max_by(|a, b| a.estimated_cost.total_cmp(&b.estimated_cost))?;

    let trim = (priciest.estimated_cost * ACTIVITY_MAX_TRIM).min(spend - floor);
    if trim <= 0.0 {
        return None;
    }
    priciest.estimated_cost -= trim;
    let name = priciest.name.clone();

    Some(Optimization {
        kind: OptimizationKind::ActivityTrim,
        description: format!("Day {}: choose a cheaper option for {}", day.day_index, name),
        adherence_impact: ACTIVITY_IMPACT,
        cost_delta: -trim,
        category: Some(BudgetCategory::Activities),
        day_index: Some(day.day_index),
    })
}

fn guarantee_terms(guaranteed: f64, budget: &BudgetBreakdown, days: usize) -> Guarantee {
    let daily = budget.total_budget / days.max(1) as f64;
    Guarantee {
        coverage_percent: guaranteed * 100.0,
        conditions: vec![
            "Follow the optimized itinerary without adding paid activities".to_string(),
            format!("Keep average daily spend at or below {:.0} {}", daily, budget.currency),
            "Log expenses at least once per day".to_string(),
            "Use the buffer only for listed contingencies".to_string(),
        ],
        fallback_triggers: vec![
            "Daily spend passes 80% of the daily allowance".to_string(),
            "Cumulative spend runs more than 10% over plan".to_string(),
            "A contingency plan is activated".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CategoryAmounts, UserId};
    use crate::domain::prediction::{AdherenceRisk, ImpactTier, ScoreBreakdown};
    use crate::domain::trip::{
        Accommodation, AccommodationTier, AllocationRatios, Destination, Location,
        TransportMode, Transportation,
    };
    use chrono::NaiveDate;

    fn destination(id: &str, cost: f64) -> Destination {
        Destination {
            id: id.to_string(),
            name: id.to_string(),
            category: "sightseeing".to_string(),
            location: Location::city("Bandung"),
            scheduled_time: None,
            duration_minutes: 60,
            estimated_cost: cost,
            rating: 4.0,
            tags: Vec::new(),
        }
    }

    fn day(index: u32, destinations: Vec<Destination>, stay: f64, tier: AccommodationTier, leg: Option<(TransportMode, f64)>) -> Day {
        Day::new(
            index,
            NaiveDate::from_ymd_opt(2025, 3, index).unwrap(),
            destinations,
            Some(Accommodation {
                name: format!("Hotel {}", index),
                tier,
                cost: stay,
            }),
            leg.map(|(mode, cost)| Transportation {
                mode,
                cost,
                duration_minutes: 45,
            }),
        )
    }

    fn cheap_itinerary() -> ItinerarySummary {
        ItinerarySummary::new(
            (1..=3)
                .map(|i| day(i, vec![destination("museum", 50_000.0)], 300_000.0, AccommodationTier::Moderate, None))
                .collect(),
        )
    }

    fn budget() -> BudgetBreakdown {
        BudgetBreakdown::from_total(5_000_000.0, &AllocationRatios::default(), "IDR")
    }

    fn prediction(probability: f64, risks: Vec<AdherenceRisk>) -> AdherencePrediction {
        AdherencePrediction {
            success_probability: Probability::new(probability),
            confidence: Probability::new(0.6),
            breakdown: ScoreBreakdown {
                user_behavior: 0.5,
                plan_complexity: 1.0,
                market_conditions: 0.75,
                historical_performance: 0.5,
            },
            risk_factors: risks,
            recommendations: Vec::new(),
        }
    }

    fn high_risk(category: BudgetCategory) -> AdherenceRisk {
        AdherenceRisk {
            factor: "test".to_string(),
            impact: ImpactTier::High,
            probability: Probability::new(0.8),
            mitigation: None,
            category: Some(category),
        }
    }

    fn optimizer() -> PlanOptimizer {
        PlanOptimizer::new(AdherencePredictor::default(), OptimizerSettings::default())
    }

    #[test]
    fn budget_increase_is_capped_and_proportional() {
        let original = budget();
        let constraints = OptimizationConstraints::default();
        let plan = optimizer()
            .optimize(&cheap_itinerary(), &original, &prediction(0.70, Vec::new()), None, &constraints)
            .unwrap();

        let increase = &plan.optimizations[0];
        assert_eq!(increase.kind, OptimizationKind::BudgetIncrease);
        assert!((increase.cost_delta - 1_000_000.0).abs() < 1e-6);
        assert!((increase.adherence_impact - 0.16).abs() < 1e-9);
        assert!((plan.budget.total_budget - 6_000_000.0).abs() < 1e-6);
        for category in BudgetCategory::all() {
            assert!((plan.budget.share(*category) - original.share(*category)).abs() < 1e-9);
        }
    }

    #[test]
    fn budget_never_exceeds_allowed_increase() {
        let original = budget();
        let constraints = OptimizationConstraints {
            max_budget_increase: 0.05,
            ..Default::default()
        };
        let plan = optimizer()
            .optimize(&cheap_itinerary(), &original, &prediction(0.2, Vec::new()), None, &constraints)
            .unwrap();
        assert!(plan.budget.total_budget <= original.total_budget * 1.05 + 1e-6);
    }

    #[test]
    fn high_risk_categories_feed_the_buffer() {
        let original = budget();
        let constraints = OptimizationConstraints {
            change_flags: ChangeFlags::budget_only(),
            ..Default::default()
        };
        let risks = vec![high_risk(BudgetCategory::Accommodation)];
        let plan = optimizer()
            .optimize(&cheap_itinerary(), &original, &prediction(0.5, risks), None, &constraints)
            .unwrap();

        let realloc = plan
            .optimizations
            .iter()
            .find(|o| o.kind == OptimizationKind::CategoryReallocation)
            .unwrap();
        assert_eq!(realloc.category, Some(BudgetCategory::Accommodation));
        // 10% of 2.1M accommodation = 210k, capped at 5% of 6M = 300k
        let after_increase = 1_750_000.0 * 1.2;
        assert!((plan.budget.amount(BudgetCategory::Accommodation) - after_increase * 0.9).abs() < 1e-6);
        assert!((plan.budget.categories.sum() - plan.budget.total_budget).abs() < 1e-6);
    }

    #[test]
    fn expensive_legs_are_downgraded() {
        let itinerary = ItinerarySummary::new(vec![
            day(
                1,
                vec![destination("cheap", 10_000.0), destination("rafting", 900_000.0)],
                1_500_000.0,
                AccommodationTier::Luxury,
                Some((TransportMode::Taxi, 800_000.0)),
            ),
            day(2, vec![destination("park", 10_000.0)], 200_000.0, AccommodationTier::Budget, None),
        ]);
        let original = BudgetBreakdown::from_total(4_000_000.0, &AllocationRatios::default(), "IDR");
        let constraints = OptimizationConstraints {
            max_budget_increase: 0.0,
            ..Default::default()
        };
        let plan = optimizer()
            .optimize(&itinerary, &original, &prediction(0.5, Vec::new()), None, &constraints)
            .unwrap();

        let first = &plan.itinerary.days[0];
        let leg = first.transportation.as_ref().unwrap();
        assert_eq!(leg.mode, TransportMode::PublicTransport);
        // share 400k; saving min(240k, 400k)
        assert!((leg.cost - 560_000.0).abs() < 1e-6);

        let stay = first.accommodation.as_ref().unwrap();
        assert_eq!(stay.tier, AccommodationTier::Moderate);
        // share 700k; saving min(300k, 800k)
        assert!((stay.cost - 1_200_000.0).abs() < 1e-6);

        // activity share 300k; spend 910k; trim min(450k, 910k - 240k)
        let rafting = first.destinations.iter().find(|d| d.id == "rafting").unwrap();
        assert!((rafting.estimated_cost - 450_000.0).abs() < 1e-6);

        assert!((first.total_cost - first.computed_cost()).abs() < 1e-9);
        assert_eq!(plan.optimizations.len(), 3);
        assert!((plan.total_savings() - 990_000.0).abs() < 1e-6);
    }

    #[test]
    fn over_share_legs_are_downgraded_after_budget_increase_meets_target() {
        let mut days: Vec<Day> = cheap_itinerary().days;
        days[0] = day(
            1,
            vec![destination("museum", 50_000.0)],
            300_000.0,
            AccommodationTier::Moderate,
            Some((TransportMode::Taxi, 900_000.0)),
        );
        let itinerary = ItinerarySummary::new(days);
        let plan = optimizer()
            .optimize(
                &itinerary,
                &budget(),
                &prediction(0.85, Vec::new()),
                None,
                &OptimizationConstraints::default(),
            )
            .unwrap();

        // 15% increase alone projects 0.97
        assert_eq!(plan.optimizations[0].kind, OptimizationKind::BudgetIncrease);
        assert!((plan.optimizations[0].adherence_impact - 0.12).abs() < 1e-9);

        let leg = plan.itinerary.days[0].transportation.as_ref().unwrap();
        assert_eq!(leg.mode, TransportMode::PublicTransport);
        // share 1.15M / 3; saving min(270k, 900k - share)
        assert!((leg.cost - 630_000.0).abs() < 1e-6);
        assert!(plan
            .optimizations
            .iter()
            .any(|o| o.kind == OptimizationKind::TransportSubstitution && o.day_index == Some(1)));
    }

    #[test]
    fn disabled_flags_leave_itinerary_untouched() {
        let itinerary = ItinerarySummary::new(vec![day(
            1,
            vec![destination("rafting", 900_000.0)],
            1_500_000.0,
            AccommodationTier::Luxury,
            Some((TransportMode::Flight, 900_000.0)),
        )]);
        let constraints = OptimizationConstraints {
            change_flags: ChangeFlags::budget_only(),
            ..Default::default()
        };
        let plan = optimizer()
            .optimize(&itinerary, &budget(), &prediction(0.5, Vec::new()), None, &constraints)
            .unwrap();
        assert_eq!(plan.itinerary, itinerary);
    }

    #[test]
    fn unreachable_target_is_reported_honestly() {
        let plan = optimizer()
            .optimize(
                &cheap_itinerary(),
                &budget(),
                &prediction(0.6, Vec::new()),
                None,
                &OptimizationConstraints::default(),
            )
            .unwrap();

        assert!(!plan.success);
        let final_p = plan.final_prediction.success_probability.value();
        assert!((plan.guaranteed_adherence.value() - final_p).abs() < 1e-12);
        let expected_buffer = plan.budget.total_budget * (2.0 * (0.95 - final_p)).min(0.15);
        assert!((plan.buffer_amount - expected_buffer).abs() < 1e-6);
    }

    #[test]
    fn reachable_target_caps_guarantee_at_target() {
        let mut profile = UserProfile::neutral(UserId::new("saver").unwrap());
        profile.price_sensitivity = 0.0;
        profile.risk_tolerance = 1.0;
        profile.spontaneity_score = 0.0;
        let constraints = OptimizationConstraints {
            min_adherence_target: 0.6,
            ..Default::default()
        };
        let plan = optimizer()
            .optimize(&cheap_itinerary(), &budget(), &prediction(0.7, Vec::new()), Some(&profile), &constraints)
            .unwrap();

        assert!(plan.success);
        assert!((plan.guaranteed_adherence.value() - 0.6).abs() < 1e-12);
        assert_eq!(plan.buffer_amount, 0.0);
        assert!(plan.optimizations.is_empty());
    }

    #[test]
    fn overallocated_budget_is_rejected() {
        let bad = BudgetBreakdown::new(1_000.0, CategoryAmounts::new([900.0, 300.0, 0.0, 0.0, 0.0]), "IDR");
        let result = optimizer().optimize(
            &cheap_itinerary(),
            &bad,
            &prediction(0.5, Vec::new()),
            None,
            &OptimizationConstraints::default(),
        );
        assert!(matches!(result, Err(OptimizationError::InvalidBudget(_))));
    }
}
