//! RiskAssessor - rule sweep over the optimized plan.

use tracing::debug;

use crate::domain::foundation::BudgetCategory;
use crate::domain::prediction::{AdherencePrediction, MarketCalendar};
use crate::domain::trip::{BudgetBreakdown, ItinerarySummary, RealTimeFactors, UserProfile};

use super::values::{
    ActionPriority, CriticalFailurePoint, MitigationMode, MitigationStrategy, MonitoringPhase,
    MonitoringStage, RecommendedAction, RiskAssessment, RiskCategory, RiskDistribution,
    RiskFactor, RiskLevel,
};

const OVERALL_OVERAGE_TRIGGER: f64 = 0.10;
const OVERALL_LIKELIHOOD_CAP: f64 = 0.8;
const CATEGORY_OVERAGE_TRIGGER: f64 = 0.20;
const CATEGORY_LIKELIHOOD_CAP: f64 = 0.7;

const OVERLOAD_ACTIVITY_COUNT: usize = 12;
const OVERLOAD_LIKELIHOOD_CAP: f64 = 0.6;
const TRANSPORT_DELAY_LIKELIHOOD: f64 = 0.3;

const ADVENTURE_COUNT: usize = 2;
const ADVENTURE_LIKELIHOOD_CAP: f64 = 0.4;
const STREET_FOOD_COUNT: usize = 3;
const FOOD_SAFETY_LIKELIHOOD: f64 = 0.2;

const PEAK_DEMAND_LIKELIHOOD: f64 = 0.5;
const HIGH_SPONTANEITY: f64 = 0.7;
const HIGH_PRICE_SENSITIVITY: f64 = 0.6;

const TOP_CRITICAL_POINTS: usize = 3;
const TOP_ACTIONS: usize = 5;
const BUFFER_TARGET: f64 = 0.95;

/// Runs the five rule families and aggregates the result.
#[derive(Debug, Clone, Default)]
pub struct RiskAssessor {
    calendar: MarketCalendar,
}

impl RiskAssessor {
    pub fn new(calendar: MarketCalendar) -> Self {
        Self { calendar }
    }

    pub fn assess(
        &self,
        itinerary: &ItinerarySummary,
        budget: &BudgetBreakdown,
        profile: Option<&UserProfile>,
        prediction: &AdherencePrediction,
        realtime: Option<&RealTimeFactors>,
    ) -> RiskAssessment {
        let mut factors = Vec::new();
        factors.extend(budget_risks(itinerary, budget));
        factors.extend(schedule_risks(itinerary));
        factors.extend(health_safety_risks(itinerary));
        factors.extend(self.external_risks(itinerary, realtime));
        if let Some(profile) = profile {
            factors.extend(user_behavior_risks(profile, budget));
        }

        let overall_risk_score = if factors.is_empty() {
            0.0
        } else {
            factors.iter().map(|f| f.risk_score).sum::<f64>() / factors.len() as f64
        };
        let risk_level = RiskLevel::from_score(overall_risk_score);

        debug!(
            factors = factors.len(),
            overall_risk_score,
            level = %risk_level,
            "Risk sweep finished"
        );

        RiskAssessment {
            overall_risk_score,
            risk_level,
            distribution: RiskDistribution::from_factors(&factors),
            critical_failure_points: critical_failure_points(&factors, budget.total_budget),
            monitoring_schedule: monitoring_schedule(&factors),
            recommended_actions: recommended_actions(&factors, prediction, budget),
            factors,
        }
    }

    fn external_risks(&self, itinerary: &ItinerarySummary, realtime: Option<&RealTimeFactors>) -> Vec<RiskFactor> {
        let mut risks = Vec::new();

        if let Some(realtime) = realtime {
            let adverse = realtime.adverse_weather_days(itinerary.days.iter().map(|d| &d.date));
            if adverse > 0 {
                let days = itinerary.day_count().max(adverse);
                let likelihood = adverse as f64 / days as f64;
                risks.push(
                    RiskFactor::new(
                        "external-weather",
                        RiskCategory::External,
                        "weather_disruption",
                        format!("{} of {} days forecast heavy rain or extreme temperatures", adverse, days),
                        likelihood,
                        0.5,
                    )
                    .with_triggers(&["Severe weather warning", "Outdoor activity cancelled"])
                    .with_mitigations(vec![
                        MitigationStrategy::new("Keep an indoor alternative for each outdoor stop", 0.7, 0.0, MitigationMode::Preventive),
                        MitigationStrategy::new("Book refundable outdoor activities", 0.5, 0.0, MitigationMode::Preventive),
                    ])
                    .with_monitoring(&["Check the forecast each evening"])
                    .with_contingencies(&["weather_disruption"]),
                );
            }
        }

        if itinerary.start_month().is_some_and(|m| self.calendar.is_peak(m)) {
            risks.push(
                RiskFactor::new(
                    "external-peak-demand",
                    RiskCategory::External,
                    "peak_demand",
                    "Travel falls in a peak month; prices and crowds spike",
                    PEAK_DEMAND_LIKELIHOOD,
                    0.5,
                )
                .with_triggers(&["Price of an unbooked item rises above plan"])
                .with_mitigations(vec![
                    MitigationStrategy::new("Book accommodation and transport early", 0.7, 0.0, MitigationMode::Preventive),
                    MitigationStrategy::new("Visit popular sites at off-peak hours", 0.4, 0.0, MitigationMode::Manual),
                ])
                .with_monitoring(&["Compare booked prices against plan one week out"])
                .with_contingencies(&["budget_overrun"]),
            );
        }

        risks
    }
}

fn budget_risks(itinerary: &ItinerarySummary, budget: &BudgetBreakdown) -> Vec<RiskFactor> {
    let mut risks = Vec::new();
    let total = budget.total_budget;

    if total > 0.0 {
        let overage = (itinerary.total_cost() - total) / total;
        if overage > OVERALL_OVERAGE_TRIGGER {
            risks.push(
                RiskFactor::new(
                    "budget-overall",
                    RiskCategory::Budget,
                    "budget_overrun",
                    format!("Planned costs exceed the budget by {:.0}%", overage * 100.0),
                    (overage * 2.0).min(OVERALL_LIKELIHOOD_CAP),
                    0.8,
                )
                .with_triggers(&["Cumulative spend passes the daily plan", "Unplanned purchase above 10% of daily budget"])
                .with_mitigations(vec![
                    MitigationStrategy::new("Daily spending alerts at 80% of allowance", 0.6, 0.0, MitigationMode::Automatic),
                    MitigationStrategy::new("Pre-book the most expensive items", 0.5, 0.0, MitigationMode::Preventive),
                    MitigationStrategy::new("Reserve an emergency buffer", 0.7, total * 0.05, MitigationMode::Preventive),
                ])
                .with_monitoring(&["Track daily spend against plan", "Review remaining budget at mid-trip"])
                .with_contingencies(&["budget_overrun"]),
            );
        }
    }

    let spend = itinerary.category_spend();
    for (category, allocated) in budget.categories.iter() {
        if allocated <= 0.0 {
            continue;
        }
        let overage = (spend[category] - allocated) / allocated;
        if overage > CATEGORY_OVERAGE_TRIGGER {
            risks.push(
                RiskFactor::new(
                    format!("budget-{}", category_slug(category)),
                    RiskCategory::Budget,
                    "category_overrun",
                    format!("{} spend exceeds its allocation by {:.0}%", category, overage * 100.0),
                    overage.min(CATEGORY_LIKELIHOOD_CAP),
                    0.6,
                )
                .with_triggers(&["Category spend passes its allocation"])
                .with_mitigations(vec![
                    MitigationStrategy::new(format!("Rebalance from other categories into {}", category), 0.5, 0.0, MitigationMode::Manual),
                    MitigationStrategy::new(format!("Pick cheaper {} options", category), 0.6, 0.0, MitigationMode::Manual),
                ])
                .with_monitoring(&["Track category spend daily"])
                .with_contingencies(&["budget_overrun"]),
            );
        }
    }

    risks
}

fn category_slug(category: BudgetCategory) -> &'static str {
    match category {
        BudgetCategory::Accommodation => "accommodation",
        BudgetCategory::Transportation => "transportation",
        BudgetCategory::Food => "food",
        BudgetCategory::Activities => "activities",
        BudgetCategory::Miscellaneous => "miscellaneous",
    }
}

fn schedule_risks(itinerary: &ItinerarySummary) -> Vec<RiskFactor> {
    let mut risks = Vec::new();

    let activities = itinerary.destination_count();
    if activities > OVERLOAD_ACTIVITY_COUNT {
        risks.push(
            RiskFactor::new(
                "schedule-overload",
                RiskCategory::Schedule,
                "schedule_overload",
                format!("{} activities scheduled; fatigue and missed bookings are likely", activities),
                (activities as f64 / 20.0).min(OVERLOAD_LIKELIHOOD_CAP),
                0.5,
            )
            .with_triggers(&["Two or more activities missed in a day"])
            .with_mitigations(vec![
                MitigationStrategy::new("Mark optional activities that can be dropped", 0.6, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new("Leave a free half-day", 0.5, 0.0, MitigationMode::Preventive),
            ])
            .with_monitoring(&["Compare completed activities against plan each evening"])
            .with_contingencies(&["schedule_reshuffle"]),
        );
    }

    if itinerary.days.iter().any(|d| d.transportation.is_some()) {
        risks.push(
            RiskFactor::new(
                "schedule-transport",
                RiskCategory::Schedule,
                "transportation_delay",
                "Transport legs may be delayed or cancelled",
                TRANSPORT_DELAY_LIKELIHOOD,
                0.4,
            )
            .with_triggers(&["Departure delayed more than 60 minutes", "Connection missed"])
            .with_mitigations(vec![
                MitigationStrategy::new("Keep a backup route for every leg", 0.6, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new("Allow 2 hours between connections", 0.5, 0.0, MitigationMode::Preventive),
            ])
            .with_monitoring(&["Check departure status 3 hours before each leg"])
            .with_contingencies(&["transport_failure"]),
        );
    }

    risks
}

fn health_safety_risks(itinerary: &ItinerarySummary) -> Vec<RiskFactor> {
    let mut risks = Vec::new();

    let adventure = itinerary.count_tagged("adventure");
    if adventure > ADVENTURE_COUNT {
        risks.push(
            RiskFactor::new(
                "health-adventure",
                RiskCategory::HealthSafety,
                "adventure_injury",
                format!("{} adventure activities raise injury exposure", adventure),
                (adventure as f64 / 10.0).min(ADVENTURE_LIKELIHOOD_CAP),
                0.7,
            )
            .with_triggers(&["Injury during an activity"])
            .with_mitigations(vec![
                MitigationStrategy::new("Use licensed operators with safety gear", 0.7, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new("Buy travel insurance that covers adventure sports", 0.8, 0.0, MitigationMode::Preventive),
            ])
            .with_monitoring(&["Confirm operator licensing before booking"])
            .with_contingencies(&["health_emergency"]),
        );
    }

    let street_food = itinerary.count_tagged("street_food");
    if street_food > STREET_FOOD_COUNT {
        risks.push(
            RiskFactor::new(
                "health-food-safety",
                RiskCategory::HealthSafety,
                "food_safety",
                format!("{} street food stops raise food-borne illness exposure", street_food),
                FOOD_SAFETY_LIKELIHOOD,
                0.4,
            )
            .with_triggers(&["Stomach illness symptoms"])
            .with_mitigations(vec![
                MitigationStrategy::new("Prefer busy stalls with high turnover", 0.5, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new("Carry oral rehydration salts", 0.4, 0.0, MitigationMode::Preventive),
            ])
            .with_monitoring(&["Note symptoms after street food stops"])
            .with_contingencies(&["health_emergency"]),
        );
    }

    risks
}

fn user_behavior_risks(profile: &UserProfile, budget: &BudgetBreakdown) -> Vec<RiskFactor> {
    let mut risks = Vec::new();

    if profile.spontaneity_score > HIGH_SPONTANEITY {
        risks.push(
            RiskFactor::new(
                "behavior-impulse",
                RiskCategory::UserBehavior,
                "impulse_spending",
                "High spontaneity makes unplanned purchases likely",
                profile.spontaneity_score,
                0.5,
            )
            .with_triggers(&["Unplanned purchase above 10% of daily budget"])
            .with_mitigations(vec![
                MitigationStrategy::new("Set a fixed daily allowance for extras", 0.6, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new("Real-time expense tracking", 0.5, 0.0, MitigationMode::Automatic),
            ])
            .with_monitoring(&["Review unplanned purchases daily"])
            .with_contingencies(&["budget_overrun"]),
        );
    }

    if profile.price_sensitivity > HIGH_PRICE_SENSITIVITY {
        risks.push(
            RiskFactor::new(
                "behavior-price-shock",
                RiskCategory::UserBehavior,
                "price_shock",
                "Price-sensitive traveler may abandon planned items when prices differ",
                profile.price_sensitivity,
                0.4,
            )
            .with_triggers(&["Item price above plan by more than 15%"])
            .with_mitigations(vec![
                MitigationStrategy::new("Lock prices by pre-paying major items", 0.6, 0.0, MitigationMode::Preventive),
                MitigationStrategy::new(
                    "Share a price reference sheet",
                    0.3,
                    (budget.total_budget * 0.001).round(),
                    MitigationMode::Manual,
                ),
            ])
            .with_monitoring(&["Compare paid prices against plan"])
            .with_contingencies(&["budget_overrun"]),
        );
    }

    risks
}

fn critical_failure_points(factors: &[RiskFactor], total_budget: f64) -> Vec<CriticalFailurePoint> {
    let mut points: Vec<CriticalFailurePoint> = factors
        .iter()
        .map(|f| {
            let potential_loss = f.impact * total_budget;
            CriticalFailurePoint {
                risk_id: f.id.clone(),
                description: f.description.clone(),
                likelihood: f.likelihood,
                potential_loss,
                expected_loss: f.likelihood * potential_loss,
            }
        })
        .collect();
    points.sort_by(|a, b| b.expected_loss.total_cmp(&a.expected_loss));
    points.truncate(TOP_CRITICAL_POINTS);
    points
}

fn monitoring_schedule(factors: &[RiskFactor]) -> Vec<MonitoringStage> {
    let mut pre_trip = vec!["Confirm all bookings and documents".to_string()];
    let mut daily = vec!["Log expenses against the daily allowance".to_string()];
    let mut emergency = vec!["Daily spend above 80% of allowance by midday".to_string()];

    for factor in factors {
        match factor.category {
            RiskCategory::External | RiskCategory::HealthSafety => {
                pre_trip.extend(factor.monitoring_points.iter().cloned());
                emergency.extend(factor.triggers.iter().cloned());
            }
            RiskCategory::Budget | RiskCategory::Schedule | RiskCategory::UserBehavior => {
                daily.extend(factor.monitoring_points.iter().cloned());
                if factor.risk_score >= 0.3 {
                    emergency.extend(factor.triggers.iter().cloned());
                }
            }
        }
    }

    for checks in [&mut pre_trip, &mut daily, &mut emergency] {
        dedup_preserving_order(checks);
    }

    vec![
        MonitoringStage {
            phase: MonitoringPhase::PreTrip,
            timing: "1 week before departure".to_string(),
            checks: pre_trip,
        },
        MonitoringStage {
            phase: MonitoringPhase::DailyDuringTrip,
            timing: "Every evening during the trip".to_string(),
            checks: daily,
        },
        MonitoringStage {
            phase: MonitoringPhase::EmergencyTriggers,
            timing: "Immediately when triggered".to_string(),
            checks: emergency,
        },
    ]
}

fn dedup_preserving_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn recommended_actions(
    factors: &[RiskFactor],
    prediction: &AdherencePrediction,
    budget: &BudgetBreakdown,
) -> Vec<RecommendedAction> {
    let mut ranked: Vec<&RiskFactor> = factors.iter().collect();
    ranked.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let mut actions: Vec<RecommendedAction> = ranked
        .into_iter()
        .take(TOP_ACTIONS)
        .filter_map(|factor| {
            factor.best_mitigation().map(|m| RecommendedAction {
                action: m.strategy.clone(),
                priority: ActionPriority::from_score(factor.risk_score),
                risk_id: Some(factor.id.clone()),
                cost: m.cost,
            })
        })
        .collect();

    let probability = prediction.success_probability.value();
    if probability < BUFFER_TARGET {
        actions.push(RecommendedAction {
            action: "Increase the budget buffer".to_string(),
            priority: ActionPriority::High,
            risk_id: None,
            cost: ((BUFFER_TARGET - probability) * budget.total_budget).ceil(),
        });
    }

    actions
}
