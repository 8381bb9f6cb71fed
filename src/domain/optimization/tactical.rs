//! Advisory suggestions the traveler can act on during the trip.

use crate::domain::foundation::BudgetCategory;
use crate::domain::trip::{AccommodationTier, BudgetBreakdown, ItinerarySummary, TransportMode};

use super::optimizer::OptimizerSettings;
use super::values::{Ease, TacticalSuggestion};

const TAXI_SAVING: f64 = 0.60;
const FOOD_SAVING: f64 = 0.25;
const LUXURY_SAVING: f64 = 0.40;
const CROWDED_PLAN: usize = 8;
const TRIM_SHARE: f64 = 0.10;

/// Lists reversible savings for the plan. Nothing here mutates the
/// itinerary or the budget.
pub fn suggest_tactics(
    itinerary: &ItinerarySummary,
    budget: &BudgetBreakdown,
    settings: &OptimizerSettings,
) -> Vec<TacticalSuggestion> {
    let mut suggestions = Vec::new();

    for day in &itinerary.days {
        if let Some(leg) = day.transportation.as_ref().filter(|t| t.mode == TransportMode::Taxi) {
            suggestions.push(TacticalSuggestion {
                id: format!("transport-day-{}", day.day_index),
                category: BudgetCategory::Transportation,
                title: "Use public transport".to_string(),
                description: format!(
                    "Day {}: take public transport instead of a taxi where the route allows",
                    day.day_index
                ),
                potential_savings: leg.cost * TAXI_SAVING,
                ease: Ease::Easy,
                day_index: Some(day.day_index),
            });
        }
    }

    let days = itinerary.day_count().max(1) as f64;
    let food_budget = budget.amount(BudgetCategory::Food);
    if food_budget / days > settings.high_daily_food_budget {
        suggestions.push(TacticalSuggestion {
            id: "food-local-eateries".to_string(),
            category: BudgetCategory::Food,
            title: "Eat at local eateries".to_string(),
            description: "Swap some restaurant meals for local warungs and markets".to_string(),
            potential_savings: food_budget * FOOD_SAVING,
            ease: Ease::Easy,
            day_index: None,
        });
    }

    let count = itinerary.destination_count();
    if count > CROWDED_PLAN {
        let skip = (count as f64 * TRIM_SHARE).ceil() as usize;
        let mut ranked: Vec<_> = itinerary.destinations().collect();
        ranked.sort_by(|a, b| a.rating.total_cmp(&b.rating));
        let skipped = &ranked[..skip.min(ranked.len())];
        let names: Vec<&str> = skipped.iter().map(|d| d.name.as_str()).collect();

        suggestions.push(TacticalSuggestion {
            id: "activities-trim-low-rated".to_string(),
            category: BudgetCategory::Activities,
            title: "Skip the lowest-rated stops".to_string(),
            description: format!("Consider skipping: {}", names.join(", ")),
            potential_savings: skipped.iter().map(|d| d.estimated_cost).sum(),
            ease: Ease::Moderate,
            day_index: None,
        });
    }

    for day in &itinerary.days {
        if let Some(stay) = day
            .accommodation
            .as_ref()
            .filter(|a| a.tier == AccommodationTier::Luxury)
        {
            suggestions.push(TacticalSuggestion {
                id: format!("accommodation-day-{}", day.day_index),
                category: BudgetCategory::Accommodation,
                title: "Book a moderate hotel".to_string(),
                description: format!(
                    "Day {}: a moderate alternative to {} keeps most of the comfort",
                    day.day_index, stay.name
                ),
                potential_savings: stay.cost * LUXURY_SAVING,
                ease: Ease::Moderate,
                day_index: Some(day.day_index),
            });
        }
    }

    suggestions
}
