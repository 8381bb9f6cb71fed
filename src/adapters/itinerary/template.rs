//! Deterministic template generator.
//!
//! Stands in for a real planner: one day per requested day, cities visited
//! in order, two interest-driven stops per day, and a train leg whenever the
//! city changes. Costs are fractions of the per-day budget.

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};

use crate::domain::trip::{
    Accommodation, AccommodationTier, Day, Destination, ItinerarySummary, Location,
    TransportMode, Transportation, TripPreferences,
};
use crate::ports::{ItineraryGenerationError, ItineraryGenerator};

const DEFAULT_INTERESTS: &[&str] = &["culture", "food"];

/// Per-day budget fractions used to price template items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateCosts {
    pub budget_room: f64,
    pub moderate_room: f64,
    pub luxury_room: f64,
    pub per_stop: f64,
    pub intercity_leg: f64,
}

impl Default for TemplateCosts {
    fn default() -> Self {
        Self {
            budget_room: 0.20,
            moderate_room: 0.30,
            luxury_room: 0.50,
            per_stop: 0.08,
            intercity_leg: 0.15,
        }
    }
}

impl TemplateCosts {
    fn room(&self, tier: AccommodationTier) -> f64 {
        match tier {
            AccommodationTier::Budget => self.budget_room,
            AccommodationTier::Moderate => self.moderate_room,
            AccommodationTier::Luxury => self.luxury_room,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateItineraryGenerator {
    costs: TemplateCosts,
}

impl TemplateItineraryGenerator {
    pub fn new(costs: TemplateCosts) -> Self {
        Self { costs }
    }

    fn build(&self, preferences: &TripPreferences) -> Result<ItinerarySummary, ItineraryGenerationError> {
        let mut problems = Vec::new();
        if preferences.days == 0 {
            problems.push("days must be at least 1".to_string());
        }
        if preferences.budget <= 0.0 {
            problems.push("budget must be positive".to_string());
        }
        let cities: Vec<&str> = preferences
            .cities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if cities.is_empty() {
            problems.push("at least one city is required".to_string());
        }
        if !problems.is_empty() {
            return Err(ItineraryGenerationError::Rejected(problems));
        }

        let interests: Vec<&str> = if preferences.interests.is_empty() {
            DEFAULT_INTERESTS.to_vec()
        } else {
            preferences.interests.iter().map(String::as_str).collect()
        };

        let per_day = preferences.budget / f64::from(preferences.days);
        let days_per_city = (preferences.days as usize + cities.len() - 1) / cities.len();
        let mut previous_city: Option<&str> = None;

        let days = (0..preferences.days)
            .map(|offset| {
                let index = offset as usize;
                let city = cities[(index / days_per_city).min(cities.len() - 1)];

                let destinations = (0..2)
                    .map(|slot| {
                        let interest = interests[(index * 2 + slot) % interests.len()];
                        self.destination(city, interest, index, slot, per_day)
                    })
                    .collect();

                let transportation = match previous_city {
                    Some(prev) if prev != city => Some(Transportation {
                        mode: TransportMode::Train,
                        cost: per_day * self.costs.intercity_leg,
                        duration_minutes: 180,
                    }),
                    _ => None,
                };
                previous_city = Some(city);

                Day::new(
                    offset + 1,
                    preferences.start_date + Duration::days(i64::from(offset)),
                    destinations,
                    Some(Accommodation {
                        name: format!("{} stay in {}", tier_label(preferences.accommodation_type), city),
                        tier: preferences.accommodation_type,
                        cost: per_day * self.costs.room(preferences.accommodation_type),
                    }),
                    transportation,
                )
            })
            .collect();

        Ok(ItinerarySummary::new(days))
    }

    fn destination(&self, city: &str, interest: &str, day: usize, slot: usize, per_day: f64) -> Destination {
        let start = if slot == 0 { (9, 0) } else { (14, 0) };
        Destination {
            id: format!("tpl-{}-{}", day + 1, slot + 1),
            name: format!("{} {} spot", city, interest),
            category: interest.to_lowercase(),
            location: Location::city(city),
            scheduled_time: NaiveTime::from_hms_opt(start.0, start.1, 0),
            duration_minutes: 120,
            estimated_cost: per_day * self.costs.per_stop,
            rating: 4.0 + 0.1 * ((day + slot) % 5) as f32,
            tags: vec![interest.to_lowercase()],
        }
    }
}

fn tier_label(tier: AccommodationTier) -> &'static str {
    match tier {
        AccommodationTier::Budget => "Budget",
        AccommodationTier::Moderate => "Moderate",
        AccommodationTier::Luxury => "Luxury",
    }
}

#[async_trait]
impl ItineraryGenerator for TemplateItineraryGenerator {
    async fn generate_itinerary(&self, preferences: &TripPreferences) -> Result<ItinerarySummary, ItineraryGenerationError> {
        self.build(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn preferences(days: u32, cities: &[&str]) -> TripPreferences {
        TripPreferences {
            budget: 6_000_000.0,
            days,
            travelers: 2,
            accommodation_type: AccommodationTier::Moderate,
            cities: cities.iter().map(|c| c.to_string()).collect(),
            interests: vec!["culture".to_string(), "nature".to_string()],
            themes: Vec::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            constraints: None,
        }
    }

    #[tokio::test]
    async fn one_day_per_requested_day() {
        let trip = TemplateItineraryGenerator::default()
            .generate_itinerary(&preferences(3, &["Bandung"]))
            .await
            .unwrap();

        assert_eq!(trip.day_count(), 3);
        assert_eq!(trip.days.iter().map(|d| d.day_index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(trip.days[2].date, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert_eq!(trip.destination_count(), 6);
        assert!(trip.days.iter().all(|d| d.transportation.is_none()));
        // room 0.30 + two stops at 0.08 of a 2M day
        assert!((trip.days[0].total_cost - 920_000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn city_change_adds_train_leg() {
        let trip = TemplateItineraryGenerator::default()
            .generate_itinerary(&preferences(4, &["Bandung", "Yogyakarta"]))
            .await
            .unwrap();

        let legs: Vec<bool> = trip.days.iter().map(|d| d.transportation.is_some()).collect();
        assert_eq!(legs, vec![false, false, true, false]);
        assert_eq!(trip.cities().len(), 2);
    }

    #[tokio::test]
    async fn missing_cities_are_rejected() {
        let result = TemplateItineraryGenerator::default()
            .generate_itinerary(&preferences(2, &[" "]))
            .await;
        assert!(matches!(result, Err(ItineraryGenerationError::Rejected(_))));
    }
}
