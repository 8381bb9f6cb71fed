//! Itinerary value objects: days, destinations, lodging and transport legs.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BudgetCategory, CategoryAmounts};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Destination categories whose cost counts as food rather than activities.
const FOOD_CATEGORIES: &[&str] = &["food", "restaurant", "culinary", "cafe"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub category: String,
    pub location: Location,
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: u32,
    pub estimated_cost: f64,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Destination {
    /// Case-insensitive tag lookup; `street_food` also matches `street-food`.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| normalize_tag(t) == wanted)
    }

    pub fn is_food(&self) -> bool {
        let category = self.category.to_lowercase();
        FOOD_CATEGORIES.contains(&category.as_str())
    }

    pub fn budget_category(&self) -> BudgetCategory {
        if self.is_food() {
            BudgetCategory::Food
        } else {
            BudgetCategory::Activities
        }
    }

    /// Scheduled window end, if a start time is known.
    pub fn ends_at(&self) -> Option<NaiveTime> {
        self.scheduled_time
            .map(|start| start + chrono::Duration::minutes(i64::from(self.duration_minutes)))
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace(['-', ' '], "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationTier {
    Budget,
    Moderate,
    Luxury,
}

impl AccommodationTier {
    /// One tier cheaper, if any.
    pub fn downgrade(&self) -> Option<AccommodationTier> {
        match self {
            AccommodationTier::Luxury => Some(AccommodationTier::Moderate),
            AccommodationTier::Moderate => Some(AccommodationTier::Budget),
            AccommodationTier::Budget => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub name: String,
    pub tier: AccommodationTier,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    PublicTransport,
    Taxi,
    RentalCar,
    PrivateCar,
    Train,
    Flight,
}

impl TransportMode {
    /// Cheaper substitute from the downgrade table.
    pub fn downgrade(&self) -> Option<TransportMode> {
        match self {
            TransportMode::Taxi => Some(TransportMode::PublicTransport),
            TransportMode::RentalCar => Some(TransportMode::Taxi),
            TransportMode::PrivateCar => Some(TransportMode::RentalCar),
            TransportMode::Flight => Some(TransportMode::Train),
            TransportMode::Walking | TransportMode::PublicTransport | TransportMode::Train => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::PublicTransport => "public transport",
            TransportMode::Taxi => "taxi",
            TransportMode::RentalCar => "rental car",
            TransportMode::PrivateCar => "private car",
            TransportMode::Train => "train",
            TransportMode::Flight => "flight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transportation {
    pub mode: TransportMode,
    pub cost: f64,
    pub duration_minutes: u32,
}

/// One day of the plan. `total_cost` and `total_time_minutes` are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub day_index: u32,
    pub date: NaiveDate,
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub accommodation: Option<Accommodation>,
    #[serde(default)]
    pub transportation: Option<Transportation>,
    pub total_cost: f64,
    pub total_time_minutes: u32,
}

impl Day {
    /// Builds a day with totals derived from its parts.
    pub fn new(
        day_index: u32,
        date: NaiveDate,
        destinations: Vec<Destination>,
        accommodation: Option<Accommodation>,
        transportation: Option<Transportation>,
    ) -> Self {
        let mut day = Self {
            day_index,
            date,
            destinations,
            accommodation,
            transportation,
            total_cost: 0.0,
            total_time_minutes: 0,
        };
        day.total_cost = day.computed_cost();
        day.total_time_minutes = day.computed_time();
        day
    }

    /// Destinations + accommodation + transportation.
    pub fn computed_cost(&self) -> f64 {
        self.destination_cost()
            + self.accommodation_cost()
            + self.transportation_cost()
    }

    pub fn computed_time(&self) -> u32 {
        let visits: u32 = self.destinations.iter().map(|d| d.duration_minutes).sum();
        visits + self.transportation.as_ref().map_or(0, |t| t.duration_minutes)
    }

    pub fn destination_cost(&self) -> f64 {
        self.destinations.iter().map(|d| d.estimated_cost).sum()
    }

    /// Spend on non-food destinations.
    pub fn activity_cost(&self) -> f64 {
        self.destinations
            .iter()
            .filter(|d| !d.is_food())
            .map(|d| d.estimated_cost)
            .sum()
    }

    pub fn accommodation_cost(&self) -> f64 {
        self.accommodation.as_ref().map_or(0.0, |a| a.cost)
    }

    pub fn transportation_cost(&self) -> f64 {
        self.transportation.as_ref().map_or(0.0, |t| t.cost)
    }

    /// Returns a copy with totals recomputed from the parts.
    pub fn recomputed(mut self) -> Self {
        self.total_cost = self.computed_cost();
        self.total_time_minutes = self.computed_time();
        self
    }
}

/// Ordered list of days making up the plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItinerarySummary {
    pub days: Vec<Day>,
}

impl ItinerarySummary {
    pub fn new(days: Vec<Day>) -> Self {
        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn total_cost(&self) -> f64 {
        self.days.iter().map(|d| d.total_cost).sum()
    }

    pub fn destinations(&self) -> impl Iterator<Item = &Destination> {
        self.days.iter().flat_map(|d| d.destinations.iter())
    }

    pub fn destination_count(&self) -> usize {
        self.days.iter().map(|d| d.destinations.len()).sum()
    }

    /// Distinct destination cities, lowercased.
    pub fn cities(&self) -> BTreeSet<String> {
        self.destinations()
            .map(|d| d.location.city.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.days.iter().map(|d| d.date).min()
    }

    /// Calendar month (1-12) the trip starts in.
    pub fn start_month(&self) -> Option<u32> {
        self.start_date().map(|d| d.month())
    }

    pub fn count_tagged(&self, tag: &str) -> usize {
        self.destinations().filter(|d| d.has_tag(tag)).count()
    }

    /// Planned spend per budget category. Miscellaneous has no itinerary
    /// counterpart and is always zero.
    pub fn category_spend(&self) -> CategoryAmounts {
        let mut spend = CategoryAmounts::ZERO;
        for day in &self.days {
            spend[BudgetCategory::Accommodation] += day.accommodation_cost();
            spend[BudgetCategory::Transportation] += day.transportation_cost();
            for destination in &day.destinations {
                spend[destination.budget_category()] += destination.estimated_cost;
            }
        }
        spend
    }
}
