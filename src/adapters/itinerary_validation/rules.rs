//! RuleValidationEngine - structural, cost, time and distance checks.
//!
//! Rules run one after another inside a single timeout. A run that does not
//! finish in time yields an invalid report instead of an error.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::config::ValidationConfig;
use crate::domain::trip::{Day, ItinerarySummary, TripPreferences};
use crate::ports::{ValidationEngine, ValidationIssue, ValidationReport};

const ERROR_PENALTY: u32 = 20;
const WARNING_PENALTY: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleValidationSettings {
    pub timeout_ms: u64,
    /// Same-day hop above this distance is a warning.
    pub max_hop_km: f64,
    /// Allowed relative gap between a day's total and its parts.
    pub cost_tolerance: f64,
}

impl Default for RuleValidationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_hop_km: 50.0,
            cost_tolerance: 0.01,
        }
    }
}

#[derive(Debug, Default)]
struct Findings {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Findings {
    fn error(&mut self, rule: &str, message: String, day: Option<u32>) {
        self.errors.push(ValidationIssue::new(rule, message, day));
    }

    fn warning(&mut self, rule: &str, message: String, day: Option<u32>) {
        self.warnings.push(ValidationIssue::new(rule, message, day));
    }

    fn into_report(self) -> ValidationReport {
        let penalty = ERROR_PENALTY * self.errors.len() as u32 + WARNING_PENALTY * self.warnings.len() as u32;
        ValidationReport {
            is_valid: self.errors.is_empty(),
            score: 100u32.saturating_sub(penalty) as u8,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleValidationEngine {
    settings: RuleValidationSettings,
}

impl RuleValidationEngine {
    pub fn new(settings: RuleValidationSettings) -> Self {
        Self { settings }
    }

    /// Builds the engine from the `validation` section of the app config.
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.settings())
    }

    async fn run_rules(&self, itinerary: &ItinerarySummary, preferences: Option<&TripPreferences>) -> ValidationReport {
        let mut findings = Findings::default();

        check_structure(itinerary, &mut findings);
        tokio::task::yield_now().await;
        check_costs(itinerary, self.settings.cost_tolerance, &mut findings);
        tokio::task::yield_now().await;
        check_time_overlaps(itinerary, &mut findings);
        tokio::task::yield_now().await;
        check_distances(itinerary, self.settings.max_hop_km, &mut findings);
        if let Some(preferences) = preferences {
            check_preferences(itinerary, preferences, &mut findings);
        }

        findings.into_report()
    }
}

#[async_trait]
impl ValidationEngine for RuleValidationEngine {
    async fn validate_itinerary(
        &self,
        itinerary: &ItinerarySummary,
        preferences: Option<&TripPreferences>,
    ) -> ValidationReport {
        bounded(self.settings.timeout_ms, self.run_rules(itinerary, preferences)).await
    }
}

/// Races a rule run against the timeout.
async fn bounded(timeout_ms: u64, run: impl std::future::Future<Output = ValidationReport>) -> ValidationReport {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), run).await {
        Ok(report) => report,
        Err(_) => {
            warn!(timeout_ms, "Itinerary validation timed out");
            ValidationReport::timed_out(timeout_ms)
        }
    }
}

fn check_structure(itinerary: &ItinerarySummary, findings: &mut Findings) {
    if itinerary.is_empty() {
        findings.error("structure", "Itinerary has no days".to_string(), None);
        return;
    }

    for (position, day) in itinerary.days.iter().enumerate() {
        let expected = position as u32 + 1;
        if day.day_index != expected {
            findings.error(
                "structure",
                format!("Day at position {} has index {}, expected {}", expected, day.day_index, expected),
                Some(day.day_index),
            );
        }
        for destination in &day.destinations {
            if destination.duration_minutes == 0 {
                findings.error(
                    "structure",
                    format!("{} has zero duration", destination.name),
                    Some(day.day_index),
                );
            }
            if destination.estimated_cost < 0.0 {
                findings.error(
                    "structure",
                    format!("{} has a negative cost", destination.name),
                    Some(day.day_index),
                );
            }
        }
        if day.accommodation_cost() < 0.0 || day.transportation_cost() < 0.0 {
            findings.error("structure", "Negative lodging or transport cost".to_string(), Some(day.day_index));
        }
    }
}

fn check_costs(itinerary: &ItinerarySummary, tolerance: f64, findings: &mut Findings) {
    for day in &itinerary.days {
        let computed = day.computed_cost();
        let allowed = tolerance * computed.abs().max(1.0);
        if (day.total_cost - computed).abs() > allowed {
            findings.error(
                "cost_consistency",
                format!("Day total {:.0} does not match its parts {:.0}", day.total_cost, computed),
                Some(day.day_index),
            );
        }
    }
}

fn check_time_overlaps(itinerary: &ItinerarySummary, findings: &mut Findings) {
    for day in &itinerary.days {
        let mut windows: Vec<_> = day
            .destinations
            .iter()
            .filter_map(|d| Some((d.scheduled_time?, d.ends_at()?, d.name.as_str())))
            .collect();
        windows.sort_by_key(|(start, _, _)| *start);

        for pair in windows.windows(2) {
            let (_, first_end, first) = pair[0];
            let (second_start, _, second) = pair[1];
            if second_start < first_end {
                findings.error(
                    "time_overlap",
                    format!("{} starts before {} ends", second, first),
                    Some(day.day_index),
                );
            }
        }
    }
}

fn check_distances(itinerary: &ItinerarySummary, max_hop_km: f64, findings: &mut Findings) {
    for day in &itinerary.days {
        for hop in long_hops(day, max_hop_km) {
            findings.warning("geographic_distance", hop, Some(day.day_index));
        }
    }
}

fn long_hops(day: &Day, max_hop_km: f64) -> Vec<String> {
    day.destinations
        .windows(2)
        .filter_map(|pair| {
            let from = pair[0].location.coordinates?;
            let to = pair[1].location.coordinates?;
            let distance = from.distance_km(&to);
            (distance > max_hop_km).then(|| {
                format!("{} to {} is {:.0} km", pair[0].name, pair[1].name, distance)
            })
        })
        .collect()
}

fn check_preferences(itinerary: &ItinerarySummary, preferences: &TripPreferences, findings: &mut Findings) {
    if itinerary.day_count() != preferences.days as usize {
        findings.warning(
            "preferences",
            format!("Itinerary has {} days, {} requested", itinerary.day_count(), preferences.days),
            None,
        );
    }
    if itinerary.total_cost() > preferences.budget {
        findings.warning(
            "preferences",
            format!("Planned cost {:.0} exceeds the budget {:.0}", itinerary.total_cost(), preferences.budget),
            None,
        );
    }
}
