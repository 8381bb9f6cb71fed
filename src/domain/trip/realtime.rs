//! Optional live factors fed to the risk and contingency stages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const HIGH_RAIN_MM: f64 = 20.0;
const EXTREME_HEAT_C: f64 = 35.0;
const EXTREME_COLD_C: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub temperature_max_c: f64,
    pub temperature_min_c: f64,
}

impl WeatherDay {
    pub fn is_high_rain(&self) -> bool {
        self.precipitation_mm >= HIGH_RAIN_MM
    }

    pub fn is_extreme_temperature(&self) -> bool {
        self.temperature_max_c >= EXTREME_HEAT_C || self.temperature_min_c <= EXTREME_COLD_C
    }

    pub fn is_adverse(&self) -> bool {
        self.is_high_rain() || self.is_extreme_temperature()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealTimeFactors {
    #[serde(default)]
    pub weather: Vec<WeatherDay>,
    #[serde(default)]
    pub alerts: Vec<String>,
}

impl RealTimeFactors {
    /// Counts the given dates with at least one adverse forecast entry.
    /// Forecast entries for other dates are ignored.
    pub fn adverse_weather_days<'a>(&self, dates: impl IntoIterator<Item = &'a NaiveDate>) -> usize {
        let mut dates: Vec<&NaiveDate> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        dates
            .into_iter()
            .filter(|date| self.weather.iter().any(|w| &w.date == *date && w.is_adverse()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn forecast(on: u32, rain: f64, max: f64, min: f64) -> WeatherDay {
        WeatherDay {
            date: date(on),
            precipitation_mm: rain,
            temperature_max_c: max,
            temperature_min_c: min,
        }
    }

    #[test]
    fn adverse_days_count_rain_and_temperature() {
        let factors = RealTimeFactors {
            weather: vec![
                forecast(5, 45.0, 29.0, 23.0),
                forecast(6, 2.0, 37.0, 26.0),
                forecast(7, 0.0, 30.0, 22.0),
            ],
            alerts: Vec::new(),
        };
        assert_eq!(factors.adverse_weather_days(&[date(5), date(6), date(7)]), 2);
    }

    #[test]
    fn forecasts_outside_the_given_dates_are_ignored() {
        let factors = RealTimeFactors {
            weather: vec![
                forecast(1, 60.0, 29.0, 23.0),
                forecast(2, 60.0, 29.0, 23.0),
                forecast(5, 30.0, 29.0, 23.0),
                forecast(5, 0.0, 38.0, 23.0),
                forecast(20, 60.0, 29.0, 23.0),
            ],
            alerts: Vec::new(),
        };
        assert_eq!(factors.adverse_weather_days(&[date(5), date(6)]), 1);
        assert_eq!(factors.adverse_weather_days(&[date(6), date(7)]), 0);
    }
}
