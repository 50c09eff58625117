//! Value types flowing through the forecast engine.
//!
//! All of these are request-scoped: the engine builds them fresh on every
//! call and never keeps them around. Field names serialize in camelCase to
//! match the dashboard's JSON contract.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Error returned by the strict `FromStr` impls for engine enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} \"{label}\"")]
pub struct UnknownLabel {
    /// Which enum was being parsed (e.g. `"weather condition"`).
    pub kind: &'static str,
    /// The label that did not match.
    pub label: String,
}

fn parse_label<T: Copy>(
    all: &[T],
    label_of: fn(T) -> &'static str,
    s: &str,
    kind: &'static str,
) -> Result<T, UnknownLabel> {
    let needle = s.trim().to_ascii_lowercase();
    all.iter()
        .copied()
        .find(|v| label_of(*v) == needle)
        .ok_or_else(|| UnknownLabel {
            kind,
            label: s.to_string(),
        })
}

/// Sky conditions the engine adapts generation and demand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

impl WeatherCondition {
    /// Every condition, in sampling order.
    pub const ALL: [Self; 4] = [Self::Sunny, Self::Cloudy, Self::Rainy, Self::Stormy];

    /// Returns the lowercase wire label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
        }
    }

    /// Parses a label, falling back to [`WeatherCondition::Sunny`] for
    /// anything unrecognised.
    pub fn from_label_or_default(label: &str) -> Self {
        label.parse().unwrap_or(Self::Sunny)
    }
}

impl FromStr for WeatherCondition {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(&Self::ALL, Self::label, s, "weather condition")
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse time-of-day bucket derived from the wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [Self; 4] = [Self::Morning, Self::Noon, Self::Evening, Self::Night];

    /// Buckets an hour of day (0-23): `[6,12)` morning, `[12,16)` noon,
    /// `[16,20)` evening, anything else night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=15 => Self::Noon,
            16..=19 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Buckets the hour component of a local timestamp.
    pub fn bucket(now: NaiveDateTime) -> Self {
        Self::from_hour(now.hour())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    /// Parses a label, falling back to [`TimeOfDay::Noon`] for anything
    /// unrecognised.
    pub fn from_label_or_default(label: &str) -> Self {
        label.parse().unwrap_or(Self::Noon)
    }
}

impl FromStr for TimeOfDay {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(&Self::ALL, Self::label, s, "time of day")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grid outage severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutageScenario {
    Normal,
    MinorOutage,
    MajorOutage,
    GridFailure,
}

impl OutageScenario {
    pub const ALL: [Self; 4] = [
        Self::Normal,
        Self::MinorOutage,
        Self::MajorOutage,
        Self::GridFailure,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::MinorOutage => "minor_outage",
            Self::MajorOutage => "major_outage",
            Self::GridFailure => "grid_failure",
        }
    }
}

impl FromStr for OutageScenario {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(&Self::ALL, Self::label, s, "outage scenario")
    }
}

impl fmt::Display for OutageScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction label attached to each forecast item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Which quantity a [`ForecastItem`] predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastKind {
    Solar,
    Demand,
    Price,
}

/// Jittered starting values for one engine call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseValues {
    /// Solar generation (kW).
    pub solar: f64,
    /// Household demand (kW).
    pub demand: f64,
    /// Energy price (cents/kWh).
    pub price: f64,
}

/// Solar and demand after weather and time-of-day scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherAdapted {
    pub solar: f64,
    pub demand: f64,
}

/// Grid snapshot handed to the outage response table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    pub current_load: f64,
    pub solar_generation: f64,
    pub weather_condition: WeatherCondition,
    pub outage_scenario: OutageScenario,
}

/// Grid snapshot extended with the scenario's adaptive response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageResponse {
    #[serde(flatten)]
    pub grid: GridData,
    /// Fraction of battery capacity dispatched (0.0 to 1.0).
    pub battery_usage: f64,
    /// Fraction of demand curtailed (0.0 to 1.0).
    pub load_shedding: f64,
    pub emergency_mode: bool,
    /// `current_load * (1 - load_shedding)`.
    pub adapted_load: f64,
    #[serde(rename = "estimatedRecoveryTime")]
    pub estimated_recovery_minutes: u32,
}

/// A single prediction for one quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    #[serde(rename = "type")]
    pub kind: ForecastKind,
    pub current: f64,
    pub predicted: f64,
    #[serde(rename = "confidence")]
    pub confidence_percent: f64,
    /// Wall-clock label of the prediction horizon, e.g. `"3:45 PM"`.
    #[serde(rename = "timeframe")]
    pub timeframe_label: String,
    pub trend: Trend,
}

/// Complete output of one forecast call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBundle {
    /// Solar, demand and price items, in that order.
    pub forecasts: [ForecastItem; 3],
    pub weather_condition: WeatherCondition,
    pub time_of_day: TimeOfDay,
    #[serde(rename = "modelAccuracy")]
    pub model_accuracy_percent: u32,
    pub outage_status: OutageResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TimeOfDay::bucket(at(6, 0)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::bucket(at(11, 59)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::bucket(at(12, 0)), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::bucket(at(15, 59)), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::bucket(at(16, 0)), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::bucket(at(19, 59)), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::bucket(at(20, 0)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::bucket(at(3, 0)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::bucket(at(5, 59)), TimeOfDay::Night);
    }

    #[test]
    fn lenient_labels_fall_back() {
        assert_eq!(
            WeatherCondition::from_label_or_default("hail"),
            WeatherCondition::Sunny
        );
        assert_eq!(
            WeatherCondition::from_label_or_default("Rainy"),
            WeatherCondition::Rainy
        );
        assert_eq!(TimeOfDay::from_label_or_default(""), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_label_or_default("night"), TimeOfDay::Night);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let err = "blizzard".parse::<WeatherCondition>().unwrap_err();
        assert_eq!(err.label, "blizzard");
        assert!("brownout".parse::<OutageScenario>().is_err());
        assert_eq!(
            "grid_failure".parse::<OutageScenario>(),
            Ok(OutageScenario::GridFailure)
        );
    }

    #[test]
    fn enums_serialize_as_snake_case_labels() {
        let json = serde_json::to_string(&OutageScenario::MinorOutage).unwrap();
        assert_eq!(json, "\"minor_outage\"");
        let json = serde_json::to_string(&Trend::Stable).unwrap();
        assert_eq!(json, "\"stable\"");
    }
}
