//! Forecast orchestration: sampling, adaptation and bundle assembly.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use tracing::debug;

use super::adaptation::adapt;
use super::outage::respond;
use super::types::{
    BaseValues, ForecastBundle, ForecastItem, ForecastKind, GridData, OutageScenario, TimeOfDay,
    Trend, WeatherCondition,
};

/// Confidence reported on solar forecasts (%).
pub const SOLAR_CONFIDENCE: u32 = 92;
/// Confidence reported on demand forecasts (%).
pub const DEMAND_CONFIDENCE: u32 = 87;
/// Confidence reported on price forecasts (%).
pub const PRICE_CONFIDENCE: u32 = 84;

const SOLAR_CENTER_KW: f64 = 12.5;
const SOLAR_SPREAD_KW: f64 = 8.0;
const DEMAND_CENTER_KW: f64 = 14.8;
const DEMAND_SPREAD_KW: f64 = 6.0;
const PRICE_CENTER: f64 = 4.25;
const PRICE_SPREAD: f64 = 2.0;

/// Callers may pin weather or outage instead of letting the engine sample them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ForecastOverrides {
    pub weather: Option<WeatherCondition>,
    pub outage: Option<OutageScenario>,
    /// Replaces the bucket derived from `now`; consumes no randomness.
    pub time: Option<TimeOfDay>,
}

/// Mean of the three per-model confidences, rounded. Always 88.
pub fn model_accuracy_percent() -> u32 {
    let sum = SOLAR_CONFIDENCE + DEMAND_CONFIDENCE + PRICE_CONFIDENCE;
    (f64::from(sum) / 3.0).round() as u32
}

/// Draws `center + (u - 0.5) * spread` with `u` uniform in `[0, 1)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, center: f64, spread: f64) -> f64 {
    center + (rng.random::<f64>() - 0.5) * spread
}

/// Samples solar, demand and price base values, in that order.
pub fn sample_base<R: Rng + ?Sized>(rng: &mut R) -> BaseValues {
    let solar = jitter(rng, SOLAR_CENTER_KW, SOLAR_SPREAD_KW);
    let demand = jitter(rng, DEMAND_CENTER_KW, DEMAND_SPREAD_KW);
    let price = jitter(rng, PRICE_CENTER, PRICE_SPREAD);
    BaseValues {
        solar,
        demand,
        price,
    }
}

/// Trend label for a value at a given time of day.
///
/// Morning and evening are always up and night always down; noon is a coin
/// flip. The value itself is not consulted.
pub fn trend<R: Rng + ?Sized>(_value: f64, time: TimeOfDay, rng: &mut R) -> Trend {
    match time {
        TimeOfDay::Morning | TimeOfDay::Evening => Trend::Up,
        TimeOfDay::Night => Trend::Down,
        TimeOfDay::Noon => {
            if rng.random_bool(0.5) {
                Trend::Up
            } else {
                Trend::Down
            }
        }
    }
}

/// 12-hour wall-clock label `minutes` after `now`, e.g. `"3:45 PM"`.
pub fn timeframe_label(now: NaiveDateTime, minutes: i64) -> String {
    (now + Duration::minutes(minutes))
        .format("%-I:%M %p")
        .to_string()
}

/// Produces a forecast bundle with weather and outage sampled uniformly.
pub fn generate_forecasts<R: Rng + ?Sized>(now: NaiveDateTime, rng: &mut R) -> ForecastBundle {
    generate_forecasts_with(now, ForecastOverrides::default(), rng)
}

/// Produces a forecast bundle, sampling only what `overrides` leaves open.
///
/// Random draws happen in a fixed order (weather, outage, base values,
/// solar jitter, solar trend, demand jitter, demand trend), so a seeded
/// generator reproduces the same bundle.
pub fn generate_forecasts_with<R: Rng + ?Sized>(
    now: NaiveDateTime,
    overrides: ForecastOverrides,
    rng: &mut R,
) -> ForecastBundle {
    let time_of_day = overrides.time.unwrap_or_else(|| TimeOfDay::bucket(now));
    let weather = overrides
        .weather
        .unwrap_or_else(|| WeatherCondition::ALL[rng.random_range(0..WeatherCondition::ALL.len())]);
    let scenario = overrides
        .outage
        .unwrap_or_else(|| OutageScenario::ALL[rng.random_range(0..OutageScenario::ALL.len())]);

    let base = sample_base(rng);
    let adapted = adapt(&base, weather, time_of_day);

    let grid = GridData {
        current_load: adapted.demand,
        solar_generation: adapted.solar,
        weather_condition: weather,
        outage_scenario: scenario,
    };
    let outage = respond(grid, scenario);

    debug!(
        %weather,
        %scenario,
        %time_of_day,
        adapted_load = outage.adapted_load,
        "generated forecast"
    );

    let solar = ForecastItem {
        kind: ForecastKind::Solar,
        current: adapted.solar,
        predicted: adapted.solar * (1.0 + (rng.random::<f64>() - 0.5) * 0.3),
        confidence_percent: f64::from(SOLAR_CONFIDENCE),
        timeframe_label: timeframe_label(now, 30),
        trend: trend(adapted.solar, time_of_day, rng),
    };
    let demand = ForecastItem {
        kind: ForecastKind::Demand,
        current: outage.adapted_load,
        predicted: outage.adapted_load * (1.0 + (rng.random::<f64>() - 0.5) * 0.4),
        confidence_percent: f64::from(DEMAND_CONFIDENCE),
        timeframe_label: timeframe_label(now, 60),
        trend: trend(outage.adapted_load, time_of_day, rng),
    };
    let price = ForecastItem {
        kind: ForecastKind::Price,
        current: base.price,
        predicted: base.price * if outage.emergency_mode { 1.5 } else { 1.1 },
        confidence_percent: f64::from(PRICE_CONFIDENCE),
        timeframe_label: timeframe_label(now, 45),
        trend: if outage.emergency_mode {
            Trend::Up
        } else {
            Trend::Stable
        },
    };

    ForecastBundle {
        forecasts: [solar, demand, price],
        weather_condition: weather,
        time_of_day,
        model_accuracy_percent: model_accuracy_percent(),
        outage_status: outage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn model_accuracy_is_constant() {
        assert_eq!(model_accuracy_percent(), 88);
        let mut rng = StdRng::seed_from_u64(7);
        for hour in 0..24 {
            let bundle = generate_forecasts(at(hour, 15), &mut rng);
            assert_eq!(bundle.model_accuracy_percent, 88);
        }
    }

    #[test]
    fn same_seed_same_bundle() {
        let now = at(13, 5);
        let a = generate_forecasts(now, &mut StdRng::seed_from_u64(42));
        let b = generate_forecasts(now, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn base_values_stay_within_jitter_band() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let base = sample_base(&mut rng);
            assert!((8.5..=16.5).contains(&base.solar));
            assert!((11.8..=17.8).contains(&base.demand));
            assert!((3.25..=5.25).contains(&base.price));
        }
    }

    #[test]
    fn items_are_solar_demand_price() {
        let bundle = generate_forecasts(at(9, 0), &mut StdRng::seed_from_u64(1));
        let kinds: Vec<_> = bundle.forecasts.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![ForecastKind::Solar, ForecastKind::Demand, ForecastKind::Price]
        );
        assert_eq!(bundle.forecasts[0].confidence_percent, 92.0);
        assert_eq!(bundle.forecasts[1].confidence_percent, 87.0);
        assert_eq!(bundle.forecasts[2].confidence_percent, 84.0);
    }

    #[test]
    fn demand_item_reports_adapted_load() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let bundle = generate_forecasts(at(17, 30), &mut rng);
            assert_eq!(bundle.forecasts[1].current, bundle.outage_status.adapted_load);
            assert_eq!(
                bundle.forecasts[0].current,
                bundle.outage_status.grid.solar_generation
            );
        }
    }

    #[test]
    fn time_override_replaces_clock_bucket() {
        let overrides = ForecastOverrides {
            time: Some(TimeOfDay::Noon),
            ..ForecastOverrides::default()
        };
        let pinned = generate_forecasts_with(at(22, 0), overrides, &mut StdRng::seed_from_u64(21));
        let at_noon = generate_forecasts(at(13, 0), &mut StdRng::seed_from_u64(21));

        assert_eq!(pinned.time_of_day, TimeOfDay::Noon);
        assert_eq!(pinned.forecasts[0].current, at_noon.forecasts[0].current);
        assert!(pinned.forecasts[0].current > 0.0);
        assert_eq!(pinned.forecasts[0].timeframe_label, "10:30 PM");
    }

    #[test]
    fn emergency_marks_price_up_at_premium() {
        let overrides = ForecastOverrides {
            outage: Some(OutageScenario::MajorOutage),
            ..ForecastOverrides::default()
        };
        let bundle = generate_forecasts_with(at(10, 0), overrides, &mut StdRng::seed_from_u64(5));
        let price = &bundle.forecasts[2];
        assert_eq!(price.trend, Trend::Up);
        assert!((price.predicted - price.current * 1.5).abs() < 1e-9);
    }

    #[test]
    fn calm_grid_marks_price_stable() {
        let overrides = ForecastOverrides {
            outage: Some(OutageScenario::Normal),
            ..ForecastOverrides::default()
        };
        let bundle = generate_forecasts_with(at(10, 0), overrides, &mut StdRng::seed_from_u64(5));
        let price = &bundle.forecasts[2];
        assert_eq!(price.trend, Trend::Stable);
        assert!((price.predicted - price.current * 1.1).abs() < 1e-9);
    }

    #[test]
    fn overrides_pin_weather_and_outage() {
        let overrides = ForecastOverrides {
            weather: Some(WeatherCondition::Stormy),
            outage: Some(OutageScenario::MinorOutage),
            time: None,
        };
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let bundle = generate_forecasts_with(at(22, 0), overrides, &mut rng);
            assert_eq!(bundle.weather_condition, WeatherCondition::Stormy);
            assert_eq!(
                bundle.outage_status.grid.outage_scenario,
                OutageScenario::MinorOutage
            );
            assert_eq!(bundle.forecasts[0].current, 0.0);
        }
    }

    #[test]
    fn trend_follows_time_of_day() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(trend(1.0, TimeOfDay::Morning, &mut rng), Trend::Up);
        assert_eq!(trend(1.0, TimeOfDay::Evening, &mut rng), Trend::Up);
        assert_eq!(trend(1.0, TimeOfDay::Night, &mut rng), Trend::Down);
        for _ in 0..20 {
            assert_ne!(trend(1.0, TimeOfDay::Noon, &mut rng), Trend::Stable);
        }
    }

    #[test]
    fn timeframe_uses_twelve_hour_clock() {
        assert_eq!(timeframe_label(at(15, 15), 30), "3:45 PM");
        assert_eq!(timeframe_label(at(23, 30), 45), "12:15 AM");
        assert_eq!(timeframe_label(at(9, 5), 60), "10:05 AM");
    }
}
