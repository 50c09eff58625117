//! Feeder health view derived from a forecast bundle.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::warn;

use super::types::{ForecastBundle, OutageResponse, OutageScenario};

/// Nominal feeder capacity reported alongside utilization.
pub const FEEDER_LIMIT: f64 = 60.0;

/// Load shedding above this fraction puts a non-emergency grid into warning.
const WARNING_SHEDDING: f64 = 0.1;

/// Overall feeder status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStatus {
    Optimal,
    Warning,
    Critical,
}

impl GridStatus {
    /// Critical in emergency mode, warning when shedding more than 10% of
    /// load, optimal otherwise.
    pub fn from_outage(outage: &OutageResponse) -> Self {
        if outage.emergency_mode {
            Self::Critical
        } else if outage.load_shedding > WARNING_SHEDDING {
            Self::Warning
        } else {
            Self::Optimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Human-readable outage details, only present in emergency mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutageInfo {
    pub scenario: OutageScenario,
    /// e.g. `"120 minutes"`.
    pub estimated_recovery: String,
    /// e.g. `"100%"`.
    pub battery_usage: String,
}

impl OutageInfo {
    fn from_outage(outage: &OutageResponse) -> Self {
        Self {
            scenario: outage.grid.outage_scenario,
            estimated_recovery: format!("{} minutes", outage.estimated_recovery_minutes),
            battery_usage: format!("{}%", (outage.battery_usage * 100.0).round()),
        }
    }
}

/// Feeder-level snapshot served to the grid health panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHealthView {
    #[serde(rename = "feederUtilization")]
    pub feeder_utilization_percent: f64,
    pub feeder_limit: f64,
    pub current_load: f64,
    pub status: GridStatus,
    pub peak_prediction: f64,
    /// e.g. `"4h 17m"`.
    pub time_to_next_peak: String,
    pub outage_info: Option<OutageInfo>,
    /// Instant of derivation; serialized as RFC 3339 UTC.
    pub timestamp: DateTime<Utc>,
}

/// Converts a local wall-clock time to UTC.
///
/// Ambiguous times take the earlier offset; times skipped by a DST jump are
/// read as UTC.
fn local_to_utc(now: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&now)
        .earliest()
        .map_or_else(|| now.and_utc(), |t| t.with_timezone(&Utc))
}

/// Derives the grid health view from a bundle's outage status.
///
/// Utilization, peak multiplier and time-to-peak are drawn from `rng` in
/// that order; utilization is independent of the bundle's load.
pub fn derive_grid_health<R: Rng + ?Sized>(
    bundle: &ForecastBundle,
    now: NaiveDateTime,
    rng: &mut R,
) -> GridHealthView {
    let outage = &bundle.outage_status;
    let current_load = outage.adapted_load;
    let status = GridStatus::from_outage(outage);

    let feeder_utilization_percent = 30.0 + rng.random::<f64>() * 30.0;
    let peak_prediction = current_load * (1.2 + rng.random::<f64>() * 0.4);
    let hours = rng.random_range(2..8_u32);
    let minutes = rng.random_range(0..60_u32);

    let outage_info = outage.emergency_mode.then(|| OutageInfo::from_outage(outage));
    if let Some(info) = &outage_info {
        warn!(
            scenario = %info.scenario,
            recovery = %info.estimated_recovery,
            "grid in emergency mode"
        );
    }

    GridHealthView {
        feeder_utilization_percent,
        feeder_limit: FEEDER_LIMIT,
        current_load,
        status,
        peak_prediction,
        time_to_next_peak: format!("{hours}h {minutes}m"),
        outage_info,
        timestamp: local_to_utc(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::forecast::{ForecastOverrides, generate_forecasts_with};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(14, 20, 0))
            .expect("valid timestamp")
    }

    fn health_for(scenario: OutageScenario, seed: u64) -> GridHealthView {
        let mut rng = StdRng::seed_from_u64(seed);
        let overrides = ForecastOverrides {
            outage: Some(scenario),
            ..ForecastOverrides::default()
        };
        let bundle = generate_forecasts_with(now(), overrides, &mut rng);
        derive_grid_health(&bundle, now(), &mut rng)
    }

    #[test]
    fn status_follows_scenario() {
        assert_eq!(
            health_for(OutageScenario::Normal, 1).status,
            GridStatus::Optimal
        );
        assert_eq!(
            health_for(OutageScenario::MinorOutage, 1).status,
            GridStatus::Warning
        );
        assert_eq!(
            health_for(OutageScenario::MajorOutage, 1).status,
            GridStatus::Critical
        );
        assert_eq!(
            health_for(OutageScenario::GridFailure, 1).status,
            GridStatus::Critical
        );
    }

    #[test]
    fn outage_info_only_in_emergency() {
        assert!(health_for(OutageScenario::Normal, 2).outage_info.is_none());
        assert!(health_for(OutageScenario::MinorOutage, 2).outage_info.is_none());

        let info = health_for(OutageScenario::GridFailure, 2)
            .outage_info
            .expect("grid failure reports outage info");
        assert_eq!(info.scenario, OutageScenario::GridFailure);
        assert_eq!(info.estimated_recovery, "480 minutes");
        assert_eq!(info.battery_usage, "100%");
    }

    #[test]
    fn sampled_fields_stay_in_range() {
        for seed in 0..200 {
            let view = health_for(OutageScenario::ALL[(seed % 4) as usize], seed);
            assert!((30.0..60.0).contains(&view.feeder_utilization_percent));
            assert_eq!(view.feeder_limit, 60.0);
            assert!(view.peak_prediction >= view.current_load * 1.2 - 1e-9);
            assert!(view.peak_prediction <= view.current_load * 1.6 + 1e-9);

            let (h, m) = view
                .time_to_next_peak
                .strip_suffix('m')
                .and_then(|s| s.split_once("h "))
                .expect("label shaped like `Nh Mm`");
            let h: u32 = h.parse().expect("hours");
            let m: u32 = m.parse().expect("minutes");
            assert!((2..8).contains(&h));
            assert!(m < 60);
        }
    }

    #[test]
    fn current_load_is_adapted_load() {
        let mut rng = StdRng::seed_from_u64(8);
        let bundle = generate_forecasts_with(now(), ForecastOverrides::default(), &mut rng);
        let view = derive_grid_health(&bundle, now(), &mut rng);
        assert_eq!(view.current_load, bundle.outage_status.adapted_load);
        assert_eq!(view.timestamp.with_timezone(&Local).naive_local(), now());
    }

    #[test]
    fn serializes_dashboard_keys_and_utc_timestamp() {
        let view = health_for(OutageScenario::Normal, 4);
        let json = serde_json::to_value(&view).expect("serialize");
        assert!(json["feederUtilization"].is_number());
        assert!(json.get("feederUtilizationPercent").is_none());
        assert!(json.get("timeToNextPeak").is_some());
        let ts = json["timestamp"].as_str().expect("timestamp string");
        assert!(ts.ends_with('Z'), "expected UTC timestamp, got {ts}");
        assert_eq!(json["status"], "optimal");
        assert!(json["outageInfo"].is_null());
    }
}
