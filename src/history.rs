//! Bounded record of forecast and grid-health summaries.
//!
//! Stands in for the dashboard's database tables: the HTTP layer records a
//! flattened summary of every response it serves, and the history can be
//! exported as CSV on shutdown.

use std::collections::VecDeque;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::engine::{ForecastBundle, GridHealthView};

/// Flattened forecast row, keyed on the first (solar) item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub forecast_type: String,
    pub current_value: f64,
    pub predicted_value: f64,
    /// Model accuracy at the time of the forecast (%).
    pub confidence: f64,
    pub weather_condition: String,
    pub recorded_at: NaiveDateTime,
}

impl ForecastSummary {
    pub fn from_bundle(bundle: &ForecastBundle, recorded_at: NaiveDateTime) -> Self {
        let first = &bundle.forecasts[0];
        Self {
            forecast_type: "prediction".to_string(),
            current_value: first.current,
            predicted_value: first.predicted,
            confidence: f64::from(bundle.model_accuracy_percent),
            weather_condition: bundle.weather_condition.label().to_string(),
            recorded_at,
        }
    }
}

/// Flattened grid health row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridHealthSummary {
    pub feeder_utilization: f64,
    pub feeder_limit: f64,
    pub current_load: f64,
    pub status: String,
    pub peak_prediction: f64,
    pub recorded_at: NaiveDateTime,
}

impl From<&GridHealthView> for GridHealthSummary {
    fn from(view: &GridHealthView) -> Self {
        Self {
            feeder_utilization: view.feeder_utilization_percent,
            feeder_limit: view.feeder_limit,
            current_load: view.current_load,
            status: view.status.label().to_string(),
            peak_prediction: view.peak_prediction,
            recorded_at: view.timestamp.with_timezone(&Local).naive_local(),
        }
    }
}

/// Storage seam for served summaries.
pub trait SummaryStore {
    /// Appends a forecast summary.
    fn record_forecast(&mut self, summary: ForecastSummary);

    /// Appends a grid health summary.
    fn record_grid_health(&mut self, summary: GridHealthSummary);

    /// Returns up to `limit` forecast summaries, newest first.
    fn recent_forecasts(&self, limit: usize) -> Vec<ForecastSummary>;

    /// Returns up to `limit` grid health summaries, newest first.
    fn recent_grid_health(&self, limit: usize) -> Vec<GridHealthSummary>;
}

/// In-process FIFO history; the oldest entry is dropped once `capacity`
/// is reached.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    capacity: usize,
    forecasts: VecDeque<ForecastSummary>,
    grid_health: VecDeque<GridHealthSummary>,
}

impl InMemoryHistory {
    /// Creates an empty history.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be > 0");
        Self {
            capacity,
            forecasts: VecDeque::with_capacity(capacity),
            grid_health: VecDeque::with_capacity(capacity),
        }
    }

    /// All forecast summaries, oldest first.
    pub fn forecasts(&self) -> impl Iterator<Item = &ForecastSummary> {
        self.forecasts.iter()
    }

    /// All grid health summaries, oldest first.
    pub fn grid_health(&self) -> impl Iterator<Item = &GridHealthSummary> {
        self.grid_health.iter()
    }

    /// True when nothing of either kind has been recorded.
    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty() && self.grid_health.is_empty()
    }
}

fn push_bounded<T>(buf: &mut VecDeque<T>, capacity: usize, item: T) {
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(item);
}

impl SummaryStore for InMemoryHistory {
    fn record_forecast(&mut self, summary: ForecastSummary) {
        push_bounded(&mut self.forecasts, self.capacity, summary);
    }

    fn record_grid_health(&mut self, summary: GridHealthSummary) {
        push_bounded(&mut self.grid_health, self.capacity, summary);
    }

    fn recent_forecasts(&self, limit: usize) -> Vec<ForecastSummary> {
        self.forecasts.iter().rev().take(limit).cloned().collect()
    }

    fn recent_grid_health(&self, limit: usize) -> Vec<GridHealthSummary> {
        self.grid_health.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|d| d.and_hms_opt(12, minute, 0))
            .expect("valid timestamp")
    }

    fn forecast(minute: u32) -> ForecastSummary {
        ForecastSummary {
            forecast_type: "prediction".to_string(),
            current_value: f64::from(minute),
            predicted_value: 1.0,
            confidence: 88.0,
            weather_condition: "sunny".to_string(),
            recorded_at: ts(minute),
        }
    }

    #[test]
    fn drops_oldest_past_capacity() {
        let mut history = InMemoryHistory::new(3);
        for m in 0..5 {
            history.record_forecast(forecast(m));
        }
        let kept: Vec<f64> = history.forecasts().map(|f| f.current_value).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let mut history = InMemoryHistory::new(10);
        for m in 0..4 {
            history.record_forecast(forecast(m));
        }
        let recent = history.recent_forecasts(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].recorded_at, ts(3));
        assert_eq!(recent[1].recorded_at, ts(2));
        assert!(history.recent_grid_health(5).is_empty());
    }

    #[test]
    fn is_empty_until_either_kind_recorded() {
        let mut history = InMemoryHistory::new(2);
        assert!(history.is_empty());

        history.record_grid_health(GridHealthSummary {
            feeder_utilization: 40.0,
            feeder_limit: 60.0,
            current_load: 8.0,
            status: "optimal".to_string(),
            peak_prediction: 10.0,
            recorded_at: ts(1),
        });
        assert!(!history.is_empty());
        assert_eq!(history.forecasts().count(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn zero_capacity_panics() {
        let _ = InMemoryHistory::new(0);
    }
}
