//! API response and query types.
//!
//! Engine and market payloads are serialized as-is; the types here cover
//! query strings and the service's own envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{ForecastOverrides, OutageScenario, TimeOfDay, WeatherCondition};
use crate::history::{ForecastSummary, GridHealthSummary};

/// Default number of summaries returned by `/api/history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Optional what-if pins for `/api/forecasts`.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Weather label; unknown labels fall back to sunny.
    pub weather: Option<String>,
    /// Outage scenario label; must be one of the known scenarios.
    pub outage: Option<String>,
    /// Time-of-day label; unknown labels fall back to noon.
    pub time: Option<String>,
}

impl ForecastQuery {
    /// Resolves the query into engine overrides.
    ///
    /// # Errors
    ///
    /// Returns a message if `outage` is not a known scenario label.
    pub fn overrides(&self) -> Result<ForecastOverrides, String> {
        let outage = self
            .outage
            .as_deref()
            .map(str::parse::<OutageScenario>)
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(ForecastOverrides {
            weather: self
                .weather
                .as_deref()
                .map(WeatherCondition::from_label_or_default),
            outage,
            time: self.time.as_deref().map(TimeOfDay::from_label_or_default),
        })
    }
}

/// Optional page size for `/api/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Recent summaries, newest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub forecasts: Vec<ForecastSummary>,
    pub grid_health: Vec<GridHealthSummary>,
}

/// `GET /api/health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /` body.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub api: &'static str,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
