//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::debug;

use super::AppState;
use super::types::{
    DEFAULT_HISTORY_LIMIT, ErrorResponse, ForecastQuery, HealthResponse, HistoryQuery,
    HistoryResponse, RootResponse,
};
use crate::engine::{
    ForecastBundle, GridHealthView, derive_grid_health, generate_forecasts,
    generate_forecasts_with,
};
use crate::history::{ForecastSummary, GridHealthSummary, SummaryStore};
use crate::market::MarketSnapshot;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// `GET /` → 200 + service banner
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Neighborhood grid forecast server is running",
        api: "/api",
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// `GET /api/health` → 200 + `{status, timestamp}`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// Generates a forecast bundle and records its summary.
///
/// `GET /api/forecasts` → 200 + `ForecastBundle` JSON
/// `GET /api/forecasts?weather=rainy&outage=grid_failure&time=evening` → pinned scenario
/// `GET /api/forecasts?outage=brownout` → 400 + `ErrorResponse`
pub async fn get_forecasts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastBundle>, ApiError> {
    let overrides = query.overrides().map_err(bad_request)?;
    let now = state.now();

    let bundle = {
        let mut rng = state.rng();
        generate_forecasts_with(now, overrides, &mut *rng)
    };

    state
        .history()
        .record_forecast(ForecastSummary::from_bundle(&bundle, now));

    Ok(Json(bundle))
}

/// Derives grid health from a fresh forecast and records its summary.
///
/// `GET /api/grid-health` → 200 + `GridHealthView` JSON
pub async fn get_grid_health(State(state): State<Arc<AppState>>) -> Json<GridHealthView> {
    let now = state.now();

    let view = {
        let mut rng = state.rng();
        let bundle = generate_forecasts(now, &mut *rng);
        derive_grid_health(&bundle, now, &mut *rng)
    };
    debug!(status = view.status.label(), load = view.current_load, "grid health");

    state
        .history()
        .record_grid_health(GridHealthSummary::from(&view));

    Json(view)
}

/// `GET /api/trades` → 200 + `MarketSnapshot` JSON
pub async fn get_trades(State(state): State<Arc<AppState>>) -> Json<MarketSnapshot> {
    let mut rng = state.rng();
    Json(state.trades.snapshot(&mut *rng))
}

/// Returns recorded summaries, newest first.
///
/// `GET /api/history` → 200 + up to 20 of each kind
/// `GET /api/history?limit=N` → up to N of each kind
/// `GET /api/history?limit=0` → 400 + `ErrorResponse`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 {
        return Err(bad_request("`limit` must be > 0".to_string()));
    }

    let history = state.history();
    Ok(Json(HistoryResponse {
        forecasts: history.recent_forecasts(limit),
        grid_health: history.recent_grid_health(limit),
    }))
}
