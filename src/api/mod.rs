//! REST API for forecasts, grid health and the trade book.
//!
//! Endpoints:
//! - `/` and `/api/health` for liveness
//! - `/api/forecasts` for the forecast bundle
//! - `/api/grid-health` for the feeder view
//! - `/api/trades` for the market snapshot
//! - `/api/history` for recorded summaries

mod handlers;
pub mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::routing::get;
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::history::InMemoryHistory;
use crate::market::TradeBook;

/// Errors from binding or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Application state shared across all request handlers.
///
/// The random source and history sit behind their own mutexes; handlers
/// hold each lock only for a synchronous engine call or a single record.
pub struct AppState {
    rng: Mutex<StdRng>,
    history: Mutex<InMemoryHistory>,
    /// Seeded trade book; read-only once serving.
    pub trades: TradeBook,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl AppState {
    /// Creates state that reads the local wall clock.
    pub fn new(rng: StdRng, history: InMemoryHistory, trades: TradeBook) -> Self {
        Self {
            rng: Mutex::new(rng),
            history: Mutex::new(history),
            trades,
            clock: local_now,
        }
    }

    /// Replaces the wall clock, e.g. with a fixed instant in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Current local time according to the configured clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Locks the shared random source.
    pub fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the summary history.
    pub fn history(&self) -> MutexGuard<'_, InMemoryHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/forecasts", get(handlers::get_forecasts))
        .route("/api/grid-health", get(handlers::get_grid_health))
        .route("/api/trades", get(handlers::get_trades))
        .route("/api/history", get(handlers::get_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds to the given address and serves the API until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns a `ServerError` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), ServerError> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;
    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
