//! Shared test fixtures for integration tests.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;

use neighborgrid::config::ServiceConfig;
use neighborgrid::history::InMemoryHistory;

/// A fixed local timestamp on the given hour and minute.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

/// Seeded random source used across integration tests.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fixed clock at 12:30, inside the noon bucket.
pub fn noon_clock() -> NaiveDateTime {
    at(12, 30)
}

/// API state built from the `demo` preset with a fixed clock.
#[cfg(feature = "api")]
pub fn demo_state() -> Arc<neighborgrid::api::AppState> {
    let cfg = ServiceConfig::demo();
    let trades = cfg.trade_book().expect("demo trades are valid");
    Arc::new(
        neighborgrid::api::AppState::new(
            seeded(cfg.engine.seed.unwrap_or(42)),
            InMemoryHistory::new(cfg.history.capacity),
            trades,
        )
        .with_clock(noon_clock),
    )
}
