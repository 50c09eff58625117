//! Grid forecast and outage-adaptation engine.
//!
//! Every entry point is a pure function of a timestamp, optional overrides
//! and an injected random source. Nothing is cached between calls, so two
//! calls a second apart may report unrelated weather and outage states.

/// Weather and time-of-day multiplier tables.
pub mod adaptation;
pub mod forecast;
/// Feeder status and grid health view.
pub mod grid_health;
/// Outage scenario response table.
pub mod outage;
pub mod types;

pub use adaptation::adapt;
pub use forecast::{ForecastOverrides, generate_forecasts, generate_forecasts_with};
pub use grid_health::{GridHealthView, GridStatus, OutageInfo, derive_grid_health};
pub use outage::respond;
pub use types::{
    ForecastBundle, ForecastItem, ForecastKind, OutageResponse, OutageScenario, TimeOfDay, Trend,
    WeatherCondition,
};
