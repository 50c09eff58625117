//! Forecast and grid-health backend for a peer-to-peer neighbourhood
//! energy-trading dashboard.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// Forecast and outage-adaptation engine.
pub mod engine;
pub mod history;
pub mod io;
pub mod logging;
/// Trade book and market snapshot.
pub mod market;
