//! Outage scenario lookup and adaptive load response.

use super::types::{GridData, OutageResponse, OutageScenario};

/// Fixed response parameters for one outage scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseProfile {
    /// Fraction of battery capacity dispatched.
    pub battery_usage: f64,
    /// Fraction of demand curtailed, in `[0, 1]`.
    pub load_shedding: f64,
    pub emergency_mode: bool,
    pub recovery_minutes: u32,
}

impl OutageScenario {
    /// Looks up the response profile for this scenario.
    pub const fn profile(self) -> ResponseProfile {
        match self {
            Self::Normal => ResponseProfile {
                battery_usage: 0.3,
                load_shedding: 0.0,
                emergency_mode: false,
                recovery_minutes: 0,
            },
            Self::MinorOutage => ResponseProfile {
                battery_usage: 0.7,
                load_shedding: 0.2,
                emergency_mode: false,
                recovery_minutes: 15,
            },
            Self::MajorOutage => ResponseProfile {
                battery_usage: 1.0,
                load_shedding: 0.5,
                emergency_mode: true,
                recovery_minutes: 120,
            },
            Self::GridFailure => ResponseProfile {
                battery_usage: 1.0,
                load_shedding: 0.8,
                emergency_mode: true,
                recovery_minutes: 480,
            },
        }
    }
}

/// Applies a scenario's response profile to a grid snapshot.
///
/// The scenario argument drives the lookup; `grid.outage_scenario` is
/// carried through untouched for reporting.
pub fn respond(grid: GridData, scenario: OutageScenario) -> OutageResponse {
    let profile = scenario.profile();
    OutageResponse {
        grid,
        battery_usage: profile.battery_usage,
        load_shedding: profile.load_shedding,
        emergency_mode: profile.emergency_mode,
        adapted_load: grid.current_load * (1.0 - profile.load_shedding),
        estimated_recovery_minutes: profile.recovery_minutes,
    }
}
