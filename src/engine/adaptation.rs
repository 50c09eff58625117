//! Weather and time-of-day scaling of base solar and demand values.

use super::types::{BaseValues, TimeOfDay, WeatherAdapted, WeatherCondition};

/// Scale factors for solar generation and household demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub solar: f64,
    pub demand: f64,
}

impl WeatherCondition {
    /// Looks up this condition's scale factors.
    pub const fn multipliers(self) -> Multipliers {
        match self {
            Self::Sunny => Multipliers {
                solar: 1.2,
                demand: 1.1,
            },
            Self::Cloudy => Multipliers {
                solar: 0.6,
                demand: 1.0,
            },
            Self::Rainy => Multipliers {
                solar: 0.3,
                demand: 0.9,
            },
            Self::Stormy => Multipliers {
                solar: 0.1,
                demand: 0.8,
            },
        }
    }
}

impl TimeOfDay {
    /// Looks up this bucket's scale factors. Solar is zero at night.
    pub const fn multipliers(self) -> Multipliers {
        match self {
            Self::Morning => Multipliers {
                solar: 0.4,
                demand: 0.7,
            },
            Self::Noon => Multipliers {
                solar: 1.0,
                demand: 0.8,
            },
            Self::Evening => Multipliers {
                solar: 0.6,
                demand: 1.3,
            },
            Self::Night => Multipliers {
                solar: 0.0,
                demand: 0.6,
            },
        }
    }
}

/// Applies weather and time-of-day multipliers to base values.
///
/// # Arguments
///
/// * `base` - Jittered base values; only `solar` and `demand` are used
/// * `weather` - Current weather condition
/// * `time` - Current time-of-day bucket
///
/// # Returns
///
/// `base.solar * weather.solar * time.solar` and the same for demand.
pub fn adapt(base: &BaseValues, weather: WeatherCondition, time: TimeOfDay) -> WeatherAdapted {
    let w = weather.multipliers();
    let t = time.multipliers();
    WeatherAdapted {
        solar: base.solar * w.solar * t.solar,
        demand: base.demand * w.demand * t.demand,
    }
}
