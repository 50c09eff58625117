//! TOML-based service configuration and preset definitions.

use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::market::{TradeBook, TradeRecord, TradeStatus};

/// Top-level service configuration parsed from TOML.
///
/// All sections have defaults matching the `default` preset. Load from
/// TOML with [`ServiceConfig::from_toml_file`] or pick a preset with
/// [`ServiceConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Random source for the forecast engine.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Summary history retention and export.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Seed trades for the trade book.
    #[serde(default)]
    pub market: MarketConfig,
}

/// Listen address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// IP address to bind (e.g. `"0.0.0.0"`).
    pub bind: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Random source for the forecast engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Fixed seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

/// Summary history retention and export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum summaries kept per kind (must be > 0).
    pub capacity: usize,
    /// CSV file written on shutdown, if set.
    pub export_path: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            export_path: None,
        }
    }
}

/// Seed trades for the trade book.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    pub trades: Vec<TradeConfig>,
}

/// One seeded trade.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradeConfig {
    pub id: u64,
    pub seller_id: u64,
    pub buyer_id: u64,
    /// Energy traded (kWh, must be > 0).
    pub amount: f64,
    /// Price (cents/kWh, must be > 0).
    pub price_per_kwh: f64,
    /// `"active"`, `"pending"`, `"completed"` or `"cancelled"`.
    #[serde(default = "default_trade_status")]
    pub status: String,
    /// Local date-time, written bare (`2026-10-18T09:30:00`) or quoted.
    #[serde(deserialize_with = "deserialize_local_datetime")]
    pub created_at: NaiveDateTime,
}

struct LocalDateTimeVisitor;

impl<'de> Visitor<'de> for LocalDateTimeVisitor {
    type Value = NaiveDateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a local date-time such as 2026-10-18T09:30:00")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<NaiveDateTime, E> {
        s.parse::<NaiveDateTime>()
            .map_err(|e| E::custom(format!("\"{s}\" is not a local date-time: {e}")))
    }

    // TOML date-time literals arrive as a single-entry map.
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<NaiveDateTime, A::Error> {
        let dt = toml::value::Datetime::deserialize(MapAccessDeserializer::new(map))?;
        self.visit_str(&dt.to_string())
    }
}

fn deserialize_local_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    deserializer.deserialize_any(LocalDateTimeVisitor)
}

fn default_trade_status() -> String {
    "active".to_string()
}

/// Configuration error with field path and constraint description.
#[derive(Debug, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"history.capacity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ServiceConfig {
    /// Returns the `demo` preset: fixed seed and a handful of trades.
    pub fn demo() -> Self {
        let trade = |id, seller_id, buyer_id, amount, price_per_kwh, status: &str, at: &str| {
            TradeConfig {
                id,
                seller_id,
                buyer_id,
                amount,
                price_per_kwh,
                status: status.to_string(),
                created_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S")
                    .unwrap_or_default(),
            }
        };

        Self {
            engine: EngineConfig { seed: Some(42) },
            market: MarketConfig {
                trades: vec![
                    trade(1, 1, 2, 5.5, 4.10, "completed", "2026-10-18T07:45:00"),
                    trade(2, 3, 1, 2.0, 4.35, "completed", "2026-10-18T09:10:00"),
                    trade(3, 4, 2, 3.2, 4.20, "active", "2026-10-18T10:05:00"),
                    trade(4, 2, 5, 1.8, 4.55, "pending", "2026-10-18T11:30:00"),
                    trade(5, 5, 3, 4.4, 3.95, "completed", "2026-10-18T12:50:00"),
                ],
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "demo"];

    /// Loads configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "demo" => Ok(Self::demo()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies environment overrides; `PORT` replaces `server.port`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `PORT` is set but not a valid `u16`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError {
                field: "PORT".to_string(),
                message: format!("\"{port}\" is not a valid port"),
            })?;
        }
        Ok(())
    }

    /// Resolves the listen socket address.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `server.bind` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.bind.parse().map_err(|_| ConfigError {
            field: "server.bind".to_string(),
            message: format!("\"{}\" is not an IP address", self.server.bind),
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Builds the trade book from the seeded trades.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for the first trade with an unknown status.
    pub fn trade_book(&self) -> Result<TradeBook, ConfigError> {
        let trades = self
            .market
            .trades
            .iter()
            .enumerate()
            .map(|(i, t)| -> Result<TradeRecord, ConfigError> {
                let status: TradeStatus = t.status.parse().map_err(|message| ConfigError {
                    field: format!("market.trades[{i}].status"),
                    message,
                })?;
                Ok(TradeRecord {
                    id: t.id,
                    seller_id: t.seller_id,
                    buyer_id: t.buyer_id,
                    amount: t.amount,
                    price_per_kwh: t.price_per_kwh,
                    status,
                    created_at: t.created_at,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(TradeBook::new(trades))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.socket_addr() {
            errors.push(e);
        }

        if self.history.capacity == 0 {
            errors.push(ConfigError {
                field: "history.capacity".into(),
                message: "must be > 0".into(),
            });
        }
        if self
            .history
            .export_path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            errors.push(ConfigError {
                field: "history.export_path".into(),
                message: "must not be empty when set".into(),
            });
        }

        for (i, t) in self.market.trades.iter().enumerate() {
            if t.amount <= 0.0 {
                errors.push(ConfigError {
                    field: format!("market.trades[{i}].amount"),
                    message: "must be > 0".into(),
                });
            }
            if t.price_per_kwh <= 0.0 {
                errors.push(ConfigError {
                    field: format!("market.trades[{i}].price_per_kwh"),
                    message: "must be > 0".into(),
                });
            }
            if let Err(message) = t.status.parse::<TradeStatus>() {
                errors.push(ConfigError {
                    field: format!("market.trades[{i}].status"),
                    message,
                });
            }
        }

        errors
    }
}
