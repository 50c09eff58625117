//! Peer-to-peer trade book and the market snapshot served with it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Most recent trades included in a snapshot.
pub const SNAPSHOT_TRADE_LIMIT: usize = 15;

const MARKET_PRICE_FLOOR: f64 = 3.8;
const MARKET_PRICE_SPREAD: f64 = 1.4;
const BASE_BALANCE: f64 = 245.80;
const BALANCE_SPREAD: f64 = 50.0;

/// Lifecycle state of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Active,
    Pending,
    Completed,
    Cancelled,
}

impl TradeStatus {
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Pending,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| {
                format!(
                    "unknown trade status \"{s}\", expected one of: active, pending, completed, cancelled"
                )
            })
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored trade between two houses.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: u64,
    pub seller_id: u64,
    pub buyer_id: u64,
    /// Energy traded (kWh).
    pub amount: f64,
    /// Agreed price (cents/kWh).
    pub price_per_kwh: f64,
    pub status: TradeStatus,
    pub created_at: NaiveDateTime,
}

/// Trade as shown on the trading panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeView {
    /// e.g. `"T12"`.
    pub id: String,
    /// e.g. `"House 3"`.
    pub seller: String,
    pub buyer: String,
    pub amount: f64,
    pub price: f64,
    /// 24-hour `HH:MM` of creation.
    pub timestamp: String,
    pub status: TradeStatus,
}

impl From<&TradeRecord> for TradeView {
    fn from(t: &TradeRecord) -> Self {
        Self {
            id: format!("T{}", t.id),
            seller: format!("House {}", t.seller_id),
            buyer: format!("House {}", t.buyer_id),
            amount: t.amount,
            price: t.price_per_kwh,
            timestamp: t.created_at.format("%H:%M").to_string(),
            status: t.status,
        }
    }
}

/// Trades endpoint payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub trades: Vec<TradeView>,
    /// Rounded to two decimals.
    pub market_price: f64,
    /// Completed volume (kWh), rounded to one decimal.
    pub total_volume: f64,
    pub your_balance: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// In-memory trade book.
#[derive(Debug, Clone, Default)]
pub struct TradeBook {
    trades: Vec<TradeRecord>,
}

impl TradeBook {
    pub fn new(trades: Vec<TradeRecord>) -> Self {
        Self { trades }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Total completed volume across the whole book (kWh).
    pub fn completed_volume(&self) -> f64 {
        self.trades
            .iter()
            .filter(|t| t.status == TradeStatus::Completed)
            .map(|t| t.amount)
            .sum()
    }

    /// Builds the market snapshot.
    ///
    /// Trades are listed newest first and capped at [`SNAPSHOT_TRADE_LIMIT`].
    /// The market price is drawn from `rng` before the balance.
    pub fn snapshot<R: Rng + ?Sized>(&self, rng: &mut R) -> MarketSnapshot {
        let mut recent: Vec<&TradeRecord> = self.trades.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let market_price = MARKET_PRICE_FLOOR + rng.random::<f64>() * MARKET_PRICE_SPREAD;
        let your_balance = BASE_BALANCE + (rng.random::<f64>() - 0.5) * BALANCE_SPREAD;

        MarketSnapshot {
            trades: recent
                .into_iter()
                .take(SNAPSHOT_TRADE_LIMIT)
                .map(TradeView::from)
                .collect(),
            market_price: round_to(market_price, 2),
            total_volume: round_to(self.completed_volume(), 1),
            your_balance,
        }
    }
}
