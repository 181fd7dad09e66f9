// src/domain/models.rs
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Market metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Venue pair id, e.g. "eth_btc"
    pub id: String,
    /// Canonical symbol, e.g. "ETH/BTC"
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub base_id: String,
    pub quote_id: String,
    pub precision: Precision,
    pub limits: Limits,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub active: bool,
}

impl Market {
    /// Truncate an amount to the venue's amount precision.
    pub fn amount_to_precision(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.precision.amount, RoundingStrategy::ToZero)
    }

    /// Round a price to the venue's price precision.
    pub fn price_to_precision(&self, price: Decimal) -> Decimal {
        price.round_dp_with_strategy(self.precision.price, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Decimal places accepted by the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub amount: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
}

impl OrderStatus {
    /// Closed and canceled orders never change status again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Closed => write!(f, "closed"),
            OrderStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// Canonical order record.
///
/// `amount` is the originally requested quantity. The venue does not echo it
/// after creation, so it stays `None` until this process learns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Decimal,
    pub amount: Option<Decimal>,
    pub filled: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub status: OrderStatus,
    /// Milliseconds since epoch
    pub created_at: Option<i64>,
    pub raw: Value,
}

impl Order {
    /// Derive `filled` and `cost` from `amount` and `remaining` when both are known.
    pub fn recompute_fills(&mut self) {
        if let (Some(amount), Some(remaining)) = (self.amount, self.remaining) {
            let filled = amount - remaining;
            self.filled = Some(filled);
            self.cost = Some(self.price * filled);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub free: Option<Decimal>,
    pub used: Option<Decimal>,
    pub total: Option<Decimal>,
}

/// Account balances keyed by canonical currency code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub currencies: BTreeMap<String, Balance>,
    pub timestamp: Option<i64>,
    pub raw: Value,
}

impl Balances {
    pub fn get(&self, currency: &str) -> Option<&Balance> {
        self.currencies.get(currency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Option<String>,
    /// Weak reference to the order that produced this fill
    pub order_id: Option<String>,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub amount: Decimal,
    pub cost: Decimal,
    /// Milliseconds since epoch
    pub timestamp: Option<i64>,
    pub raw: Value,
}

/// 24h ticker. Fields the venue does not report stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub timestamp: Option<i64>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub vwap: Option<Decimal>,
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
    pub last: Option<Decimal>,
    pub change: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub average: Option<Decimal>,
    pub base_volume: Option<Decimal>,
    pub quote_volume: Option<Decimal>,
    pub raw: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    /// Best (highest) bid first
    pub bids: Vec<BookLevel>,
    /// Best (lowest) ask first
    pub asks: Vec<BookLevel>,
    pub timestamp: Option<i64>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub currency: String,
    pub address: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Option<String>,
    pub currency: String,
    pub amount_sent: Option<Decimal>,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub transaction_id: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemedCoupon {
    pub currency: String,
    pub amount: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub raw: Value,
}
