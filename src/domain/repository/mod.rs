// src/domain/repository/mod.rs
// Ports between the domain and the venue/infrastructure

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::errors::ExchangeResult;
use crate::domain::models::{
    Balances, DepositAddress, Market, Order, OrderBook, OrderSide, OrderType, Ticker, Trade,
    Withdrawal,
};

/// Ordered request parameters
pub type Params = Vec<(String, String)>;

/// Raw HTTP reply handed back by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport used for every venue call. Retries and pacing live here, not in callers.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> ExchangeResult<HttpResponse>;

    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> ExchangeResult<HttpResponse>;
}

/// Signed, classified access to the venue's private endpoints.
///
/// Returns the `return` payload of a successful envelope.
#[async_trait]
pub trait PrivateApi: Send + Sync {
    async fn private_call(&self, method: &str, params: Params) -> ExchangeResult<Value>;
}

/// Wall clock in milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Symbol and venue-id resolution backed by loaded market metadata
pub trait MarketLookup {
    fn market(&self, symbol: &str) -> ExchangeResult<&Market>;

    /// Canonical symbol for a venue pair id. Unlisted ids still resolve to a derived symbol.
    fn symbol_for_id(&self, id: &str) -> String;

    /// Canonical currency code for a venue currency id
    fn currency_code(&self, id: &str) -> String;
}

/// Order cache owned by the reconciler
pub trait OrderStore: Send {
    fn get(&self, id: &str) -> Option<&Order>;

    fn get_mut(&mut self, id: &str) -> Option<&mut Order>;

    /// Insert or replace the entry keyed by `order.id`
    fn upsert(&mut self, order: Order);

    fn ids(&self) -> Vec<String>;

    fn orders(&self) -> Vec<Order>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical trading interface
#[async_trait]
pub trait ExchangeRepository: Send + Sync {
    /// Load market metadata, refreshing it when `reload` is set
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<Market>>;

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker>;

    async fn fetch_tickers(&self, symbols: &[String]) -> ExchangeResult<Vec<Ticker>>;

    async fn fetch_order_book(&self, symbol: &str, limit: Option<u32>) -> ExchangeResult<OrderBook>;

    async fn fetch_trades(&self, symbol: &str, limit: Option<u32>) -> ExchangeResult<Vec<Trade>>;

    async fn fetch_balance(&self) -> ExchangeResult<Balances>;

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> ExchangeResult<Order>;

    /// Cancel an order. Returns the cached entry after the cancel when one exists.
    async fn cancel_order(&self, id: &str) -> ExchangeResult<Option<Order>>;

    async fn fetch_order(&self, id: &str) -> ExchangeResult<Order>;

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> ExchangeResult<Vec<Trade>>;

    async fn fetch_deposit_address(&self, currency: &str) -> ExchangeResult<DepositAddress>;

    async fn withdraw(
        &self,
        currency: &str,
        amount: Decimal,
        address: &str,
    ) -> ExchangeResult<Withdrawal>;
}
