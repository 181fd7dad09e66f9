// src/application/usecase/order_reconciler.rs
// Order lifecycle reconciliation against a venue that only reports open orders

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::application::dto::parser::{parse_order, parse_orders};
use crate::application::dto::{field_decimal, field_string};
use crate::domain::errors::{ErrorKind, ExchangeError, ExchangeResult};
use crate::domain::models::{Order, OrderSide, OrderStatus, OrderType};
use crate::domain::repository::{Clock, MarketLookup, OrderStore, Params, PrivateApi};

/// `order_id` echoed by `Trade` when the order filled on arrival
pub const FILLED_IMMEDIATELY: &str = "0";

/// Message the venue returns from `ActiveOrders` for an empty book
const NO_ORDERS: &str = "no orders";

/// Orders currently open at the venue
#[derive(Debug, Clone, Default)]
pub struct OpenSnapshot {
    pub orders: Vec<Order>,
}

impl OpenSnapshot {
    pub fn ids(&self) -> HashSet<String> {
        self.orders.iter().map(|o| o.id.clone()).collect()
    }
}

/// Drives create/cancel/lookup/list against the venue and keeps the order cache.
///
/// Every operation holds the cache lock for its whole duration, so concurrent
/// callers are serialized and no merge interleaves with another. Venue calls
/// and parsing finish before the cache is touched, so a failed call leaves
/// the cache as it was.
pub struct OrderReconciler<S: OrderStore> {
    api: Arc<dyn PrivateApi>,
    clock: Arc<dyn Clock>,
    store: Mutex<S>,
}

impl<S: OrderStore> OrderReconciler<S> {
    pub fn new(api: Arc<dyn PrivateApi>, clock: Arc<dyn Clock>, store: S) -> Self {
        Self {
            api,
            clock,
            store: Mutex::new(store),
        }
    }

    /// Cached copy of an order, if this process has seen it.
    pub async fn cached(&self, id: &str) -> Option<Order> {
        self.store.lock().await.get(id).cloned()
    }

    /// Place a limit order and cache it.
    pub async fn create<L: MarketLookup + Sync + ?Sized>(
        &self,
        markets: &L,
        symbol: &str,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> ExchangeResult<Order> {
        let market = markets.market(symbol)?;
        let amount = market.amount_to_precision(amount);
        let price = market.price_to_precision(price);
        let params: Params = vec![
            ("pair".to_string(), market.id.clone()),
            ("type".to_string(), side.as_str().to_string()),
            ("amount".to_string(), amount.normalize().to_string()),
            ("rate".to_string(), price.normalize().to_string()),
        ];

        let mut store = self.store.lock().await;
        let echo = self.api.private_call("Trade", params).await?;
        let order = order_from_trade_echo(
            &market.symbol,
            side,
            amount,
            price,
            &echo,
            self.clock.now_millis(),
        )?;

        log::info!(
            "Created order {} {} {} {} @ {} ({})",
            order.id, order.symbol, order.side, amount, price, order.status
        );
        store.upsert(order.clone());
        Ok(order)
    }

    /// Cancel an order. A cached open entry becomes `canceled` as soon as the venue accepts.
    pub async fn cancel(&self, id: &str) -> ExchangeResult<Option<Order>> {
        let params: Params = vec![("order_id".to_string(), id.to_string())];

        let mut store = self.store.lock().await;
        self.api.private_call("CancelOrder", params).await?;

        match store.get_mut(id) {
            Some(order) if order.status == OrderStatus::Open => {
                order.status = OrderStatus::Canceled;
                log::info!("Order {} canceled", id);
            }
            Some(order) => {
                log::warn!(
                    "Venue accepted cancel of order {} already cached as {}",
                    id, order.status
                );
            }
            None => log::debug!("Canceled order {} not in cache", id),
        }
        Ok(store.get(id).cloned())
    }

    /// Fetch one order and merge it into the cache.
    pub async fn lookup<L: MarketLookup + Sync + ?Sized>(
        &self,
        markets: &L,
        id: &str,
    ) -> ExchangeResult<Order> {
        let params: Params = vec![("order_id".to_string(), id.to_string())];

        let mut store = self.store.lock().await;
        let response = self.api.private_call("OrderInfo", params).await?;
        let raw = response.get(id).ok_or_else(|| {
            ExchangeError::new(ErrorKind::OrderNotFound, format!("Order {} not found", id))
                .with_raw(response.clone())
        })?;
        let snapshot = parse_order(id, raw, markets)?;

        let merged = match store.get(id) {
            Some(cached) => merge_snapshot(cached, snapshot),
            None => snapshot,
        };
        store.upsert(merged.clone());
        Ok(merged)
    }

    /// Fetch the venue's open orders, optionally for one symbol. Does not touch the cache.
    pub async fn list_open_snapshot<L: MarketLookup + Sync + ?Sized>(
        &self,
        markets: &L,
        symbol: Option<&str>,
    ) -> ExchangeResult<OpenSnapshot> {
        let mut params: Params = Vec::new();
        if let Some(symbol) = symbol {
            params.push(("pair".to_string(), markets.market(symbol)?.id.clone()));
        }

        let response = match self.api.private_call("ActiveOrders", params).await {
            Ok(response) => response,
            Err(err) if err.kind == ErrorKind::Exchange && err.message == NO_ORDERS => Value::Null,
            Err(err) => return Err(err),
        };

        Ok(OpenSnapshot {
            orders: parse_orders(&response, markets)?,
        })
    }

    /// Reconcile the cache with the venue's open orders and return the cached orders.
    ///
    /// Cached open orders missing from the snapshot are assumed filled. The
    /// venue cannot tell a fill apart from a cancel made elsewhere, so an
    /// order canceled outside this process also ends up `closed` here.
    pub async fn list<L: MarketLookup + Sync + ?Sized>(
        &self,
        markets: &L,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>> {
        let mut store = self.store.lock().await;
        let snapshot = self.list_open_snapshot(markets, symbol).await?;
        let open_ids = snapshot.ids();

        for order in snapshot.orders {
            let merged = match store.get(&order.id) {
                Some(cached) => merge_snapshot(cached, order),
                None => order,
            };
            store.upsert(merged);
        }

        for id in store.ids() {
            if open_ids.contains(&id) {
                continue;
            }
            if let Some(order) = store.get_mut(&id) {
                let in_scope = symbol.map_or(true, |s| order.symbol == s);
                if order.status == OrderStatus::Open && in_scope {
                    infer_completion(order);
                    log::info!("Order {} left the open set, marking closed", id);
                }
            }
        }

        let orders = store
            .orders()
            .into_iter()
            .filter(|o| symbol.map_or(true, |s| o.symbol == s))
            .collect();
        Ok(filter_by_since_limit(orders, since, limit))
    }

    /// `list` followed by a status filter.
    pub async fn list_with_status<L: MarketLookup + Sync + ?Sized>(
        &self,
        markets: &L,
        status: OrderStatus,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>> {
        let orders = self.list(markets, symbol, since, limit).await?;
        Ok(orders.into_iter().filter(|o| o.status == status).collect())
    }
}

/// Build the cache entry for a freshly placed order from the `Trade` echo.
fn order_from_trade_echo(
    symbol: &str,
    side: OrderSide,
    amount: Decimal,
    price: Decimal,
    echo: &Value,
    now: i64,
) -> ExchangeResult<Order> {
    let order_id = field_string(echo, "order_id").ok_or_else(|| {
        ExchangeError::bad_response("Trade response without order_id").with_raw(echo.clone())
    })?;

    let filled_immediately = order_id == FILLED_IMMEDIATELY;
    let id = if filled_immediately {
        field_string(echo, "init_order_id").unwrap_or(order_id)
    } else {
        order_id
    };
    let status = if filled_immediately {
        OrderStatus::Closed
    } else {
        OrderStatus::Open
    };

    let mut order = Order {
        id,
        symbol: symbol.to_string(),
        side,
        order_type: OrderType::Limit,
        price,
        amount: Some(amount),
        filled: None,
        remaining: Some(field_decimal(echo, "remains").unwrap_or(amount)),
        cost: None,
        status,
        created_at: Some(now),
        raw: echo.clone(),
    };
    order.recompute_fills();
    Ok(order)
}

/// Merge a venue snapshot over a cached entry.
///
/// Snapshot fields win, except the original amount and creation time, which
/// the venue may not echo. A terminal cached status is never reopened.
fn merge_snapshot(cached: &Order, snapshot: Order) -> Order {
    if cached.status.is_terminal() && snapshot.status == OrderStatus::Open {
        return cached.clone();
    }

    let mut merged = snapshot;
    if merged.amount.is_none() {
        merged.amount = cached.amount;
    }
    if merged.created_at.is_none() {
        merged.created_at = cached.created_at;
    }
    if cached.status.is_terminal() {
        merged.status = cached.status;
    }
    merged.recompute_fills();
    merged
}

/// Mark an order that vanished from the open set as fully filled.
fn infer_completion(order: &mut Order) {
    order.status = OrderStatus::Closed;
    order.remaining = Some(Decimal::ZERO);
    order.filled = order.amount;
    order.cost = order.amount.map(|amount| amount * order.price);
}

fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    orders
}

/// Chronological window: orders created at or after `since`, at most `limit` of them.
fn filter_by_since_limit(orders: Vec<Order>, since: Option<i64>, limit: Option<usize>) -> Vec<Order> {
    let mut orders: Vec<Order> = sorted(orders)
        .into_iter()
        .filter(|o| match since {
            Some(since) => o.created_at.map_or(false, |ts| ts >= since),
            None => true,
        })
        .collect();
    if let Some(limit) = limit {
        orders.truncate(limit);
    }
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Limits, Market, Precision};
    use crate::infrastructure::store::InMemoryOrderStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    struct ScriptedApi {
        replies: StdMutex<VecDeque<ExchangeResult<Value>>>,
        calls: StdMutex<Vec<(String, Params)>>,
    }

    impl ScriptedApi {
        fn new(replies: Vec<ExchangeResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.into()),
                calls: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Params)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PrivateApi for ScriptedApi {
        async fn private_call(&self, method: &str, params: Params) -> ExchangeResult<Value> {
            self.calls.lock().unwrap().push((method.to_string(), params));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ExchangeError::network("no scripted reply")))
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    struct Markets(Vec<Market>);

    impl Markets {
        fn new() -> Self {
            let market = |id: &str, symbol: &str| Market {
                id: id.to_string(),
                symbol: symbol.to_string(),
                base: symbol[..3].to_string(),
                quote: symbol[4..].to_string(),
                base_id: id[..3].to_string(),
                quote_id: id[4..].to_string(),
                precision: Precision { amount: 8, price: 8 },
                limits: Limits::default(),
                maker_fee: dec!(0.001),
                taker_fee: dec!(0.0025),
                active: true,
            };
            Self(vec![market("eth_btc", "ETH/BTC"), market("ltc_btc", "LTC/BTC")])
        }
    }

    impl MarketLookup for Markets {
        fn market(&self, symbol: &str) -> ExchangeResult<&Market> {
            self.0
                .iter()
                .find(|m| m.symbol == symbol)
                .ok_or_else(|| ExchangeError::bad_symbol(symbol))
        }

        fn symbol_for_id(&self, id: &str) -> String {
            id.to_uppercase().replace('_', "/")
        }

        fn currency_code(&self, id: &str) -> String {
            id.to_uppercase()
        }
    }

    fn cached_open(id: &str, symbol: &str, amount: Decimal, price: Decimal, created_at: i64) -> Order {
        Order {
            id: id.to_string(),
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            price,
            amount: Some(amount),
            filled: Some(Decimal::ZERO),
            remaining: Some(amount),
            cost: Some(Decimal::ZERO),
            status: OrderStatus::Open,
            created_at: Some(created_at),
            raw: Value::Null,
        }
    }

    fn reconciler(api: Arc<ScriptedApi>, orders: Vec<Order>) -> OrderReconciler<InMemoryOrderStore> {
        let mut store = InMemoryOrderStore::new();
        for order in orders {
            store.upsert(order);
        }
        OrderReconciler::new(api, Arc::new(FixedClock(1_700_000_000_000)), store)
    }

    fn active(id: &str, pair: &str, remaining: f64, rate: f64, created: i64) -> Value {
        let mut orders = serde_json::Map::new();
        orders.insert(
            id.to_string(),
            json!({"pair": pair, "type": "buy", "amount": remaining, "rate": rate,
                   "timestamp_created": created, "status": 0}),
        );
        Value::Object(orders)
    }

    #[tokio::test]
    async fn vanished_open_order_is_inferred_closed() {
        let api = ScriptedApi::new(vec![Ok(json!({}))]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let orders = rec.list(&Markets::new(), None, None, None).await.unwrap();

        assert_eq!(orders.len(), 1);
        let order = rec.cached("555").await.unwrap();
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.remaining, Some(dec!(0)));
        assert_eq!(order.filled, Some(dec!(1.5)));
        assert_eq!(order.cost, Some(dec!(0.045)));
    }

    #[tokio::test]
    async fn create_filled_on_arrival_is_closed() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "received": 1.5, "remains": 0, "order_id": 0, "init_order_id": 777,
            "funds": {"btc": 1.0, "eth": 1.5}
        }))]);
        let rec = reconciler(api.clone(), vec![]);

        let order = rec
            .create(&Markets::new(), "ETH/BTC", OrderSide::Buy, dec!(1.5), dec!(0.03))
            .await
            .unwrap();

        assert_eq!(order.id, "777");
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.filled, Some(dec!(1.5)));
        assert_eq!(order.remaining, Some(dec!(0)));
        assert_eq!(order.cost, Some(dec!(0.045)));
        assert_eq!(order.created_at, Some(1_700_000_000_000));
        assert_eq!(rec.cached("777").await, Some(order));

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Trade");
        assert_eq!(
            calls[0].1,
            vec![
                ("pair".to_string(), "eth_btc".to_string()),
                ("type".to_string(), "buy".to_string()),
                ("amount".to_string(), "1.5".to_string()),
                ("rate".to_string(), "0.03".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn create_filled_on_arrival_without_init_id_keeps_sentinel_key() {
        let api = ScriptedApi::new(vec![Ok(json!({"order_id": "0", "received": 1.5, "remains": 0}))]);
        let rec = reconciler(api, vec![]);

        let order = rec
            .create(&Markets::new(), "ETH/BTC", OrderSide::Buy, dec!(1.5), dec!(0.03))
            .await
            .unwrap();

        assert_eq!(order.id, FILLED_IMMEDIATELY);
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.filled, Some(dec!(1.5)));
        assert_eq!(order.remaining, Some(dec!(0)));
        assert_eq!(order.cost, Some(dec!(0.045)));
        assert_eq!(rec.cached("0").await, Some(order));
    }

    #[tokio::test]
    async fn create_resting_order_is_open() {
        let api = ScriptedApi::new(vec![Ok(json!({"received": 0.5, "remains": 1.0, "order_id": 901}))]);
        let rec = reconciler(api, vec![]);

        let order = rec
            .create(&Markets::new(), "ETH/BTC", OrderSide::Sell, dec!(1.5), dec!(0.03))
            .await
            .unwrap();

        assert_eq!(order.id, "901");
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining, Some(dec!(1.0)));
        assert_eq!(order.filled, Some(dec!(0.5)));
        assert_eq!(order.cost, Some(dec!(0.015)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_symbol_before_calling_venue() {
        let api = ScriptedApi::new(vec![]);
        let rec = reconciler(api.clone(), vec![]);

        let err = rec
            .create(&Markets::new(), "XRP/BTC", OrderSide::Buy, dec!(1), dec!(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::BadSymbol);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_marks_cached_order_canceled() {
        let api = ScriptedApi::new(vec![Ok(json!({"order_id": 555, "funds": {}}))]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let order = rec.cancel("555").await.unwrap().unwrap();

        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(rec.cached("555").await.unwrap().status, OrderStatus::Canceled);
    }

    #[tokio::test]
    async fn cancel_of_uncached_order_still_calls_venue() {
        let api = ScriptedApi::new(vec![Ok(json!({"order_id": 42}))]);
        let rec = reconciler(api.clone(), vec![]);

        assert_eq!(rec.cancel("42").await.unwrap(), None);
        assert_eq!(api.calls()[0].0, "CancelOrder");
        assert_eq!(api.calls()[0].1, vec![("order_id".to_string(), "42".to_string())]);
    }

    #[tokio::test]
    async fn failed_cancel_leaves_cache_untouched() {
        let api = ScriptedApi::new(vec![Err(
            ExchangeError::new(ErrorKind::OrderNotFound, "bad status").with_code("833"),
        )]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let err = rec.cancel("555").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::OrderNotFound);
        assert_eq!(rec.cached("555").await.unwrap().status, OrderStatus::Open);
    }

    #[tokio::test]
    async fn canceled_order_is_not_reopened_by_stale_snapshot() {
        let api = ScriptedApi::new(vec![
            Ok(json!({"order_id": 555})),
            Ok(active("555", "eth_btc", 1.5, 0.03, 1)),
        ]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        rec.cancel("555").await.unwrap();
        rec.list(&Markets::new(), None, None, None).await.unwrap();

        assert_eq!(rec.cached("555").await.unwrap().status, OrderStatus::Canceled);
    }

    #[tokio::test]
    async fn list_twice_with_same_snapshot_is_idempotent() {
        let snapshot = active("600", "eth_btc", 0.4, 0.03, 1_600_000_000);
        let api = ScriptedApi::new(vec![Ok(snapshot.clone()), Ok(snapshot)]);
        let rec = reconciler(
            api,
            vec![
                cached_open("600", "ETH/BTC", dec!(1.0), dec!(0.03), 1_600_000_000_000),
                cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1),
            ],
        );
        let markets = Markets::new();

        let first = rec.list(&markets, None, None, None).await.unwrap();
        let second = rec.list(&markets, None, None, None).await.unwrap();

        assert_eq!(first, second);
        let open = first.iter().find(|o| o.id == "600").unwrap();
        assert_eq!(open.status, OrderStatus::Open);
        assert_eq!(open.amount, Some(dec!(1.0)));
        assert_eq!(open.remaining, Some(dec!(0.4)));
        assert_eq!(open.filled, Some(dec!(0.6)));
        assert_eq!(open.cost, Some(dec!(0.018)));
    }

    #[tokio::test]
    async fn symbol_scoped_list_only_infers_for_that_symbol() {
        let api = ScriptedApi::new(vec![Ok(json!({}))]);
        let rec = reconciler(
            api.clone(),
            vec![
                cached_open("1", "ETH/BTC", dec!(1), dec!(0.03), 1),
                cached_open("2", "LTC/BTC", dec!(1), dec!(0.01), 2),
            ],
        );

        let orders = rec.list(&Markets::new(), Some("ETH/BTC"), None, None).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "1");
        assert_eq!(orders[0].status, OrderStatus::Closed);
        assert_eq!(rec.cached("2").await.unwrap().status, OrderStatus::Open);
        assert_eq!(api.calls()[0].1, vec![("pair".to_string(), "eth_btc".to_string())]);
    }

    #[tokio::test]
    async fn empty_book_message_is_an_empty_snapshot() {
        let api = ScriptedApi::new(vec![Err(ExchangeError::new(ErrorKind::Exchange, "no orders"))]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let closed = rec
            .list_with_status(&Markets::new(), OrderStatus::Closed, None, None, None)
            .await
            .unwrap();

        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, "555");
    }

    #[tokio::test]
    async fn failed_list_does_not_mutate_cache() {
        let bad = json!({"700": {"pair": "eth_btc", "type": "buy", "amount": 1, "rate": 0.03, "status": 9}});
        let api = ScriptedApi::new(vec![Ok(bad)]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let err = rec.list(&Markets::new(), None, None, None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::BadResponse);
        assert_eq!(rec.cached("555").await.unwrap().status, OrderStatus::Open);
        assert!(rec.cached("700").await.is_none());
    }

    #[tokio::test]
    async fn since_and_limit_window_is_chronological() {
        let api = ScriptedApi::new(vec![Ok(json!({}))]);
        let rec = reconciler(
            api,
            vec![
                cached_open("c", "ETH/BTC", dec!(1), dec!(1), 3_000),
                cached_open("a", "ETH/BTC", dec!(1), dec!(1), 1_000),
                cached_open("b", "ETH/BTC", dec!(1), dec!(1), 2_000),
            ],
        );

        let orders = rec.list(&Markets::new(), None, Some(2_000), Some(1)).await.unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "b");
    }

    #[tokio::test]
    async fn lookup_preserves_cached_amount() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "555": {"pair": "eth_btc", "type": "buy", "amount": 0.5, "rate": 0.03,
                    "timestamp_created": 1500000000, "status": 0}
        }))]);
        let rec = reconciler(api, vec![cached_open("555", "ETH/BTC", dec!(1.5), dec!(0.03), 1)]);

        let order = rec.lookup(&Markets::new(), "555").await.unwrap();

        assert_eq!(order.amount, Some(dec!(1.5)));
        assert_eq!(order.remaining, Some(dec!(0.5)));
        assert_eq!(order.filled, Some(dec!(1.0)));
        assert_eq!(order.cost, Some(dec!(0.03)));
        assert_eq!(order.created_at, Some(1_500_000_000_000));
        assert_eq!(rec.cached("555").await, Some(order));
    }

    #[tokio::test]
    async fn lookup_of_unknown_order_caches_it() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "900": {"pair": "ltc_btc", "type": "sell", "amount": 0, "rate": 0.01, "status": 1}
        }))]);
        let rec = reconciler(api, vec![]);

        let order = rec.lookup(&Markets::new(), "900").await.unwrap();

        assert_eq!(order.symbol, "LTC/BTC");
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.amount, None);
        assert!(rec.cached("900").await.is_some());
    }

    #[tokio::test]
    async fn lookup_missing_from_response_is_not_found() {
        let api = ScriptedApi::new(vec![Ok(json!({}))]);
        let rec = reconciler(api, vec![]);

        let err = rec.lookup(&Markets::new(), "1").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::OrderNotFound);
    }
}
