// src/infrastructure/exchange/mod.rs
// Liqui exchange repository implementation

pub mod auth;
pub mod classifier;
pub mod gateway;
pub mod transport;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use self::auth::{AuthSigner, MillisNonce};
use self::gateway::LiquiGateway;
use self::transport::HyperTransport;
use crate::application::dto::parser::{
    parse_balance, parse_order_book, parse_ticker, parse_trade_history, parse_trades,
};
use crate::application::dto::{field_decimal, field_string};
use crate::application::usecase::OrderReconciler;
use crate::config::ExchangeConfig;
use crate::domain::errors::{ErrorKind, ExchangeError, ExchangeResult};
use crate::domain::models::{
    Balances, Coupon, DepositAddress, Market, Order, OrderBook, OrderSide, OrderStatus, OrderType,
    RedeemedCoupon, Ticker, Trade, Withdrawal,
};
use crate::domain::repository::{
    Clock, ExchangeRepository, HttpTransport, MarketLookup, Params, SystemClock,
};
use crate::infrastructure::market::MarketCatalog;
use crate::infrastructure::store::InMemoryOrderStore;

pub struct LiquiExchange {
    gateway: Arc<LiquiGateway>,
    markets: RwLock<Option<Arc<MarketCatalog>>>,
    orders: OrderReconciler<InMemoryOrderStore>,
}

impl LiquiExchange {
    pub fn new(gateway: Arc<LiquiGateway>, clock: Arc<dyn Clock>) -> Self {
        let orders = OrderReconciler::new(gateway.clone(), clock, InMemoryOrderStore::new());
        Self {
            gateway,
            markets: RwLock::new(None),
            orders,
        }
    }

    /// Adapter over HTTPS with the system clock.
    pub fn from_config(config: &ExchangeConfig) -> Self {
        let transport = Arc::new(HyperTransport::new(Duration::from_millis(config.timeout_ms)));
        Self::with_transport(config, transport, Arc::new(SystemClock))
    }

    pub fn with_transport(
        config: &ExchangeConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let signer = AuthSigner::new(config.api_key.clone(), config.api_secret.clone());
        let nonce = Arc::new(MillisNonce::new(clock.clone()));
        let gateway = LiquiGateway::new(
            transport,
            signer,
            nonce,
            &config.public_url,
            &config.private_url,
        );
        Self::new(Arc::new(gateway), clock)
    }

    pub fn has_credentials(&self) -> bool {
        self.gateway.has_credentials()
    }

    /// Loaded market catalog, fetched on first use.
    pub async fn markets(&self) -> ExchangeResult<Arc<MarketCatalog>> {
        if let Some(catalog) = self.markets.read().await.as_ref() {
            return Ok(catalog.clone());
        }
        self.refresh_markets(false).await
    }

    async fn refresh_markets(&self, force: bool) -> ExchangeResult<Arc<MarketCatalog>> {
        let mut slot = self.markets.write().await;
        if !force {
            if let Some(catalog) = slot.as_ref() {
                return Ok(catalog.clone());
            }
        }

        let info = self.gateway.public_get("info", &[]).await?;
        let catalog = Arc::new(MarketCatalog::from_info(&info)?);
        *slot = Some(catalog.clone());
        Ok(catalog)
    }

    /// Cached copy of an order placed or seen by this adapter.
    pub async fn cached_order(&self, id: &str) -> Option<Order> {
        self.orders.cached(id).await
    }

    /// Turn part of a balance into a redeemable coupon code.
    pub async fn create_coupon(&self, currency: &str, amount: Decimal) -> ExchangeResult<Coupon> {
        let markets = self.markets().await?;
        let params: Params = vec![
            ("currency".to_string(), markets.currency_id(currency).to_uppercase()),
            ("amount".to_string(), amount.normalize().to_string()),
        ];
        let response = self.gateway.private_post("CreateCoupon", params).await?;

        let code = field_string(&response, "coupon").ok_or_else(|| {
            ExchangeError::bad_response("CreateCoupon response without coupon")
                .with_raw(response.clone())
        })?;
        log::info!("Created {} coupon for {}", currency, amount);

        Ok(Coupon {
            code,
            transaction_id: field_string(&response, "transID"),
            raw: response,
        })
    }

    pub async fn redeem_coupon(&self, coupon: &str) -> ExchangeResult<RedeemedCoupon> {
        let markets = self.markets().await?;
        let params: Params = vec![("coupon".to_string(), coupon.to_string())];
        let response = self.gateway.private_post("RedeemCoupon", params).await?;

        let currency = field_string(&response, "couponCurrency")
            .map(|id| markets.currency_code(&id))
            .unwrap_or_default();

        Ok(RedeemedCoupon {
            currency,
            amount: field_decimal(&response, "couponAmount"),
            transaction_id: field_string(&response, "transID"),
            raw: response,
        })
    }
}

/// Payload for one pair from a public response keyed by pair id.
fn pair_payload<'a>(response: &'a Value, id: &str) -> ExchangeResult<&'a Value> {
    response.get(id).ok_or_else(|| {
        ExchangeError::bad_response(format!("Response has no entry for {}", id))
            .with_raw(response.clone())
    })
}

#[async_trait]
impl ExchangeRepository for LiquiExchange {
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<Market>> {
        let catalog = if reload {
            self.refresh_markets(true).await?
        } else {
            self.markets().await?
        };
        Ok(catalog.markets())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let markets = self.markets().await?;
        let market = markets.market(symbol)?;
        let response = self
            .gateway
            .public_get(&format!("ticker/{}", market.id), &[])
            .await?;
        Ok(parse_ticker(pair_payload(&response, &market.id)?, &market.symbol))
    }

    /// Tickers for `symbols`, or for every listed market when empty.
    async fn fetch_tickers(&self, symbols: &[String]) -> ExchangeResult<Vec<Ticker>> {
        let markets = self.markets().await?;
        let ids = if symbols.is_empty() {
            markets.markets().into_iter().map(|m| m.id).collect::<Vec<_>>()
        } else {
            symbols
                .iter()
                .map(|s| markets.market(s).map(|m| m.id.clone()))
                .collect::<ExchangeResult<Vec<_>>>()?
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .gateway
            .public_get(&format!("ticker/{}", ids.join("-")), &[])
            .await?;

        ids.iter()
            .map(|id| {
                let raw = pair_payload(&response, id)?;
                Ok(parse_ticker(raw, &markets.symbol_for_id(id)))
            })
            .collect()
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<u32>) -> ExchangeResult<OrderBook> {
        let markets = self.markets().await?;
        let market = markets.market(symbol)?;
        let query: Params = limit
            .map(|l| vec![("limit".to_string(), l.to_string())])
            .unwrap_or_default();

        let response = self
            .gateway
            .public_get(&format!("depth/{}", market.id), &query)
            .await?;
        parse_order_book(pair_payload(&response, &market.id)?, &market.symbol)
    }

    async fn fetch_trades(&self, symbol: &str, limit: Option<u32>) -> ExchangeResult<Vec<Trade>> {
        let markets = self.markets().await?;
        let market = markets.market(symbol)?;
        let query: Params = limit
            .map(|l| vec![("limit".to_string(), l.to_string())])
            .unwrap_or_default();

        let response = self
            .gateway
            .public_get(&format!("trades/{}", market.id), &query)
            .await?;
        parse_trades(pair_payload(&response, &market.id)?, &market.symbol, &*markets)
    }

    async fn fetch_balance(&self) -> ExchangeResult<Balances> {
        let markets = self.markets().await?;
        let response = self.gateway.private_post("getInfo", Vec::new()).await?;
        Ok(parse_balance(&response, &*markets))
    }

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
    ) -> ExchangeResult<Order> {
        if order_type == OrderType::Market {
            return Err(ExchangeError::new(
                ErrorKind::NotSupported,
                "Market orders are not supported, use a limit order",
            ));
        }
        let price = price.ok_or_else(|| {
            ExchangeError::new(ErrorKind::InvalidOrder, "Limit orders require a price")
        })?;

        let markets = self.markets().await?;
        self.orders
            .create(&*markets, symbol, side, amount, price)
            .await
    }

    async fn cancel_order(&self, id: &str) -> ExchangeResult<Option<Order>> {
        self.orders.cancel(id).await
    }

    async fn fetch_order(&self, id: &str) -> ExchangeResult<Order> {
        let markets = self.markets().await?;
        self.orders.lookup(&*markets, id).await
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>> {
        let markets = self.markets().await?;
        self.orders.list(&*markets, symbol, since, limit).await
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>> {
        let markets = self.markets().await?;
        self.orders
            .list_with_status(&*markets, OrderStatus::Open, symbol, since, limit)
            .await
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Order>> {
        let markets = self.markets().await?;
        self.orders
            .list_with_status(&*markets, OrderStatus::Closed, symbol, since, limit)
            .await
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> ExchangeResult<Vec<Trade>> {
        let markets = self.markets().await?;
        let mut params: Params = Vec::new();
        if let Some(symbol) = symbol {
            params.push(("pair".to_string(), markets.market(symbol)?.id.clone()));
        }
        if let Some(limit) = limit {
            params.push(("count".to_string(), limit.to_string()));
        }
        if let Some(since) = since {
            // venue expects seconds
            params.push(("since".to_string(), (since / 1000).to_string()));
        }

        let response = self.gateway.private_post("TradeHistory", params).await?;
        parse_trade_history(&response, &*markets)
    }

    async fn fetch_deposit_address(&self, currency: &str) -> ExchangeResult<DepositAddress> {
        let markets = self.markets().await?;
        let params: Params = vec![("coinName".to_string(), markets.currency_id(currency))];
        let response = self
            .gateway
            .private_post("CoinDepositAddress", params)
            .await?;

        let address = field_string(&response, "address").ok_or_else(|| {
            ExchangeError::bad_response("CoinDepositAddress response without address")
                .with_raw(response.clone())
        })?;

        Ok(DepositAddress {
            currency: currency.to_string(),
            address,
            raw: response,
        })
    }

    async fn withdraw(
        &self,
        currency: &str,
        amount: Decimal,
        address: &str,
    ) -> ExchangeResult<Withdrawal> {
        let markets = self.markets().await?;
        let params: Params = vec![
            ("coinName".to_string(), markets.currency_id(currency)),
            ("amount".to_string(), amount.normalize().to_string()),
            ("address".to_string(), address.to_string()),
        ];
        let response = self.gateway.private_post("WithdrawCoin", params).await?;
        log::info!("Withdrawal of {} {} to {} accepted", amount, currency, address);

        Ok(Withdrawal {
            id: field_string(&response, "tId"),
            currency: currency.to_string(),
            amount_sent: field_decimal(&response, "amountSent"),
            raw: response,
        })
    }
}
