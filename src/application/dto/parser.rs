// src/application/dto/parser.rs
// Pure conversions from venue payloads to canonical records

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{decimal, field_decimal, field_i64, field_millis, field_string};
use crate::domain::errors::{ExchangeError, ExchangeResult};
use crate::domain::models::{
    Balance, Balances, BookLevel, Order, OrderBook, OrderSide, OrderStatus, OrderType, Ticker,
    Trade,
};
use crate::domain::repository::MarketLookup;

/// Ticker from `ticker/{pair}`. Fields the venue omits stay unknown.
pub fn parse_ticker(raw: &Value, symbol: &str) -> Ticker {
    Ticker {
        symbol: symbol.to_string(),
        timestamp: field_millis(raw, "updated"),
        high: field_decimal(raw, "high"),
        low: field_decimal(raw, "low"),
        bid: field_decimal(raw, "buy"),
        ask: field_decimal(raw, "sell"),
        vwap: None,
        open: None,
        close: None,
        last: field_decimal(raw, "last"),
        change: None,
        percentage: None,
        average: field_decimal(raw, "avg"),
        base_volume: field_decimal(raw, "vol_cur"),
        quote_volume: field_decimal(raw, "vol"),
        raw: raw.clone(),
    }
}

/// Map a trade `type` to a side. Public trades use `ask`/`bid`, private history `sell`/`buy`.
pub fn parse_trade_side(value: &str) -> ExchangeResult<OrderSide> {
    match value {
        "ask" | "sell" => Ok(OrderSide::Sell),
        "bid" | "buy" => Ok(OrderSide::Buy),
        other => Err(ExchangeError::bad_response(format!("Unknown trade side: {}", other))),
    }
}

/// Trade from the public trades feed or private trade history.
///
/// `id` overrides the payload's own id (history is keyed by trade id).
/// `symbol` is used when the payload carries no `pair`.
pub fn parse_trade<L: MarketLookup + ?Sized>(
    raw: &Value,
    id: Option<&str>,
    symbol: Option<&str>,
    markets: &L,
) -> ExchangeResult<Trade> {
    let symbol = match (raw.get("pair").and_then(Value::as_str), symbol) {
        (Some(pair), _) => markets.symbol_for_id(pair),
        (None, Some(symbol)) => symbol.to_string(),
        (None, None) => return Err(ExchangeError::bad_response("Trade without pair")),
    };

    let side = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ExchangeError::bad_response("Trade without type"))
        .and_then(parse_trade_side)?;

    let price = field_decimal(raw, "rate")
        .or_else(|| field_decimal(raw, "price"))
        .ok_or_else(|| ExchangeError::bad_response("Trade without price"))?;

    let amount = field_decimal(raw, "amount")
        .ok_or_else(|| ExchangeError::bad_response("Trade without amount"))?;

    let id = id
        .map(str::to_string)
        .or_else(|| field_string(raw, "tid"))
        .or_else(|| field_string(raw, "trade_id"));

    Ok(Trade {
        id,
        order_id: field_string(raw, "order_id"),
        symbol,
        side,
        price,
        amount,
        cost: price * amount,
        timestamp: field_millis(raw, "timestamp"),
        raw: raw.clone(),
    })
}

/// Trades from `trades/{pair}`: an array of trades for one symbol.
pub fn parse_trades<L: MarketLookup + ?Sized>(
    raw: &Value,
    symbol: &str,
    markets: &L,
) -> ExchangeResult<Vec<Trade>> {
    let mut trades = match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| parse_trade(item, None, Some(symbol), markets))
            .collect::<ExchangeResult<Vec<_>>>()?,
        Value::Null => Vec::new(),
        _ => return Err(ExchangeError::bad_response("Trades payload is not an array")),
    };
    trades.sort_by_key(|t| t.timestamp);
    Ok(trades)
}

/// Trades from `TradeHistory`: an object keyed by trade id.
pub fn parse_trade_history<L: MarketLookup + ?Sized>(
    raw: &Value,
    markets: &L,
) -> ExchangeResult<Vec<Trade>> {
    let mut trades = match raw {
        Value::Object(map) => map
            .iter()
            .map(|(id, item)| parse_trade(item, Some(id), None, markets))
            .collect::<ExchangeResult<Vec<_>>>()?,
        Value::Null => Vec::new(),
        _ => return Err(ExchangeError::bad_response("Trade history is not an object")),
    };
    trades.sort_by_key(|t| t.timestamp);
    Ok(trades)
}

/// Venue status codes: 0 open, 1 closed, 2 and 3 canceled.
pub fn parse_order_status(value: &Value) -> ExchangeResult<OrderStatus> {
    let code = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match code {
        Some(0) => Ok(OrderStatus::Open),
        Some(1) => Ok(OrderStatus::Closed),
        Some(2) | Some(3) => Ok(OrderStatus::Canceled),
        _ => Err(ExchangeError::bad_response(format!("Unknown order status: {}", value))
            .with_raw(value.clone())),
    }
}

/// Order snapshot from `ActiveOrders` or `OrderInfo`.
///
/// The venue's `amount` is what remains open. The original amount is only
/// known when the payload carries `start_amount`.
pub fn parse_order<L: MarketLookup + ?Sized>(
    id: &str,
    raw: &Value,
    markets: &L,
) -> ExchangeResult<Order> {
    let pair = raw
        .get("pair")
        .and_then(Value::as_str)
        .ok_or_else(|| ExchangeError::bad_response(format!("Order {} without pair", id)))?;

    let side = match raw.get("type").and_then(Value::as_str) {
        Some("buy") => OrderSide::Buy,
        Some("sell") => OrderSide::Sell,
        other => {
            return Err(ExchangeError::bad_response(format!(
                "Order {} has unknown side: {:?}",
                id, other
            )))
        }
    };

    let price = field_decimal(raw, "rate")
        .ok_or_else(|| ExchangeError::bad_response(format!("Order {} without rate", id)))?;

    let status = parse_order_status(raw.get("status").unwrap_or(&Value::Null))?;

    let remaining = field_decimal(raw, "amount");
    let amount = field_decimal(raw, "start_amount");

    let mut order = Order {
        id: id.to_string(),
        symbol: markets.symbol_for_id(pair),
        side,
        order_type: OrderType::Limit,
        price,
        amount,
        filled: None,
        remaining,
        cost: None,
        status,
        created_at: field_millis(raw, "timestamp_created"),
        raw: raw.clone(),
    };
    order.recompute_fills();
    Ok(order)
}

/// Orders keyed by id, as returned by `ActiveOrders` and `OrderInfo`.
pub fn parse_orders<L: MarketLookup + ?Sized>(raw: &Value, markets: &L) -> ExchangeResult<Vec<Order>> {
    match raw {
        Value::Object(map) => map
            .iter()
            .map(|(id, item)| parse_order(id, item, markets))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(ExchangeError::bad_response("Orders payload is not an object")),
    }
}

/// Balances from `getInfo`.
///
/// `used` and `total` are only known when the account has no open orders.
pub fn parse_balance<L: MarketLookup + ?Sized>(raw: &Value, markets: &L) -> Balances {
    let no_open_orders = field_i64(raw, "open_orders") == Some(0);

    let mut currencies = BTreeMap::new();
    if let Some(funds) = raw.get("funds").and_then(Value::as_object) {
        for (id, value) in funds {
            let free = decimal(value);
            let (used, total) = if no_open_orders {
                (Some(Decimal::ZERO), free)
            } else {
                (None, None)
            };
            currencies.insert(markets.currency_code(id), Balance { free, used, total });
        }
    }

    Balances {
        currencies,
        timestamp: field_millis(raw, "server_time"),
        raw: raw.clone(),
    }
}

fn parse_levels(raw: Option<&Value>) -> ExchangeResult<Vec<BookLevel>> {
    let Some(Value::Array(rows)) = raw else {
        return Ok(Vec::new());
    };
    rows.iter()
        .map(|row| {
            let price = row.get(0).and_then(decimal);
            let amount = row.get(1).and_then(decimal);
            match (price, amount) {
                (Some(price), Some(amount)) => Ok(BookLevel { price, amount }),
                _ => Err(ExchangeError::bad_response(format!("Invalid book level: {}", row))),
            }
        })
        .collect()
}

/// Order book from `depth/{pair}`.
pub fn parse_order_book(raw: &Value, symbol: &str) -> ExchangeResult<OrderBook> {
    let mut bids = parse_levels(raw.get("bids"))?;
    let mut asks = parse_levels(raw.get("asks"))?;
    bids.sort_by(|a, b| b.price.cmp(&a.price));
    asks.sort_by(|a, b| a.price.cmp(&b.price));

    Ok(OrderBook {
        symbol: symbol.to_string(),
        bids,
        asks,
        timestamp: None,
    })
}
