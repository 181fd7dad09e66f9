// src/infrastructure/market/mod.rs
// Market metadata loaded from the public `info` endpoint

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;

use crate::application::dto::{field_decimal, field_i64};
use crate::domain::errors::{ExchangeError, ExchangeResult};
use crate::domain::models::{Limits, Market, MinMax, Precision};
use crate::domain::repository::MarketLookup;

const DEFAULT_MAKER_FEE: Decimal = Decimal::from_parts(1, 0, 0, false, 3); // 0.001
const DEFAULT_TAKER_FEE: Decimal = Decimal::from_parts(25, 0, 0, false, 4); // 0.0025
const DEFAULT_DECIMAL_PLACES: u32 = 8;

/// Venue currency aliases
const CURRENCY_ALIASES: &[(&str, &str)] = &[("DSH", "DASH"), ("XBT", "BTC"), ("BCC", "BCH")];

/// Canonical currency code for a venue currency id.
pub fn common_currency_code(id: &str) -> String {
    let upper = id.to_uppercase();
    CURRENCY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}

/// Immutable set of markets, indexed by symbol and by venue id
#[derive(Debug, Clone, Default)]
pub struct MarketCatalog {
    by_symbol: HashMap<String, Market>,
    symbol_by_id: HashMap<String, String>,
}

impl MarketCatalog {
    pub fn from_markets(markets: Vec<Market>) -> Self {
        let mut catalog = Self::default();
        for market in markets {
            catalog
                .symbol_by_id
                .insert(market.id.clone(), market.symbol.clone());
            catalog.by_symbol.insert(market.symbol.clone(), market);
        }
        catalog
    }

    /// Build from the `info` response: `{"pairs": {"eth_btc": {...}}}`.
    pub fn from_info(info: &Value) -> ExchangeResult<Self> {
        let pairs = info
            .get("pairs")
            .and_then(Value::as_object)
            .ok_or_else(|| ExchangeError::bad_response("info response without pairs"))?;

        let markets = pairs
            .iter()
            .map(|(id, raw)| parse_market(id, raw))
            .collect::<ExchangeResult<Vec<_>>>()?;

        log::info!("Loaded {} markets", markets.len());
        Ok(Self::from_markets(markets))
    }

    /// All markets, ordered by symbol
    pub fn markets(&self) -> Vec<Market> {
        let mut markets: Vec<Market> = self.by_symbol.values().cloned().collect();
        markets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        markets
    }

    pub fn market_by_id(&self, id: &str) -> Option<&Market> {
        self.symbol_by_id
            .get(id)
            .and_then(|symbol| self.by_symbol.get(symbol))
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    /// Venue currency id for a canonical code, e.g. DASH -> dsh.
    pub fn currency_id(&self, code: &str) -> String {
        self.by_symbol
            .values()
            .flat_map(|m| [(&m.base, &m.base_id), (&m.quote, &m.quote_id)])
            .find(|(c, _)| c.as_str() == code)
            .map(|(_, id)| id.clone())
            .unwrap_or_else(|| code.to_lowercase())
    }
}

impl MarketLookup for MarketCatalog {
    fn market(&self, symbol: &str) -> ExchangeResult<&Market> {
        self.by_symbol
            .get(symbol)
            .ok_or_else(|| ExchangeError::bad_symbol(symbol))
    }

    fn symbol_for_id(&self, id: &str) -> String {
        if let Some(symbol) = self.symbol_by_id.get(id) {
            return symbol.clone();
        }
        match id.split_once('_') {
            Some((base, quote)) => format!(
                "{}/{}",
                common_currency_code(base),
                common_currency_code(quote)
            ),
            None => id.to_uppercase(),
        }
    }

    fn currency_code(&self, id: &str) -> String {
        common_currency_code(id)
    }
}

fn parse_market(id: &str, raw: &Value) -> ExchangeResult<Market> {
    let (base_id, quote_id) = id
        .split_once('_')
        .ok_or_else(|| ExchangeError::bad_response(format!("Malformed pair id: {}", id)))?;
    let base = common_currency_code(base_id);
    let quote = common_currency_code(quote_id);

    let decimals = field_i64(raw, "decimal_places")
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or(DEFAULT_DECIMAL_PLACES);

    let taker_fee = field_decimal(raw, "fee")
        .map(|pct| pct / Decimal::ONE_HUNDRED)
        .unwrap_or(DEFAULT_TAKER_FEE);

    Ok(Market {
        id: id.to_string(),
        symbol: format!("{}/{}", base, quote),
        base,
        quote,
        base_id: base_id.to_string(),
        quote_id: quote_id.to_string(),
        precision: Precision {
            amount: decimals,
            price: decimals,
        },
        limits: Limits {
            amount: MinMax {
                min: field_decimal(raw, "min_amount"),
                max: field_decimal(raw, "max_amount"),
            },
            price: MinMax {
                min: field_decimal(raw, "min_price"),
                max: field_decimal(raw, "max_price"),
            },
            cost: MinMax {
                min: field_decimal(raw, "min_total"),
                max: None,
            },
        },
        maker_fee: DEFAULT_MAKER_FEE,
        taker_fee,
        active: field_i64(raw, "hidden").unwrap_or(0) == 0,
    })
}
