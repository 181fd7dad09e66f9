// src/main.rs
use liqui_adapter::config::Config;
use liqui_adapter::domain::errors::AppResult;
use liqui_adapter::domain::repository::ExchangeRepository;
use liqui_adapter::infrastructure::LiquiExchange;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting liqui_adapter v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Public API: {}", config.exchange.public_url);

    let exchange = LiquiExchange::from_config(&config.exchange);

    let markets = exchange.load_markets(false).await?;
    log::info!("{} markets listed", markets.len());

    for ticker in exchange.fetch_tickers(&config.symbols).await? {
        log::info!(
            "{}: last={} bid={} ask={} volume={}",
            ticker.symbol,
            display(ticker.last),
            display(ticker.bid),
            display(ticker.ask),
            display(ticker.base_volume),
        );
    }

    if !exchange.has_credentials() {
        log::info!("No API credentials configured, skipping account data");
        return Ok(());
    }

    let balances = exchange.fetch_balance().await?;
    for (currency, balance) in &balances.currencies {
        if balance.free.map_or(false, |free| !free.is_zero()) {
            log::info!(
                "{}: free={} used={} total={}",
                currency,
                display(balance.free),
                display(balance.used),
                display(balance.total),
            );
        }
    }

    for symbol in &config.symbols {
        for order in exchange.fetch_orders(Some(symbol.as_str()), None, None).await? {
            log::info!(
                "Order {} {} {} {} @ {} filled={} ({})",
                order.id,
                order.symbol,
                order.side,
                display(order.amount),
                order.price,
                display(order.filled),
                order.status,
            );
        }
    }

    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
