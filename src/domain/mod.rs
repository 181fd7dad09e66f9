// src/domain/mod.rs
pub mod errors;
pub mod models;
pub mod repository;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, ErrorKind, ExchangeError, ExchangeResult};
pub use models::{
    Balance, Balances, BookLevel, Coupon, DepositAddress, Limits, Market, MinMax, Order,
    OrderBook, OrderSide, OrderStatus, OrderType, Precision, RedeemedCoupon, Ticker, Trade,
    Withdrawal,
};
