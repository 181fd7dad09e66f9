// src/infrastructure/mod.rs
pub mod exchange;
pub mod market;
pub mod store;

pub use exchange::LiquiExchange;
pub use market::MarketCatalog;
pub use store::InMemoryOrderStore;
