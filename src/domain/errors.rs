// src/domain/errors.rs
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome category of a failed venue interaction.
///
/// Callers match on this instead of on error subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or rejected credentials, or a key without the needed permission
    Authentication,
    /// Amount, price or cost outside venue bounds, or malformed parameters
    InvalidOrder,
    /// Balance below what the order requires
    InsufficientFunds,
    /// Unknown or already finalized order id
    OrderNotFound,
    /// Rate limited or transiently unavailable
    DDoSProtection,
    /// Unclassified venue failure
    Exchange,
    /// Transport failure or non-2xx status without a recognized envelope
    Network,
    /// Body or field the adapter cannot interpret
    BadResponse,
    /// Symbol not listed by the venue
    BadSymbol,
    /// Operation the venue does not offer
    NotSupported,
}

impl ErrorKind {
    /// Whether the caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::DDoSProtection | ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "Authentication error",
            ErrorKind::InvalidOrder => "Invalid order",
            ErrorKind::InsufficientFunds => "Insufficient funds",
            ErrorKind::OrderNotFound => "Order not found",
            ErrorKind::DDoSProtection => "Rate limit exceeded",
            ErrorKind::Exchange => "Exchange error",
            ErrorKind::Network => "Network error",
            ErrorKind::BadResponse => "Bad response",
            ErrorKind::BadSymbol => "Bad symbol",
            ErrorKind::NotSupported => "Not supported",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct ExchangeError {
    pub kind: ErrorKind,
    pub venue_code: Option<String>,
    pub message: String,
    pub raw: Option<Value>,
}

impl ExchangeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            venue_code: None,
            message: message.into(),
            raw: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.venue_code = Some(code.into());
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadResponse, message)
    }

    pub fn bad_symbol(symbol: &str) -> Self {
        Self::new(ErrorKind::BadSymbol, format!("Unknown market symbol: {}", symbol))
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type ExchangeResult<T> = Result<T, ExchangeError>;
