// src/infrastructure/exchange/classifier.rs
// Maps the venue's response envelopes to typed errors

use serde_json::Value;

use crate::application::dto::field_string;
use crate::domain::errors::{ErrorKind, ExchangeError, ExchangeResult};

/// Venue error codes. A matching code wins over any message rule.
const CODE_TABLE: &[(&str, ErrorKind)] = &[
    ("803", ErrorKind::InvalidOrder),      // amount below minimum
    ("804", ErrorKind::InvalidOrder),      // amount above maximum
    ("805", ErrorKind::InvalidOrder),      // price below minimum
    ("806", ErrorKind::InvalidOrder),      // price above maximum
    ("807", ErrorKind::InvalidOrder),      // cost below minimum
    ("831", ErrorKind::InsufficientFunds), // not enough quote for a buy
    ("832", ErrorKind::InsufficientFunds), // not enough base for a sell
    ("833", ErrorKind::OrderNotFound),     // unknown or finalized order
];

enum MessageMatch {
    Exact(&'static str),
    Contains(&'static str),
}

impl MessageMatch {
    fn matches(&self, message: &str) -> bool {
        match self {
            MessageMatch::Exact(text) => message == *text,
            MessageMatch::Contains(text) => message.contains(text),
        }
    }
}

/// Message rules, checked in order. Case-sensitive.
const MESSAGE_RULES: &[(MessageMatch, ErrorKind)] = &[
    (MessageMatch::Exact("invalid api key"), ErrorKind::Authentication),
    (MessageMatch::Exact("invalid sign"), ErrorKind::Authentication),
    (MessageMatch::Exact("api key dont have trade permission"), ErrorKind::Authentication),
    (MessageMatch::Contains("invalid parameter"), ErrorKind::InvalidOrder),
    (MessageMatch::Exact("Requests too often"), ErrorKind::DDoSProtection),
    (MessageMatch::Exact("not available"), ErrorKind::DDoSProtection),
    (MessageMatch::Exact("data unavailable"), ErrorKind::DDoSProtection),
    (MessageMatch::Exact("external service unavailable"), ErrorKind::DDoSProtection),
];

/// The request a response belongs to, for diagnostics
#[derive(Debug, Clone, Copy)]
pub struct RequestMeta<'a> {
    pub method: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Parsed JSON that carried no failure indication
    Recognized(Value),
    /// Not a JSON object or array; left to the transport's default handling
    Unrecognized,
}

/// Normalize the venue's `success` flag. Only 1, true, "1" and "true" count as success.
pub fn normalize_success(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s == "true",
        _ => false,
    }
}

/// Kind for a failed envelope: code table first, then message rules, then generic.
pub fn error_kind_for(code: Option<&str>, message: &str) -> ErrorKind {
    if let Some(code) = code {
        if let Some((_, kind)) = CODE_TABLE.iter().find(|(c, _)| *c == code) {
            return *kind;
        }
    }
    MESSAGE_RULES
        .iter()
        .find(|(rule, _)| rule.matches(message))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::Exchange)
}

/// Inspect a response body. Fails with a typed error when the envelope reports failure.
pub fn classify(body: &str, request: &RequestMeta<'_>) -> ExchangeResult<Envelope> {
    let trimmed = body.trim();
    if trimmed.len() < 2 || !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Ok(Envelope::Unrecognized);
    }
    let response: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Ok(Envelope::Unrecognized),
    };

    let success = match response.get("success") {
        None => return Ok(Envelope::Recognized(response)),
        flag => normalize_success(flag),
    };
    if success {
        return Ok(Envelope::Recognized(response));
    }

    let code = field_string(&response, "code");
    let message = field_string(&response, "error").unwrap_or_default();
    let kind = error_kind_for(code.as_deref(), &message);

    log::warn!(
        "{} {} failed ({}): code={:?} error={:?}",
        request.method, request.url, kind, code, message
    );

    let mut err = ExchangeError::new(kind, message).with_raw(response);
    if let Some(code) = code {
        err = err.with_code(code);
    }
    Err(err)
}
