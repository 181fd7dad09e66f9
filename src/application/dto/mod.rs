// src/application/dto/mod.rs
// Field readers for the venue's loosely typed JSON payloads

pub mod parser;

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Read a decimal from a JSON number or numeric string.
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            parse_decimal_str(&n.to_string())
        }
        Value::String(s) => parse_decimal_str(s.trim()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

pub fn field_decimal(obj: &Value, key: &str) -> Option<Decimal> {
    obj.get(key).and_then(decimal)
}

/// Read a field as a string, accepting numbers and strings alike.
pub fn field_string(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn field_i64(obj: &Value, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a venue timestamp (seconds) as milliseconds. Out-of-range values read as unknown.
pub fn field_millis(obj: &Value, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => secs.checked_mul(1000),
            None => n.as_f64().and_then(|secs| {
                let millis = secs * 1000.0;
                (millis.is_finite() && millis.abs() < i64::MAX as f64).then(|| millis as i64)
            }),
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?.checked_mul(1000),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn decimal_reads_numbers_and_strings() {
        assert_eq!(decimal(&json!(0.03)), Some(dec!(0.03)));
        assert_eq!(decimal(&json!(42)), Some(dec!(42)));
        assert_eq!(decimal(&json!("1.5")), Some(dec!(1.5)));
        assert_eq!(decimal(&json!(1e-8)), Some(dec!(0.00000001)));
        assert_eq!(decimal(&Value::Null), None);
        assert_eq!(decimal(&json!("abc")), None);
    }

    #[test]
    fn timestamps_are_converted_to_millis() {
        let obj = json!({"a": 1500000000, "b": "1500000001", "c": null});
        assert_eq!(field_millis(&obj, "a"), Some(1_500_000_000_000));
        assert_eq!(field_millis(&obj, "b"), Some(1_500_000_001_000));
        assert_eq!(field_millis(&obj, "c"), None);
        assert_eq!(field_millis(&obj, "missing"), None);
    }

    #[test]
    fn overflowing_timestamps_are_unknown() {
        let obj = json!({
            "updated": 92233720368547750i64,
            "text": "92233720368547750",
            "huge": 18446744073709551615u64,
            "float": 1e300
        });
        assert_eq!(field_millis(&obj, "updated"), None);
        assert_eq!(field_millis(&obj, "text"), None);
        assert_eq!(field_millis(&obj, "huge"), None);
        assert_eq!(field_millis(&obj, "float"), None);
    }

    #[test]
    fn field_string_accepts_numbers() {
        let obj = json!({"id": 555, "code": "833"});
        assert_eq!(field_string(&obj, "id").as_deref(), Some("555"));
        assert_eq!(field_string(&obj, "code").as_deref(), Some("833"));
    }
}
