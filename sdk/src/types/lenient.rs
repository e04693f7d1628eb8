//! Lenient field decoders.
//!
//! The Giftd API is loose about JSON scalar types: integers may come back as
//! strings, booleans as `0`/`1`, timestamps as unix seconds or SQL datetimes.
//!
//! Each decoder returns `Ok(None)` for a value that means "absent" (`null`,
//! and `""` where noted), `Ok(Some(..))` for a usable value, and gives the raw
//! value back as `Err` when it has some other shape, so the caller can keep
//! it instead of losing it.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::gift_card::ChargeDetails;

/// Result of decoding one field: the raw value on a shape mismatch.
pub(crate) type Decoded<T> = Result<Option<T>, Value>;

/// Maps `null` and blank strings to `None`.
fn present(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(ref s) if s.trim().is_empty() => None,
        v => Some(v),
    }
}

/// Integer given as a number or a numeric string.
pub(crate) fn int(value: Value) -> Decoded<i64> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or(value)
}

/// Text that may arrive as a number or a boolean.
pub(crate) fn text(value: Value) -> Decoded<String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(other),
    }
}

/// Keyword of an enumeration; unknown keywords are the target's business.
pub(crate) fn keyword<T>(value: Value) -> Decoded<T>
where
    T: for<'a> From<&'a str>,
{
    match present(value) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(T::from(s.trim()))),
        Some(other) => Err(other),
    }
}

/// Boolean given as `true`/`false`, `0`/`1` or their string forms.
pub(crate) fn flag(value: Value) -> Decoded<bool> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::Number(ref n) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
        Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" => Ok(Some(false)),
            "1" | "true" => Ok(Some(true)),
            _ => Err(value),
        },
        other => Err(other),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Decimal given as a number or a numeric string.
pub(crate) fn decimal(value: Value) -> Decoded<Decimal> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed.map(Some).ok_or(value)
}

/// Unix time with an optional fractional part.
fn from_unix(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(secs) = text.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(secs) = text.parse::<f64>() {
        return from_unix(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Timestamp given as unix seconds (whole or fractional), an SQL datetime,
/// a date or RFC 3339.
pub(crate) fn timestamp(value: Value) -> Decoded<DateTime<Utc>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    let parsed = match &value {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => Utc.timestamp_opt(secs, 0).single(),
            None => n.as_f64().and_then(from_unix),
        },
        Value::String(s) => parse_timestamp(s),
        _ => None,
    };
    parsed.map(Some).ok_or(value)
}

/// Keys a JSON list by element index, the way PHP treats a list as a map.
pub(crate) fn indexed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

/// Nested charge details; `null`, `{}`, `[]` and `""` all mean absent.
///
/// PHP encodes an empty associative array as `[]` and a list as a JSON
/// array, so non-empty arrays are keyed by their index.
pub(crate) fn charge_details(value: Value) -> Decoded<ChargeDetails> {
    match present(value) {
        None => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(Value::Object(map)) => Ok(Some(ChargeDetails::new(map))),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Array(items)) => Ok(Some(ChargeDetails::new(indexed(items)))),
        Some(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_null_is_absent() {
        assert_eq!(int(Value::Null), Ok(None));
        assert_eq!(flag(Value::Null), Ok(None));
        assert_eq!(decimal(Value::Null), Ok(None));
        assert_eq!(timestamp(Value::Null), Ok(None));
        assert_eq!(text(Value::Null), Ok(None));
        assert_eq!(keyword::<String>(Value::Null), Ok(None));
    }

    #[test]
    fn test_int_from_number_and_string() {
        assert_eq!(int(json!(5)), Ok(Some(5)));
        assert_eq!(int(json!(5.0)), Ok(Some(5)));
        assert_eq!(int(json!("17")), Ok(Some(17)));
        assert_eq!(int(json!("")), Ok(None));
    }

    #[test]
    fn test_int_mismatch_returns_raw() {
        assert_eq!(int(json!("active")), Err(json!("active")));
        assert_eq!(int(json!(2.5)), Err(json!(2.5)));
        assert_eq!(int(json!({"a": 1})), Err(json!({"a": 1})));
    }

    #[test]
    fn test_flag_variants() {
        assert_eq!(flag(json!(true)), Ok(Some(true)));
        assert_eq!(flag(json!(0)), Ok(Some(false)));
        assert_eq!(flag(json!(1)), Ok(Some(true)));
        assert_eq!(flag(json!("1")), Ok(Some(true)));
        assert_eq!(flag(json!("0")), Ok(Some(false)));
        assert_eq!(flag(json!("")), Ok(Some(false)));
        assert_eq!(flag(json!("yes")), Err(json!("yes")));
    }

    #[test]
    fn test_decimal_from_number_and_string() {
        assert_eq!(decimal(json!(7.5)), Ok(Some(Decimal::new(75, 1))));
        assert_eq!(decimal(json!("1000.00")), Ok(Some(Decimal::new(100_000, 2))));
        assert_eq!(decimal(json!("lots")), Err(json!("lots")));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc
            .with_ymd_and_hms(2015, 3, 1, 12, 30, 0)
            .single()
            .expect("date");

        assert_eq!(timestamp(json!(expected.timestamp())), Ok(Some(expected)));
        assert_eq!(
            timestamp(json!(expected.timestamp().to_string())),
            Ok(Some(expected))
        );
        assert_eq!(timestamp(json!("2015-03-01 12:30:00")), Ok(Some(expected)));
        assert_eq!(
            timestamp(json!("2015-03-01T12:30:00+00:00")),
            Ok(Some(expected))
        );
        assert!(matches!(timestamp(json!("2015-03-01")), Ok(Some(_))));
        assert_eq!(timestamp(json!("someday")), Err(json!("someday")));
    }

    #[test]
    fn test_timestamp_fractional_seconds() {
        let expected = Utc
            .timestamp_opt(1_425_213_000, 500_000_000)
            .single()
            .expect("date");

        assert_eq!(timestamp(json!(1425213000.5)), Ok(Some(expected)));
        assert_eq!(timestamp(json!("1425213000.5")), Ok(Some(expected)));
    }

    #[test]
    fn test_text_from_scalars() {
        assert_eq!(text(json!(42)), Ok(Some("42".to_string())));
        assert_eq!(text(json!("card")), Ok(Some("card".to_string())));
        assert_eq!(text(json!(true)), Ok(Some("true".to_string())));
        assert_eq!(text(json!(["a"])), Err(json!(["a"])));
    }

    #[test]
    fn test_keyword() {
        assert_eq!(keyword::<String>(json!("ok")), Ok(Some("ok".to_string())));
        assert_eq!(keyword::<String>(json!("")), Ok(None));
        assert_eq!(keyword::<String>(json!(3)), Err(json!(3)));
    }

    #[test]
    fn test_charge_details_shapes() {
        for empty in [json!([]), json!({}), json!(null), json!("")] {
            assert_eq!(charge_details(empty), Ok(None));
        }

        let listed = charge_details(json!(["a", "b"]))
            .expect("list")
            .expect("details");
        assert_eq!(listed.get_str("1"), Some("b"));

        assert_eq!(charge_details(json!("paid")), Err(json!("paid")));
    }
}
