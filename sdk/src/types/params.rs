//! Request parameter types.
//!
//! Provides the scalar parameter value and the ordered parameter set shared by
//! request signing and form encoding.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

/// A scalar request parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// No value. Rendered as the empty string.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Decimal value, rendered with its own scale (`3.00` stays `3.00`).
    Decimal(Decimal),
    /// Text value.
    Text(String),
}

impl ParamValue {
    /// Returns true if the value is [`ParamValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value the way it is placed on the wire.
    ///
    /// The same text is used for the signature base and the form body.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An ordered set of request parameters.
///
/// Keys are kept in ordinal (byte-wise) order, so iteration order never
/// depends on the order parameters were inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, returning the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a parameter, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the parameters as form fields, in key order.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_param_value_render() {
        assert_eq!(ParamValue::Null.render(), "");
        assert_eq!(ParamValue::Bool(true).render(), "true");
        assert_eq!(ParamValue::Int(-42).render(), "-42");
        assert_eq!(ParamValue::Float(10.0).render(), "10");
        assert_eq!(ParamValue::Float(7.5).render(), "7.5");
        assert_eq!(ParamValue::Text("abc".to_string()).render(), "abc");
    }

    #[test]
    fn test_param_value_decimal_keeps_scale() {
        let amount = Decimal::from_str("3.00").expect("decimal");
        assert_eq!(ParamValue::from(amount).render(), "3.00");
    }

    #[test]
    fn test_param_value_from_option() {
        assert!(ParamValue::from(None::<&str>).is_null());
        assert_eq!(
            ParamValue::from(Some("x")),
            ParamValue::Text("x".to_string())
        );
    }

    #[test]
    fn test_params_sorted_by_key() {
        let params = Params::new()
            .with("token", "abc")
            .with("amount_total", 10)
            .with("Zeta", "upper")
            .with("client_ip", "127.0.0.1");

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Zeta", "amount_total", "client_ip", "token"]);
    }

    #[test]
    fn test_params_insert_replaces() {
        let mut params = Params::new().with("client_ip", "1.1.1.1");
        params.insert("client_ip", "2.2.2.2");
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("client_ip"),
            Some(&ParamValue::Text("2.2.2.2".to_string()))
        );
    }

    #[test]
    fn test_params_to_form_renders_null_as_empty() {
        let params = Params::new()
            .with("external_id", None::<String>)
            .with("token", "abc");

        assert_eq!(
            params.to_form(),
            vec![
                ("external_id".to_string(), String::new()),
                ("token".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_from_iter() {
        let params: Params = vec![("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert!(params.contains_key("a"));
        assert!(!params.is_empty());
    }
}
