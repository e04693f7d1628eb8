//! Gift card types for the Giftd SDK.
//!
//! Provides the gift card record returned by `gift/check` and `gift/charge`,
//! and its nested charge details.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use super::lenient;

/// How a gift card may be charged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChargeType {
    /// The whole balance is consumed by a single charge.
    Onetime,
    /// The balance can be charged several times.
    Multiple,
    /// A value this SDK does not know about, as sent.
    Unknown(String),
}

impl ChargeType {
    /// Returns the wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Onetime => "onetime",
            Self::Multiple => "multiple",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for ChargeType {
    fn from(s: &str) -> Self {
        match s {
            "onetime" => Self::Onetime,
            "multiple" => Self::Multiple,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChargeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChargeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// State of the token a card was looked up with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenStatus {
    /// Token can be used.
    Ok,
    /// Token has already been used.
    Used,
    /// A value this SDK does not know about, as sent.
    Unknown(String),
}

impl TokenStatus {
    /// Returns the wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Used => "used",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for TokenStatus {
    fn from(s: &str) -> Self {
        match s {
            "ok" => Self::Ok,
            "used" => Self::Used,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TokenStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Details of a charge made against a card.
///
/// The server does not fix the shape of this object, so it is kept as an
/// opaque mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargeDetails(Map<String, Value>);

impl ChargeDetails {
    /// Wraps a raw mapping.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a field as a string slice, if it is a JSON string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the underlying mapping.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// A gift card as reported by the server.
///
/// Keys the server sends that are not listed here are kept in
/// [`GiftCard::extra`], and so is the raw value of a listed key whose value
/// has a shape the field cannot hold; the field is then `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GiftCard {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Numeric card status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,

    /// Human-readable card status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_str: Option<String>,

    /// Balance available for charging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_available: Option<Decimal>,

    /// Card design identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<i64>,

    /// Card design title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_title: Option<String>,

    /// Name of the card owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,

    /// Gender of the card owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_gender: Option<String>,

    /// Whether a charge must state the order total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_total_required: Option<bool>,

    /// Minimum order total the card may be used on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount_total: Option<Decimal>,

    /// How the card may be charged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_type: Option<ChargeType>,

    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Expiry time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// State of the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_status: Option<TokenStatus>,

    /// Details of the last charge, when the server reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_details: Option<ChargeDetails>,

    /// Token the card was looked up with. Always the caller's value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Whether the card cannot be used on discounted items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cannot_be_used_on_discounted_items: Option<bool>,

    /// Whether the card was issued for free.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,

    /// Fields not enumerated above, and listed fields with unusable values.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pulls known keys out of a raw record, setting unusable values aside.
struct Fields {
    raw: Map<String, Value>,
    rejected: Map<String, Value>,
}

impl Fields {
    fn take<T>(
        &mut self,
        key: &str,
        decode: impl FnOnce(Value) -> lenient::Decoded<T>,
    ) -> Option<T> {
        let value = self.raw.remove(key)?;
        match decode(value) {
            Ok(decoded) => decoded,
            Err(raw) => {
                debug!(field = key, value = %raw, "unexpected gift card value kept raw");
                self.rejected.insert(key.to_string(), raw);
                None
            }
        }
    }
}

impl GiftCard {
    /// Builds a card from a raw record. Never fails: see [`GiftCard::extra`].
    #[must_use]
    pub fn from_fields(raw: Map<String, Value>) -> Self {
        let mut fields = Fields {
            raw,
            rejected: Map::new(),
        };

        let mut card = Self {
            id: fields.take("id", lenient::int),
            status: fields.take("status", lenient::int),
            status_str: fields.take("status_str", lenient::text),
            amount_available: fields.take("amount_available", lenient::decimal),
            card_id: fields.take("card_id", lenient::int),
            card_title: fields.take("card_title", lenient::text),
            owner_name: fields.take("owner_name", lenient::text),
            owner_gender: fields.take("owner_gender", lenient::text),
            amount_total_required: fields.take("amount_total_required", lenient::flag),
            min_amount_total: fields.take("min_amount_total", lenient::decimal),
            charge_type: fields.take("charge_type", lenient::keyword),
            created: fields.take("created", lenient::timestamp),
            expires: fields.take("expires", lenient::timestamp),
            token_status: fields.take("token_status", lenient::keyword),
            charge_details: fields.take("charge_details", lenient::charge_details),
            token: fields.take("token", lenient::text),
            cannot_be_used_on_discounted_items: fields
                .take("cannot_be_used_on_discounted_items", lenient::flag),
            is_free: fields.take("is_free", lenient::flag),
            extra: Map::new(),
        };

        card.extra = fields.raw;
        card.extra.append(&mut fields.rejected);
        card
    }

    /// Builds a card from the `data` payload of a response.
    ///
    /// `token` replaces whatever token the server echoed back. `null` and
    /// `[]` give an empty card; a non-empty list is keyed by index.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is a scalar other than `null`.
    pub fn from_data(data: Value, token: Option<String>) -> Result<Self, serde_json::Error> {
        let raw = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            Value::Array(items) => lenient::indexed(items),
            other => {
                return Err(serde_json::Error::custom(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };

        let mut card = Self::from_fields(raw);
        card.extra.remove("token");
        card.token = token;
        Ok(card)
    }

    /// Returns true if the token is unused and there is balance left.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.token_status != Some(TokenStatus::Used)
            && self
                .amount_available
                .is_some_and(|amount| amount > Decimal::ZERO)
    }

    /// Returns true if the card expired before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires < now)
    }

    /// Returns true if charges must state the order total.
    #[must_use]
    pub fn requires_amount_total(&self) -> bool {
        self.amount_total_required.unwrap_or(false)
    }
}

impl fmt::Display for GiftCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GiftCard(")?;
        match self.id {
            Some(id) => write!(f, "id: {}", id)?,
            None => write!(f, "id: -")?,
        }
        if let Some(ref status) = self.status_str {
            write!(f, ", status: {}", status)?;
        }
        if let Some(amount) = self.amount_available {
            write!(f, ", available: {}", amount)?;
        }
        write!(f, ")")
    }
}

impl<'de> Deserialize<'de> for GiftCard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_fields(raw))
    }
}
