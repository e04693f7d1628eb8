//! Response envelope.
//!
//! Every API response is a JSON object of the form
//! `{"type": "data" | "error", "data": ..., "code": ...}`.

use serde_json::Value;

use super::error::{ClientError, ErrorCode};

/// Envelope type of a successful response.
pub const TYPE_DATA: &str = "data";

/// Envelope type of a server-reported error.
pub const TYPE_ERROR: &str = "error";

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The `type` field.
    pub response_type: String,
    /// The `data` field; `Null` when absent.
    pub data: Value,
    /// The `code` field of error responses.
    pub code: Option<ErrorCode>,
}

/// JSON values a loosely typed decoder would treat as false.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

impl Envelope {
    /// Decodes a raw response body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the body is not JSON, decodes to an
    /// empty or false value, or has no `type`.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        let value: Value =
            serde_json::from_str(body).map_err(|_| ClientError::api("malformed JSON"))?;

        if is_falsy(&value) {
            return Err(ClientError::api("malformed JSON"));
        }

        let Value::Object(mut map) = value else {
            return Err(ClientError::api("missing type field"));
        };

        let response_type = match map.remove("type") {
            Some(Value::String(t)) if !t.is_empty() => t,
            _ => return Err(ClientError::api("missing type field")),
        };

        let code = match map.remove("code") {
            Some(Value::String(c)) if !c.is_empty() => Some(ErrorCode::from(c.as_str())),
            _ => None,
        };

        Ok(Self {
            response_type,
            data: map.remove("data").unwrap_or(Value::Null),
            code,
        })
    }

    /// Returns true for `type: "error"`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.response_type == TYPE_ERROR
    }

    /// Returns true for `type: "data"`.
    #[must_use]
    pub fn is_data(&self) -> bool {
        self.response_type == TYPE_DATA
    }

    /// Returns the error message carried in `data`.
    ///
    /// Non-string payloads are rendered as JSON.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Converts the envelope into the error it reports.
    #[must_use]
    pub fn into_error(self) -> ClientError {
        ClientError::Api {
            message: self.message(),
            code: self.code,
        }
    }
}
