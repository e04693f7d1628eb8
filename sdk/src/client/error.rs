//! Client error types.
//!
//! Provides error types for API client operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::transport::TransportError;

/// Machine-readable error code reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The request never reached the API.
    NetworkError,
    /// No card matches the token.
    TokenNotFound,
    /// No card matches the external id.
    ExternalIdNotFound,
    /// A charge with this external id already exists.
    DuplicateExternalId,
    /// The token has already been charged.
    TokenAlreadyUsed,
    /// The partner account is banned.
    YourAccountIsBanned,
    /// A code this SDK does not know about.
    Other(String),
}

impl ErrorCode {
    /// Returns the wire form of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NetworkError => "networkError",
            Self::TokenNotFound => "tokenNotFound",
            Self::ExternalIdNotFound => "externalIdNotFound",
            Self::DuplicateExternalId => "duplicateExternalId",
            Self::TokenAlreadyUsed => "tokenAlreadyUsed",
            Self::YourAccountIsBanned => "yourAccountIsBanned",
            Self::Other(code) => code,
        }
    }

    /// Returns true for the codes a lookup treats as "no such card".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TokenNotFound | Self::ExternalIdNotFound)
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "networkError" => Self::NetworkError,
            "tokenNotFound" => Self::TokenNotFound,
            "externalIdNotFound" => Self::ExternalIdNotFound,
            "duplicateExternalId" => Self::DuplicateExternalId,
            "tokenAlreadyUsed" => Self::TokenAlreadyUsed,
            "yourAccountIsBanned" => Self::YourAccountIsBanned,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from(code.as_str()))
    }
}

static NETWORK_ERROR: ErrorCode = ErrorCode::NetworkError;

/// Client errors.
#[derive(Debug)]
pub enum ClientError {
    /// The transport failed before a response body was obtained.
    Network(TransportError),

    /// The API could not be used: malformed response, server-reported error
    /// or an unexpected payload.
    Api {
        /// Error message.
        message: String,
        /// Error code, when the server sent one.
        code: Option<ErrorCode>,
    },

    /// Invalid configuration.
    InvalidConfig(String),
}

impl ClientError {
    /// Creates an API error without a code.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Creates an API error carrying a server code.
    pub fn api_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Api {
            message: message.into(),
            code: Some(code),
        }
    }

    /// Returns the machine-readable code of the error.
    ///
    /// Network failures report [`ErrorCode::NetworkError`].
    #[must_use]
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Network(_) => Some(&NETWORK_ERROR),
            Self::Api { code, .. } => code.as_ref(),
            Self::InvalidConfig(_) => None,
        }
    }

    /// Returns true if the server reported that the card does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_not_found)
    }

    /// Returns true if this is a transport failure.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::Api {
                message,
                code: Some(code),
            } => write!(f, "API error [{}]: {}", code, message),
            Self::Api {
                message,
                code: None,
            } => write!(f, "API error: {}", message),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        Self::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_api_display() {
        let err = ClientError::api_with_code("already used", ErrorCode::TokenAlreadyUsed);
        assert_eq!(err.to_string(), "API error [tokenAlreadyUsed]: already used");

        let err = ClientError::api("malformed JSON");
        assert_eq!(err.to_string(), "API error: malformed JSON");
    }

    #[test]
    fn test_client_error_network() {
        let err = ClientError::from(TransportError::Timeout);
        assert!(err.is_network());
        assert_eq!(err.code(), Some(&ErrorCode::NetworkError));
        assert_eq!(err.to_string(), "network error: connection timed out");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_client_error_invalid_config() {
        let err = ClientError::InvalidConfig("base_url cannot be empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: base_url cannot be empty"
        );
        assert!(err.code().is_none());
    }

    #[test]
    fn test_client_error_is_not_found() {
        assert!(ClientError::api_with_code("x", ErrorCode::TokenNotFound).is_not_found());
        assert!(ClientError::api_with_code("x", ErrorCode::ExternalIdNotFound).is_not_found());
        assert!(!ClientError::api_with_code("x", ErrorCode::TokenAlreadyUsed).is_not_found());
        assert!(!ClientError::api("x").is_not_found());
    }

    #[test]
    fn test_error_code_round_trip_known() {
        for code in [
            "networkError",
            "tokenNotFound",
            "externalIdNotFound",
            "duplicateExternalId",
            "tokenAlreadyUsed",
            "yourAccountIsBanned",
        ] {
            let parsed = ErrorCode::from(code);
            assert!(!matches!(parsed, ErrorCode::Other(_)), "{code}");
            assert_eq!(parsed.as_str(), code);
        }
    }

    #[test]
    fn test_error_code_passes_unknown_through() {
        let code = ErrorCode::from("cardFrozen");
        assert_eq!(code, ErrorCode::Other("cardFrozen".to_string()));
        assert_eq!(code.to_string(), "cardFrozen");
    }

    #[test]
    fn test_error_code_serde() {
        let code: ErrorCode = serde_json::from_str("\"tokenNotFound\"").expect("deserialize");
        assert_eq!(code, ErrorCode::TokenNotFound);
        assert_eq!(
            serde_json::to_string(&ErrorCode::DuplicateExternalId).expect("serialize"),
            "\"duplicateExternalId\""
        );
    }
}
