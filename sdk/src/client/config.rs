//! Client configuration.
//!
//! Provides configuration options for the API client.

use std::env;
use std::time::Duration;

use super::error::ClientError;

/// Default base URL for the API.
pub const DEFAULT_BASE_URL: &str = "https://api.giftd.ru/v1/";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "GIFTD_BASE_URL";

/// Environment variable holding the connection timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "GIFTD_TIMEOUT_MS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL the method path is appended to. Always ends with `/`.
    pub base_url: String,

    /// Connection timeout. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: None,
            user_agent: format!("giftd-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
    url
}

impl ClientConfig {
    /// Creates a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: with_trailing_slash(base_url.into()),
            ..Default::default()
        }
    }

    /// Builds a configuration from `GIFTD_BASE_URL` and `GIFTD_TIMEOUT_MS`,
    /// falling back to the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = match env::var(ENV_BASE_URL) {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };

        if let Ok(raw) = env::var(ENV_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "{} must be a number, got {:?}",
                    ENV_TIMEOUT_MS, raw
                ))
            })?;
            config = config.with_timeout_ms(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = with_trailing_slash(base_url.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the connection timeout in milliseconds; `0` disables it.
    #[must_use]
    pub fn with_timeout_ms(self, ms: u64) -> Self {
        let timeout = (ms > 0).then(|| Duration::from_millis(ms));
        self.with_connect_timeout(timeout)
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Joins a method path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, method: &str) -> String {
        format!("{}{}", self.base_url, method.trim_start_matches('/'))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        if !self.base_url.ends_with('/') {
            return Err(ClientError::InvalidConfig(
                "base_url must end with /".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.connect_timeout.is_none());
        assert!(config.user_agent.starts_with("giftd-sdk/"));
    }

    #[test]
    fn test_config_new_appends_slash() {
        let config = ClientConfig::new("https://api.example.com/v1");
        assert_eq!(config.base_url, "https://api.example.com/v1/");

        let config = ClientConfig::new("https://api.example.com/v1/");
        assert_eq!(config.base_url, "https://api.example.com/v1/");
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080")
            .with_timeout_ms(1500)
            .with_user_agent("my-shop/1.0");

        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.user_agent, "my-shop/1.0");
    }

    #[test]
    fn test_config_zero_timeout_disables() {
        let config = ClientConfig::default()
            .with_timeout_ms(1500)
            .with_timeout_ms(0);
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn test_config_endpoint() {
        let config = ClientConfig::new("https://api.example.com/v1");
        assert_eq!(
            config.endpoint("gift/check"),
            "https://api.example.com/v1/gift/check"
        );
        assert_eq!(
            config.endpoint("/gift/charge"),
            "https://api.example.com/v1/gift/charge"
        );
    }

    // Only this test touches the GIFTD_* variables.
    #[test]
    fn test_config_from_env() {
        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_TIMEOUT_MS);
        assert_eq!(ClientConfig::from_env().expect("defaults"), ClientConfig::default());

        env::set_var(ENV_BASE_URL, "http://localhost:9000/v1");
        env::set_var(ENV_TIMEOUT_MS, "250");
        let config = ClientConfig::from_env().expect("from env");
        assert_eq!(config.base_url, "http://localhost:9000/v1/");
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(250)));

        env::set_var(ENV_TIMEOUT_MS, "soon");
        assert!(ClientConfig::from_env().is_err());

        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_TIMEOUT_MS);
    }

    #[test]
    fn test_config_validate_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validate_empty_url() {
        let config = ClientConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_invalid_scheme() {
        let config = ClientConfig::new("ftp://api.example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_missing_slash() {
        let config = ClientConfig {
            base_url: "https://api.example.com/v1".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
