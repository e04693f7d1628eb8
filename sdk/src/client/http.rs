//! API client implementation.
//!
//! Provides the main client for the Giftd gift-card API.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::config::ClientConfig;
use super::envelope::{Envelope, TYPE_DATA, TYPE_ERROR};
use super::error::ClientError;
use super::signature::{sign, API_KEY_PARAM, SIGNATURE_PARAM, USER_ID_PARAM};
use super::transport::{ReqwestTransport, Transport, TransportError};
use crate::types::{GiftCard, Params};

/// Method checking a card.
pub const METHOD_CHECK: &str = "gift/check";

/// Method charging a card.
pub const METHOD_CHARGE: &str = "gift/charge";

/// Parameter carrying the end customer's IP address.
pub const CLIENT_IP_PARAM: &str = "client_ip";

/// Per-call values describing the end customer the call is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// IP address of the end customer. When set it replaces any `client_ip`
    /// parameter of the call.
    pub client_ip: Option<String>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the end customer's IP address.
    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }
}

/// Client for the Giftd gift-card API.
///
/// The user id and API key are fixed for the lifetime of the client. The
/// connection timeout is a plain setting; changing it while a call is in
/// flight is the caller's business.
#[derive(Clone)]
pub struct GiftdClient<T = ReqwestTransport> {
    user_id: String,
    api_key: String,
    config: ClientConfig,
    transport: T,
}

impl<T> fmt::Debug for GiftdClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GiftdClient")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GiftdClient<ReqwestTransport> {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(
        user_id: impl Into<String>,
        api_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.user_agent)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        Self::with_transport(user_id, api_key, config, transport)
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults(
        user_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::new(user_id, api_key, ClientConfig::default())
    }
}

impl<T: Transport> GiftdClient<T> {
    /// Creates a new client sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        user_id: impl Into<String>,
        api_key: impl Into<String>,
        config: ClientConfig,
        transport: T,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(ClientError::InvalidConfig(
                "user_id cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            user_id,
            api_key: api_key.into(),
            config,
            transport,
        })
    }

    /// Returns the partner user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.config.connect_timeout
    }

    /// Sets the connection timeout. `None` waits indefinitely.
    ///
    /// Only establishing the connection is bounded; a slow answer on an open
    /// connection is waited for.
    pub fn set_connect_timeout(&mut self, timeout: Option<Duration>) {
        self.config.connect_timeout = timeout;
    }

    /// Calls an API method.
    ///
    /// When `suppress_errors` is set, error envelopes are returned instead of
    /// being turned into `ClientError::Api`.
    ///
    /// `signature` and `user_id` are added to `params` before posting. An
    /// `api_key` entry is neither signed nor sent: it is stripped from the
    /// posted form so the secret never travels over the wire.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the request fails, and
    /// `ClientError::Api` if the response is malformed or reports an error.
    pub async fn query(
        &self,
        method: &str,
        params: Params,
        suppress_errors: bool,
    ) -> Result<Envelope, ClientError> {
        self.query_with_context(&RequestContext::default(), method, params, suppress_errors)
            .await
    }

    /// Calls an API method on behalf of the customer described by `ctx`.
    ///
    /// # Errors
    ///
    /// See [`GiftdClient::query`].
    pub async fn query_with_context(
        &self,
        ctx: &RequestContext,
        method: &str,
        mut params: Params,
        suppress_errors: bool,
    ) -> Result<Envelope, ClientError> {
        if let Some(ref client_ip) = ctx.client_ip {
            params.insert(CLIENT_IP_PARAM, client_ip.as_str());
        }

        let signature = sign(method, &self.user_id, &params, &self.api_key);
        params.remove(API_KEY_PARAM);
        params.insert(SIGNATURE_PARAM, signature);
        params.insert(USER_ID_PARAM, self.user_id.as_str());

        let url = self.config.endpoint(method);
        debug!(method, url = %url, "sending API request");

        let body = self
            .transport
            .post_form(&url, &params.to_form(), self.config.connect_timeout)
            .await
            .map_err(|e| {
                warn!(method, error = %e, "API request failed");
                ClientError::Network(e)
            })?;

        if body.trim().is_empty() {
            warn!(method, "API returned an empty body");
            return Err(ClientError::Network(TransportError::EmptyResponse));
        }
        trace!(method, body = %body, "API response");

        let envelope = Envelope::parse(&body)?;
        if envelope.is_error() && !suppress_errors {
            let err = envelope.into_error();
            warn!(method, error = %err, "API reported an error");
            return Err(err);
        }

        Ok(envelope)
    }

    /// Looks a card up by token or external id.
    ///
    /// Returns `Ok(None)` when the server reports that no such card exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports any other
    /// error.
    pub async fn check(
        &self,
        token: Option<&str>,
        external_id: Option<&str>,
        amount_total: Option<Decimal>,
        client_ip: Option<&str>,
    ) -> Result<Option<GiftCard>, ClientError> {
        let params = Params::new()
            .with("token", token)
            .with("external_id", external_id)
            .with("amount_total", amount_total)
            .with(CLIENT_IP_PARAM, client_ip);

        let envelope = self.query(METHOD_CHECK, params, true).await?;

        match envelope.response_type.as_str() {
            TYPE_ERROR if envelope.code.as_ref().is_some_and(|c| c.is_not_found()) => {
                debug!(code = ?envelope.code, "gift card not found");
                Ok(None)
            }
            TYPE_ERROR => {
                let err = envelope.into_error();
                warn!(method = METHOD_CHECK, error = %err, "API reported an error");
                Err(err)
            }
            TYPE_DATA => card_from(envelope.data, token).map(Some),
            other => Err(unknown_type(other)),
        }
    }

    /// Looks a card up by the external id of a previous charge.
    ///
    /// # Errors
    ///
    /// See [`GiftdClient::check`].
    pub async fn check_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<GiftCard>, ClientError> {
        self.check(None, Some(external_id), None, None).await
    }

    /// Looks a card up by token.
    ///
    /// # Errors
    ///
    /// See [`GiftdClient::check`].
    pub async fn check_by_token(
        &self,
        token: &str,
        amount_total: Option<Decimal>,
    ) -> Result<Option<GiftCard>, ClientError> {
        self.check(Some(token), None, amount_total, None).await
    }

    /// Charges `amount` from the card identified by `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports any
    /// error, including an unknown token.
    pub async fn charge(
        &self,
        token: &str,
        amount: Decimal,
        amount_total: Option<Decimal>,
        external_id: Option<&str>,
        comment: Option<&str>,
        client_ip: Option<&str>,
    ) -> Result<GiftCard, ClientError> {
        let params = Params::new()
            .with("token", token)
            .with("amount", amount)
            .with("amount_total", amount_total)
            .with("external_id", external_id)
            .with("comment", comment)
            .with(CLIENT_IP_PARAM, client_ip);

        let envelope = self.query(METHOD_CHARGE, params, false).await?;

        if !envelope.is_data() {
            return Err(unknown_type(&envelope.response_type));
        }
        card_from(envelope.data, Some(token))
    }
}

fn card_from(data: Value, token: Option<&str>) -> Result<GiftCard, ClientError> {
    GiftCard::from_data(data, token.map(str::to_string))
        .map_err(|e| ClientError::api(format!("invalid gift card payload: {}", e)))
}

fn unknown_type(response_type: &str) -> ClientError {
    ClientError::api(format!("unknown response type {}", response_type))
}
