//! HTTP transport.
//!
//! The client only needs "POST these form fields to this URL and give me the
//! body back". [`Transport`] is that seam; [`ReqwestTransport`] is the
//! production implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection was not established within the configured timeout.
    #[error("connection timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request or the response transfer failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with an empty body.
    #[error("empty response")]
    EmptyResponse,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Posts form-encoded requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `form` to `url` as `application/x-www-form-urlencoded` and
    /// returns the raw response body.
    ///
    /// `connect_timeout` bounds establishing the connection only; a server
    /// that accepts at once may take as long as it likes to answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be
    /// read, including when `connect_timeout` elapses while connecting.
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        connect_timeout: Option<Duration>,
    ) -> Result<String, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
///
/// `reqwest` fixes the connect timeout when a client is built, so one client
/// is kept per distinct timeout and reused across calls.
///
/// The body is returned whatever the HTTP status; the API reports failures
/// in the response envelope.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
    clients: Arc<Mutex<HashMap<Option<Duration>, reqwest::Client>>>,
}

fn build_client(
    user_agent: &str,
    connect_timeout: Option<Duration>,
) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent);
    if let Some(timeout) = connect_timeout {
        builder = builder.connect_timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| TransportError::Build(e.to_string()))
}

impl ReqwestTransport {
    /// Creates a transport sending the given user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let http = build_client(user_agent, None)?;

        let mut clients = HashMap::new();
        clients.insert(None, http);

        Ok(Self {
            user_agent: user_agent.to_string(),
            clients: Arc::new(Mutex::new(clients)),
        })
    }

    /// Returns the client built for `connect_timeout`, building it on first
    /// use.
    fn client_for(
        &self,
        connect_timeout: Option<Duration>,
    ) -> Result<reqwest::Client, TransportError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| TransportError::Build("client cache lock poisoned".to_string()))?;

        if let Some(client) = clients.get(&connect_timeout) {
            return Ok(client.clone());
        }

        tracing::debug!("Building HTTP client, connect timeout {:?}", connect_timeout);
        let client = build_client(&self.user_agent, connect_timeout)?;
        clients.insert(connect_timeout, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        connect_timeout: Option<Duration>,
    ) -> Result<String, TransportError> {
        let http = self.client_for(connect_timeout)?;

        let response = http.post(url).form(form).send().await?;
        let body = response.text().await?;
        Ok(body)
    }
}
