//! Client for the Giftd REST API.
//!
//! This module provides the signed API client, its configuration and the
//! transport seam it sends requests through.
//!
//! # Example
//!
//! ```rust,ignore
//! use giftd_sdk::client::{ClientConfig, GiftdClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GiftdClient::new("42", "partner-api-key", ClientConfig::default())?;
//!
//!     match client.check_by_token("ABCD-1234", None).await? {
//!         Some(card) => println!("{} available", card.amount_available.unwrap_or_default()),
//!         None => println!("no such card"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod signature;
pub mod transport;

pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{ClientError, ErrorCode};
pub use http::{GiftdClient, RequestContext};
pub use transport::{ReqwestTransport, Transport, TransportError};
