//! Giftd SDK - Rust client library for the Giftd gift-card API.
//!
//! This crate signs and sends requests to the Giftd API and maps the
//! responses onto typed records.
//!
//! # Client
//!
//! - [`GiftdClient`] — Signed API client (`gift/check`, `gift/charge`)
//! - [`ClientConfig`] — Base URL, timeout and user agent
//! - [`ClientError`] — Network and API failures
//! - [`Transport`] — Seam for the HTTP layer
//!
//! # Types
//!
//! - [`GiftCard`] — Card returned by the API
//! - [`ChargeDetails`] — Details of a charge
//! - [`Params`], [`ParamValue`] — Request parameters
//!
//! # Example
//!
//! ```rust
//! use giftd_sdk::client::signature::sign;
//! use giftd_sdk::Params;
//!
//! let params = Params::new().with("token", "ABCD-1234");
//! let signature = sign("gift/check", "42", &params, "secret");
//! assert_eq!(signature.len(), 40);
//! ```

pub mod client;
pub mod types;

pub use client::{
    ClientConfig, ClientError, Envelope, ErrorCode, GiftdClient, RequestContext,
    ReqwestTransport, Transport, TransportError,
};
pub use types::{ChargeDetails, ChargeType, GiftCard, ParamValue, Params, TokenStatus};
