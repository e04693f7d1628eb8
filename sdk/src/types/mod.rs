//! Core types for the Giftd SDK.
//!
//! This module provides the records returned by the API and the parameter
//! types requests are built from.

pub mod gift_card;
mod lenient;
pub mod params;

pub use gift_card::{ChargeDetails, ChargeType, GiftCard, TokenStatus};
pub use params::{ParamValue, Params};
