//! Request signing.
//!
//! Every call carries a SHA-1 signature binding the method, the partner's
//! user id, the parameters and the shared secret:
//!
//! ```text
//! sha1_hex("{method},{user_id},{k1}={v1},{k2}={v2},...{secret}")
//! ```
//!
//! Parameters are taken in ordinal key order. `user_id`, `signature` and
//! `api_key` are never part of the signed set.

use ring::digest;

use crate::types::Params;

/// Parameter carrying the partner's user id.
pub const USER_ID_PARAM: &str = "user_id";

/// Parameter carrying the request signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Parameter carrying the API key. Never sent or signed.
pub const API_KEY_PARAM: &str = "api_key";

const EXCLUDED_PARAMS: [&str; 3] = [USER_ID_PARAM, SIGNATURE_PARAM, API_KEY_PARAM];

/// Builds the string that is hashed to produce the signature.
#[must_use]
pub fn signature_base(method: &str, user_id: &str, params: &Params, secret: &str) -> String {
    let mut base = format!("{},{},", method, user_id);

    for (key, value) in params
        .iter()
        .filter(|(key, _)| !EXCLUDED_PARAMS.contains(key))
    {
        base.push_str(key);
        base.push('=');
        base.push_str(&value.render());
        base.push(',');
    }

    base.push_str(secret);
    base
}

/// Computes the lowercase hex SHA-1 signature of a call.
#[must_use]
pub fn sign(method: &str, user_id: &str, params: &Params, secret: &str) -> String {
    let base = signature_base(method, user_id, params, secret);
    let hash = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, base.as_bytes());
    hex::encode(hash.as_ref())
}
