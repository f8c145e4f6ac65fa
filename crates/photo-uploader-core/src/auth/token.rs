//! ID token expiry inspection.
//!
//! Tokens are read, never verified: the signature was checked by the issuer
//! when it was minted, and this module only needs the `exp` claim. Anything
//! that cannot be read is reported as expired so the caller re-authenticates
//! instead of presenting a token the API will reject.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Decode one base64url JWT segment into a JSON object.
fn decode_segment(segment: &str) -> Option<Map<String, Value>> {
    // Some issuers keep the padding even though JWS forbids it
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Decode the claims of a `header.payload.signature` token.
///
/// Returns `None` for anything that is not three segments with a JSON object
/// header and payload.
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let mut parts = token.split('.');
    let (header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    decode_segment(header)?;
    decode_segment(payload)
}

/// Expiry time from the token's `exp` claim.
///
/// Accepts integer or fractional seconds; fractions are floored.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let claims = decode_claims(token)?;
    let exp = claims.get("exp")?;
    let secs = match exp.as_i64() {
        Some(secs) => secs,
        None => {
            let secs = exp.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            secs.floor() as i64
        }
    };
    DateTime::from_timestamp(secs, 0)
}

/// Whether the token is unusable at `now`.
///
/// `false` only when the token decodes and `exp` is strictly after `now`.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Some(exp) => exp <= now,
        None => true,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}
