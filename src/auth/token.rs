//! HMAC-SHA256 signed bearer tokens
//!
//! A token is `user_id.role.expires_at.signature`, where the signature is
//! the hex HMAC of the first three fields under the server secret. Tokens
//! are self-contained: verification needs no account lookup.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::AuthError;
use crate::store::Role;

// Type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

/// Verified token contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub user_id: u64,
    pub role: Role,
    pub expires_at: i64,
}

/// Issue a signed token for the given account
pub fn issue_token(secret: &str, user_id: u64, role: Role, ttl_hours: i64) -> String {
    let expires_at = (Utc::now() + Duration::hours(ttl_hours)).timestamp();
    let payload = format!("{user_id}.{}.{expires_at}", role.as_str());
    let signature = sign(secret, &payload);
    format!("{payload}.{signature}")
}

/// Check signature and expiry, returning the embedded claims
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(AuthError::InvalidToken)?;

    // Signature first: unsigned input never reaches the field parser.
    let signature = hex::decode(signature).map_err(|_| AuthError::InvalidToken)?;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::InvalidToken)?;

    let mut fields = payload.split('.');
    let user_id = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or(AuthError::InvalidToken)?;
    let role = match fields.next() {
        Some("USER") => Role::User,
        Some("ADMIN") => Role::Admin,
        _ => return Err(AuthError::InvalidToken),
    };
    let expires_at: i64 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or(AuthError::InvalidToken)?;
    if fields.next().is_some() {
        return Err(AuthError::InvalidToken);
    }

    if expires_at <= Utc::now().timestamp() {
        return Err(AuthError::InvalidToken);
    }

    Ok(Claims {
        user_id,
        role,
        expires_at,
    })
}

fn sign(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
