//! Keyed password digests
//!
//! Digests are HMAC-SHA256 over `email:password` under the server secret, so
//! equal passwords produce distinct digests per account and a leaked store
//! is useless without the key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Digest a password for storage
pub fn digest(secret: &str, email: &str, password: &str) -> String {
    hex::encode(keyed_mac(secret, email, password).finalize().into_bytes())
}

/// Check a login attempt against the stored digest
pub fn verify(secret: &str, email: &str, password: &str, stored: &str) -> bool {
    match hex::decode(stored) {
        Ok(bytes) => keyed_mac(secret, email, password).verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

fn keyed_mac(secret: &str, email: &str, password: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(email.as_bytes());
    mac.update(b":");
    mac.update(password.as_bytes());
    mac
}
