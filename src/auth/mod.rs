//! Authentication: bearer tokens and password digests

pub mod password;
mod token;

pub use token::{issue_token, verify_token, Claims};

use thiserror::Error;

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// No bearer token on a protected request
    #[error("Access token required")]
    MissingToken,

    /// Malformed, tampered or expired token
    #[error("Invalid token")]
    InvalidToken,

    /// Login with an unknown email or a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,
}
