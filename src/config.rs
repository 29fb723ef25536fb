//! Environment-driven runtime configuration

use std::env;

use log::warn;

/// Fallback secret for local development only
const DEV_TOKEN_SECRET: &str = "enomy-finances-dev-secret";

/// Default bearer token lifetime in hours
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Runtime settings shared by the binaries
#[derive(Debug, Clone)]
pub struct Config {
    /// Key for token signatures and password digests
    pub token_secret: String,

    /// Bearer token lifetime in hours
    pub token_ttl_hours: i64,
}

impl Config {
    /// Load from the environment, falling back to development defaults
    pub fn from_env() -> Self {
        let token_secret = env::var("ENOMY_TOKEN_SECRET").unwrap_or_else(|_| {
            warn!("ENOMY_TOKEN_SECRET not set, using the development secret");
            DEV_TOKEN_SECRET.to_string()
        });

        let token_ttl_hours = env::var("ENOMY_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);

        Self {
            token_secret,
            token_ttl_hours,
        }
    }
}
