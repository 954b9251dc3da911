//! Token signing configuration.

use serde::{Deserialize, Serialize};

/// Placeholder secret shipped in defaults; rejected by validation.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Bearer-token signing and token lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for bearer-token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Issuer written to and required from every bearer token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Bearer token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Number of random bytes in an opaque refresh token.
    #[serde(default = "default_token_bytes")]
    pub refresh_token_bytes: usize,
    /// Number of random bytes in an email-confirmation or reset code.
    #[serde(default = "default_token_bytes")]
    pub lifecycle_token_bytes: usize,
    /// Lifetime of a pending lifecycle code in hours (`0` = until consumed).
    #[serde(default)]
    pub lifecycle_token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            refresh_token_bytes: default_token_bytes(),
            lifecycle_token_bytes: default_token_bytes(),
            lifecycle_token_ttl_hours: 0,
        }
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_issuer() -> String {
    "gatehouse".to_string()
}

fn default_access_ttl() -> u64 {
    180
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_token_bytes() -> usize {
    32
}
