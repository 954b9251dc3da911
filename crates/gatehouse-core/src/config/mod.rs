//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section has defaults, so an empty source yields a
//! usable development configuration (except for the signing secret,
//! which [`AppConfig::validate`] rejects until it is replaced).

pub mod accounts;
pub mod auth;
pub mod lockout;
pub mod logging;
pub mod password;

use serde::{Deserialize, Serialize};

pub use self::accounts::AccountsConfig;
pub use self::auth::{AuthConfig, DEFAULT_JWT_SECRET};
pub use self::lockout::LockoutConfig;
pub use self::logging::LoggingConfig;
pub use self::password::PasswordPolicyConfig;

use crate::error::AppError;

/// Minimum number of random bytes in an opaque refresh token (256 bits).
pub const MIN_REFRESH_TOKEN_BYTES: usize = 32;

/// Minimum number of random bytes in an email-confirmation or reset code.
pub const MIN_LIFECYCLE_TOKEN_BYTES: usize = 16;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Token signing and lifetime settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Failed-login lockout policy.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Password strength policy.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
    /// Role names and distinguished accounts.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and validate it.
    ///
    /// Merges the file at `path` with an environment-specific overlay
    /// `config/{env}.toml` and environment variables prefixed with
    /// `GATEHOUSE__` (e.g. `GATEHOUSE__AUTH__JWT_SECRET`).
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let loaded = Self::read(path, env)?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Merge the same sources as [`AppConfig::load`] without validating.
    /// Useful for tooling that never signs or verifies tokens.
    pub fn read(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        Ok(loaded)
    }

    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(AppError::configuration(
                "auth.jwt_secret is still the placeholder value",
            ));
        }
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 32 bytes",
            ));
        }
        if self.auth.access_token_ttl_minutes == 0 {
            return Err(AppError::configuration(
                "auth.access_token_ttl_minutes must be greater than zero",
            ));
        }
        if self.auth.refresh_token_ttl_days == 0 {
            return Err(AppError::configuration(
                "auth.refresh_token_ttl_days must be greater than zero",
            ));
        }
        if self.auth.refresh_token_bytes < MIN_REFRESH_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "auth.refresh_token_bytes must be at least {MIN_REFRESH_TOKEN_BYTES}"
            )));
        }
        if self.auth.lifecycle_token_bytes < MIN_LIFECYCLE_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "auth.lifecycle_token_bytes must be at least {MIN_LIFECYCLE_TOKEN_BYTES}"
            )));
        }
        if self.password.min_strength_score > 4 {
            return Err(AppError::configuration(
                "password.min_strength_score must be between 0 and 4",
            ));
        }
        if self.lockout.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "lockout.max_failed_attempts must be greater than zero",
            ));
        }
        if self.accounts.admin_role.trim().is_empty() || self.accounts.default_role.trim().is_empty()
        {
            return Err(AppError::configuration(
                "accounts.admin_role and accounts.default_role must be set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.auth.access_token_ttl_minutes, 180);
        assert_eq!(config.auth.refresh_token_ttl_days, 7);
        assert_eq!(config.lockout.max_failed_attempts, 5);
        assert_eq!(config.accounts.admin_role, "Administrator");
        assert_eq!(config.accounts.default_role, "User");
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = AppConfig::default().validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_short_refresh_token_rejected() {
        let mut config = valid();
        config.auth.refresh_token_bytes = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_lifecycle_code_rejected() {
        let mut config = valid();
        config.auth.lifecycle_token_bytes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("lifecycle_token_bytes"));

        config.auth.lifecycle_token_bytes = MIN_LIFECYCLE_TOKEN_BYTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strength_score_out_of_range_rejected() {
        let mut config = valid();
        config.password.min_strength_score = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_lockout_threshold_rejected() {
        let mut config = valid();
        config.lockout.max_failed_attempts = 0;
        assert!(config.validate().is_err());
    }
}
