//! Per-user credential and authentication state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::types::UserId;

use crate::audit::Auditable;

/// Authentication state of an account, independent of the active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    /// Normal.
    Enabled,
    /// Administratively prevented from authenticating.
    Disabled,
    /// Too many failed password checks.
    LockedOut,
}

impl AuthState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::LockedOut => "lockedout",
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credential material and login bookkeeping, one-to-one with a user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAttributes {
    /// The user these attributes belong to.
    pub user_id: UserId,
    /// Password hash produced by the configured hasher.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Salt used for `password_hash`.
    #[serde(skip_serializing)]
    pub password_salt: String,
    /// Whether a second factor is required at login.
    pub two_factor_enabled: bool,
    /// Shared secret for the second factor, if enrolled.
    #[serde(skip_serializing)]
    pub two_factor_secret: Option<String>,
    /// Current authentication state.
    pub auth_state: AuthState,
    /// Consecutive failed password checks since the last success.
    pub bad_password_attempts: u32,
    /// When the most recent failed password check happened.
    pub last_bad_password_on: Option<DateTime<Utc>>,
    /// SHA-256 digest of the single active refresh token.
    #[serde(skip_serializing)]
    pub refresh_token_hash: Option<String>,
    /// When the active refresh token stops being accepted.
    pub refresh_token_expires_on: Option<DateTime<Utc>>,
}

impl SecurityAttributes {
    /// Creates fresh attributes for a newly registered user.
    pub fn new(user_id: UserId, password_hash: String, password_salt: String) -> Self {
        Self {
            user_id,
            password_hash,
            password_salt,
            two_factor_enabled: false,
            two_factor_secret: None,
            auth_state: AuthState::Enabled,
            bad_password_attempts: 0,
            last_bad_password_on: None,
            refresh_token_hash: None,
            refresh_token_expires_on: None,
        }
    }

    /// Installs or clears the active refresh token.
    pub fn set_refresh_token(&mut self, record: Option<RefreshTokenRecord>) {
        match record {
            Some(record) => {
                self.refresh_token_hash = Some(record.hash);
                self.refresh_token_expires_on = Some(record.expires_on);
            }
            None => {
                self.refresh_token_hash = None;
                self.refresh_token_expires_on = None;
            }
        }
    }

    /// Whether the account is currently locked out.
    pub fn is_locked_out(&self) -> bool {
        self.auth_state == AuthState::LockedOut
    }
}

// Credential material never enters the audit log.
impl Auditable for SecurityAttributes {
    const TABLE: &'static str = "UserSecurity";

    fn record_id(&self) -> String {
        self.user_id.to_string()
    }

    fn audit_fields(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("AuthState", self.auth_state.to_string()),
            ("BadPasswordAttempts", self.bad_password_attempts.to_string()),
            ("TwoFactorEnabled", self.two_factor_enabled.to_string()),
        ])
    }
}

/// The persisted form of an issued refresh token.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    /// SHA-256 digest of the opaque token.
    pub hash: String,
    /// When the token stops being accepted.
    pub expires_on: DateTime<Utc>,
}

impl std::fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

impl std::fmt::Debug for SecurityAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityAttributes")
            .field("user_id", &self.user_id)
            .field("two_factor_enabled", &self.two_factor_enabled)
            .field("auth_state", &self.auth_state)
            .field("bad_password_attempts", &self.bad_password_attempts)
            .field("last_bad_password_on", &self.last_bad_password_on)
            .field("has_refresh_token", &self.refresh_token_hash.is_some())
            .field("refresh_token_expires_on", &self.refresh_token_expires_on)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let mut attrs = SecurityAttributes::new(
            UserId::new(),
            "$argon2id$secret-hash".to_string(),
            "salt-value".to_string(),
        );
        attrs.refresh_token_hash = Some("deadbeef".to_string());
        let rendered = format!("{attrs:?}");
        assert!(!rendered.contains("secret-hash"));
        assert!(!rendered.contains("salt-value"));
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("has_refresh_token: true"));
    }

    #[test]
    fn test_audit_fields_carry_no_secrets() {
        let attrs = SecurityAttributes::new(UserId::new(), "hash".to_string(), "salt".to_string());
        let fields = attrs.audit_fields();
        assert!(fields.values().all(|v| v != "hash" && v != "salt"));
        assert_eq!(fields.get("AuthState").map(String::as_str), Some("enabled"));
    }

    #[test]
    fn test_serialization_skips_secrets() {
        let attrs = SecurityAttributes::new(UserId::new(), "h".to_string(), "s".to_string());
        let json = serde_json::to_value(&attrs).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password_salt").is_none());
        assert_eq!(json["auth_state"], "enabled");
    }
}
