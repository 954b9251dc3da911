//! Generic key/value attribute with a typed discriminator.
//!
//! Pending lifecycle codes (email confirmation, password reset) live here.
//! At most one attribute of a lifecycle type exists per owner; the account
//! controller enforces that, not the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::types::{AttributeId, UserId};

/// Discriminator for [`ExtendedAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A pending email-confirmation code.
    EmailConfirmationToken,
    /// A pending password-reset code.
    PasswordResetToken,
    /// Anything else, distinguished by key.
    Other,
}

impl AttributeType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailConfirmationToken => "email_confirmation_token",
            Self::PasswordResetToken => "password_reset_token",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed key/value fact attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedAttribute {
    /// Unique attribute identifier.
    pub id: AttributeId,
    /// The user this attribute belongs to.
    pub owner_id: UserId,
    /// Discriminator.
    pub attribute_type: AttributeType,
    /// Key, meaningful for [`AttributeType::Other`].
    pub key: String,
    /// Stored value.
    pub value: String,
    /// When the attribute was created.
    pub created_on: DateTime<Utc>,
}

impl ExtendedAttribute {
    /// Builds a new attribute stamped with the current time.
    pub fn new(owner_id: UserId, attribute_type: AttributeType, value: String) -> Self {
        Self {
            id: AttributeId::new(),
            owner_id,
            attribute_type,
            key: attribute_type.as_str().to_string(),
            value,
            created_on: Utc::now(),
        }
    }

    /// Whether the attribute is older than `ttl`.
    pub fn is_older_than(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.created_on + ttl <= now
    }
}
