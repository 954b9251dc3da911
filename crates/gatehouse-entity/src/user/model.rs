//! User entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::types::UserId;

use crate::audit::Auditable;

/// Whether an account belongs to a person or to an automated service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// An interactive person.
    Human,
    /// A non-interactive integration.
    Service,
}

impl AccountType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Whether the email address has been confirmed.
    pub email_confirmed: bool,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// Human or service account.
    pub account_type: AccountType,
    /// When the user was created.
    pub created_on: DateTime<Utc>,
    /// Who created the user.
    pub created_by: uuid::Uuid,
    /// When the user was last modified.
    pub modified_on: DateTime<Utc>,
    /// Who last modified the user.
    pub modified_by: uuid::Uuid,
}

impl User {
    /// Builds an unconfirmed, inactive account that records itself as its
    /// own creator.
    pub fn register(new: NewUser) -> Self {
        let now = Utc::now();
        let id = UserId::new();
        Self {
            id,
            username: new.username,
            email: new.email,
            email_confirmed: false,
            is_active: false,
            is_deleted: false,
            account_type: new.account_type,
            created_on: now,
            created_by: id.into_uuid(),
            modified_on: now,
            modified_by: id.into_uuid(),
        }
    }

    /// Check whether the account may be used to sign in at all.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

impl Auditable for User {
    const TABLE: &'static str = "Users";

    fn record_id(&self) -> String {
        self.id.to_string()
    }

    // Bookkeeping fields (created/modified) are not business fields and
    // never appear in a diff on their own.
    fn audit_fields(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("Username", self.username.clone()),
            ("Email", self.email.clone()),
            ("EmailConfirmed", self.email_confirmed.to_string()),
            ("IsActive", self.is_active.to_string()),
            ("IsDeleted", self.is_deleted.to_string()),
            ("AccountType", self.account_type.to_string()),
        ])
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Human or service account.
    pub account_type: AccountType,
}
