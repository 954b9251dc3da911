//! Credential and login bookkeeping persistence.
//!
//! Counter and refresh-token mutations are single conditional operations
//! so that concurrent callers cannot interleave a read and a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{AuthState, RefreshTokenRecord, SecurityAttributes};

/// Persistence of [`SecurityAttributes`].
#[async_trait]
pub trait SecurityStore: Send + Sync + 'static {
    /// Load the attributes for a user.
    async fn get(&self, user_id: UserId) -> AppResult<Option<SecurityAttributes>>;

    /// Insert attributes for a new user.
    async fn create(&self, attributes: &SecurityAttributes) -> AppResult<()>;

    /// Replace the password hash and salt.
    async fn set_password(&self, user_id: UserId, hash: &str, salt: &str) -> AppResult<()>;

    /// Atomically increment the bad-password counter, stamp `at`, and move
    /// to `LockedOut` once the counter reaches `threshold`. Returns the
    /// attributes as they are after the update.
    async fn record_failed_attempt(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
        threshold: u32,
    ) -> AppResult<SecurityAttributes>;

    /// Zero the bad-password counter.
    async fn reset_failed_attempts(&self, user_id: UserId) -> AppResult<()>;

    /// Set the authentication state.
    async fn set_auth_state(&self, user_id: UserId, state: AuthState) -> AppResult<()>;

    /// Unconditionally install (or clear with `None`) the refresh token.
    async fn set_refresh_token(
        &self,
        user_id: UserId,
        record: Option<RefreshTokenRecord>,
    ) -> AppResult<()>;

    /// Replace the refresh token only if the stored digest still equals
    /// `expected_hash`. Returns `false` when another caller got there first.
    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool>;
}
