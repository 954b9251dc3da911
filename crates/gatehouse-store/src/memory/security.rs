//! In-memory security attribute store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{AuthState, RefreshTokenRecord, SecurityAttributes};

use crate::traits::SecurityStore;

/// Security attributes keyed by user, with per-entry locking.
#[derive(Debug, Clone, Default)]
pub struct MemorySecurityStore {
    entries: Arc<DashMap<UserId, SecurityAttributes>>,
}

impl MemorySecurityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<T>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut SecurityAttributes) -> T,
    ) -> AppResult<T> {
        let mut entry = self.entries.get_mut(&user_id).ok_or_else(|| {
            AppError::not_found(format!("Security attributes for user {user_id} not found"))
        })?;
        Ok(f(entry.value_mut()))
    }
}

#[async_trait]
impl SecurityStore for MemorySecurityStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<SecurityAttributes>> {
        Ok(self.entries.get(&user_id).map(|e| e.value().clone()))
    }

    async fn create(&self, attributes: &SecurityAttributes) -> AppResult<()> {
        match self.entries.entry(attributes.user_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Security attributes for user {} already exist",
                attributes.user_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(attributes.clone());
                Ok(())
            }
        }
    }

    async fn set_password(&self, user_id: UserId, hash: &str, salt: &str) -> AppResult<()> {
        self.with_entry(user_id, |attrs| {
            attrs.password_hash = hash.to_string();
            attrs.password_salt = salt.to_string();
        })
    }

    async fn record_failed_attempt(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
        threshold: u32,
    ) -> AppResult<SecurityAttributes> {
        self.with_entry(user_id, |attrs| {
            attrs.bad_password_attempts = attrs.bad_password_attempts.saturating_add(1);
            attrs.last_bad_password_on = Some(at);
            if attrs.bad_password_attempts >= threshold && attrs.auth_state == AuthState::Enabled {
                attrs.auth_state = AuthState::LockedOut;
            }
            attrs.clone()
        })
    }

    async fn reset_failed_attempts(&self, user_id: UserId) -> AppResult<()> {
        self.with_entry(user_id, |attrs| {
            attrs.bad_password_attempts = 0;
            attrs.last_bad_password_on = None;
        })
    }

    async fn set_auth_state(&self, user_id: UserId, state: AuthState) -> AppResult<()> {
        self.with_entry(user_id, |attrs| attrs.auth_state = state)
    }

    async fn set_refresh_token(
        &self,
        user_id: UserId,
        record: Option<RefreshTokenRecord>,
    ) -> AppResult<()> {
        self.with_entry(user_id, |attrs| attrs.set_refresh_token(record))
    }

    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool> {
        self.with_entry(user_id, |attrs| {
            if attrs.refresh_token_hash.as_deref() == Some(expected_hash) {
                attrs.set_refresh_token(Some(replacement));
                true
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemorySecurityStore, UserId) {
        let store = MemorySecurityStore::new();
        let user_id = UserId::new();
        store
            .create(&SecurityAttributes::new(user_id, "h".into(), "s".into()))
            .await
            .unwrap();
        (store, user_id)
    }

    #[tokio::test]
    async fn test_failed_attempts_lock_at_threshold() {
        let (store, user_id) = seeded().await;
        let now = Utc::now();
        let first = store.record_failed_attempt(user_id, now, 2).await.unwrap();
        assert_eq!(first.auth_state, AuthState::Enabled);
        let second = store.record_failed_attempt(user_id, now, 2).await.unwrap();
        assert_eq!(second.bad_password_attempts, 2);
        assert_eq!(second.auth_state, AuthState::LockedOut);
    }

    #[tokio::test]
    async fn test_failed_attempt_does_not_enable_disabled_account() {
        let (store, user_id) = seeded().await;
        store.set_auth_state(user_id, AuthState::Disabled).await.unwrap();
        let attrs = store.record_failed_attempt(user_id, Utc::now(), 1).await.unwrap();
        assert_eq!(attrs.auth_state, AuthState::Disabled);
    }

    #[tokio::test]
    async fn test_swap_only_when_expected_matches() {
        let (store, user_id) = seeded().await;
        let expires_on = Utc::now();
        store
            .set_refresh_token(
                user_id,
                Some(RefreshTokenRecord { hash: "one".into(), expires_on }),
            )
            .await
            .unwrap();

        let swapped = store
            .swap_refresh_token(user_id, "one", RefreshTokenRecord { hash: "two".into(), expires_on })
            .await
            .unwrap();
        assert!(swapped);

        let replayed = store
            .swap_refresh_token(user_id, "one", RefreshTokenRecord { hash: "three".into(), expires_on })
            .await
            .unwrap();
        assert!(!replayed);

        let attrs = store.get(user_id).await.unwrap().unwrap();
        assert_eq!(attrs.refresh_token_hash.as_deref(), Some("two"));
    }
}
