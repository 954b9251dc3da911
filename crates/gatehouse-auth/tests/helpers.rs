//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use gatehouse_auth::mail::MemoryMailer;
use gatehouse_auth::password::{Argon2Hasher, CredentialHasher};
use gatehouse_auth::{AccountService, AdminService, PermissionResolver, Principal, SessionService};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{AttributeId, UserId};
use gatehouse_entity::attribute::{AttributeType, ExtendedAttribute};
use gatehouse_entity::permission::{NewPermission, Permission, PermissionOwner};
use gatehouse_entity::role::Role;
use gatehouse_entity::user::{
    AccountType, AuthState, NewUser, RefreshTokenRecord, SecurityAttributes, User,
};
use gatehouse_store::{ExtendedAttributeStore, SecurityStore, Stores};
use gatehouse_store::memory::MemoryAuditStore;

pub const PASSWORD: &str = "Tq8#vRz2!mWk4p";

/// The authority core wired over fresh in-memory stores.
pub struct TestApp {
    pub config: AppConfig,
    pub stores: Stores,
    pub audit: MemoryAuditStore,
    pub mailer: MemoryMailer,
    pub sessions: SessionService,
    pub accounts: AccountService,
    pub admin: AdminService,
    pub resolver: PermissionResolver,
}

impl TestApp {
    /// Create a new test application with the test configuration.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_stores(config, Stores::in_memory())
    }

    /// Wires the services over `stores`. The audit store is always replaced
    /// with an inspectable in-memory one.
    pub fn with_stores(config: AppConfig, mut stores: Stores) -> Self {
        let audit = MemoryAuditStore::new();
        stores.audit = Arc::new(audit.clone());

        let mailer = MemoryMailer::new();
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());

        Self {
            sessions: SessionService::new(&stores, &config, Arc::clone(&hasher)),
            accounts: AccountService::new(&stores, &config, hasher, Arc::new(mailer.clone())),
            admin: AdminService::new(&stores, &config),
            resolver: PermissionResolver::new(&stores),
            config,
            stores,
            audit,
            mailer,
        }
    }

    /// Create a confirmed, active user with no credentials. Enough for
    /// permission resolution.
    pub async fn create_bare_user(&self, username: &str) -> User {
        let mut user = User::register(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            account_type: AccountType::Human,
        });
        user.email_confirmed = true;
        user.is_active = true;
        self.stores.users.create(&user).await.expect("create user");
        user
    }

    /// Create a confirmed, active user with the given password.
    pub async fn create_user(&self, username: &str, password: &str) -> User {
        let user = self.create_bare_user(username).await;
        let hashed = Argon2Hasher::new().hash(password).expect("hash");
        self.stores
            .security
            .create(&SecurityAttributes::new(user.id, hashed.hash, hashed.salt))
            .await
            .expect("create security attributes");
        user
    }

    pub async fn create_role(&self, name: &str) -> Role {
        let role = Role::new(name, None, Uuid::nil());
        self.stores.roles.create(&role).await.expect("create role");
        role
    }

    pub async fn add_to_role(&self, user: &User, role: &Role) {
        self.stores
            .roles
            .add_user_to_role(user.id, role.id)
            .await
            .expect("add membership");
    }

    pub async fn grant(&self, owner: PermissionOwner, value: &str) -> Permission {
        let permission = Permission::from_new(
            NewPermission {
                owner,
                value: value.parse().expect("permission value"),
                display_name: None,
                description: None,
            },
            Uuid::nil(),
        );
        self.stores
            .permissions
            .create(&permission)
            .await
            .expect("create permission");
        permission
    }

    /// A user holding the administrator role, and its principal.
    pub async fn create_admin(&self, username: &str) -> (User, Principal) {
        let role = match self
            .stores
            .roles
            .get_by_name(&self.config.accounts.admin_role)
            .await
            .expect("lookup admin role")
        {
            Some(role) => role,
            None => self.create_role(&self.config.accounts.admin_role).await,
        };
        let user = self.create_user(username, PASSWORD).await;
        self.add_to_role(&user, &role).await;
        let principal = Principal::for_user(&user);
        (user, principal)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
    config.lockout.max_failed_attempts = 3;
    config
}

/// Holds every `swap_refresh_token` call until `parties` callers have
/// arrived, so concurrent refreshes all pass the token check before any
/// of them swaps.
pub struct BarrierSecurityStore {
    inner: Arc<dyn SecurityStore>,
    barrier: Barrier,
}

impl BarrierSecurityStore {
    pub fn new(inner: Arc<dyn SecurityStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl SecurityStore for BarrierSecurityStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<SecurityAttributes>> {
        self.inner.get(user_id).await
    }

    async fn create(&self, attributes: &SecurityAttributes) -> AppResult<()> {
        self.inner.create(attributes).await
    }

    async fn set_password(&self, user_id: UserId, hash: &str, salt: &str) -> AppResult<()> {
        self.inner.set_password(user_id, hash, salt).await
    }

    async fn record_failed_attempt(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
        threshold: u32,
    ) -> AppResult<SecurityAttributes> {
        self.inner.record_failed_attempt(user_id, at, threshold).await
    }

    async fn reset_failed_attempts(&self, user_id: UserId) -> AppResult<()> {
        self.inner.reset_failed_attempts(user_id).await
    }

    async fn set_auth_state(&self, user_id: UserId, state: AuthState) -> AppResult<()> {
        self.inner.set_auth_state(user_id, state).await
    }

    async fn set_refresh_token(
        &self,
        user_id: UserId,
        record: Option<RefreshTokenRecord>,
    ) -> AppResult<()> {
        self.inner.set_refresh_token(user_id, record).await
    }

    async fn swap_refresh_token(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool> {
        self.barrier.wait().await;
        self.inner
            .swap_refresh_token(user_id, expected_hash, replacement)
            .await
    }
}

/// Holds every `remove` call until `parties` callers have arrived, so
/// concurrent redemptions of one code all read it before any removes it.
pub struct BarrierAttributeStore {
    inner: Arc<dyn ExtendedAttributeStore>,
    barrier: Barrier,
}

impl BarrierAttributeStore {
    pub fn new(inner: Arc<dyn ExtendedAttributeStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl ExtendedAttributeStore for BarrierAttributeStore {
    async fn get_all_of_type_for_owner(
        &self,
        owner_id: UserId,
        attribute_type: AttributeType,
    ) -> AppResult<Vec<ExtendedAttribute>> {
        self.inner
            .get_all_of_type_for_owner(owner_id, attribute_type)
            .await
    }

    async fn add(&self, attribute: &ExtendedAttribute) -> AppResult<()> {
        self.inner.add(attribute).await
    }

    async fn remove(&self, id: AttributeId) -> AppResult<bool> {
        self.barrier.wait().await;
        self.inner.remove(id).await
    }
}
