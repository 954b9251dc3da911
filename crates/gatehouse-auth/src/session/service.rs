//! Session lifecycle: login, refresh-token rotation, revocation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use gatehouse_core::config::{AppConfig, LockoutConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{Actor, UserId};
use gatehouse_entity::user::{AuthState, RefreshTokenRecord, SecurityAttributes, User};
use gatehouse_store::{RoleStore, SecurityStore, Stores, UserStore};

use crate::audit::AuditRecorder;
use crate::jwt::{Claim, ClaimSet, Identity, JwtDecoder, JwtEncoder};
use crate::password::CredentialHasher;
use crate::permission::PermissionResolver;
use crate::token;

use super::principal::Principal;
use super::two_factor::TwoFactorVerifier;

/// Credentials presented at login.
#[derive(Clone)]
pub struct LoginRequest {
    /// Username or email address.
    pub login: String,
    pub password: String,
    /// Required only when the account has a second factor enabled.
    pub two_factor_code: Option<String>,
}

impl LoginRequest {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            two_factor_code: None,
        }
    }

    pub fn with_two_factor_code(mut self, code: impl Into<String>) -> Self {
        self.two_factor_code = Some(code.into());
        self
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// The result of a successful login or refresh.
#[derive(Clone, Serialize)]
pub struct SessionTokens {
    /// Signed bearer token.
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    /// Opaque refresh token, single use.
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}

/// A refresh token in clear for the caller plus its persisted form.
struct IssuedRefreshToken {
    token: String,
    record: RefreshTokenRecord,
}

/// Authenticates users and issues, rotates, and revokes session tokens.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    security: Arc<dyn SecurityStore>,
    roles: Arc<dyn RoleStore>,
    resolver: PermissionResolver,
    audit: AuditRecorder,
    hasher: Arc<dyn CredentialHasher>,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    two_factor: Option<Arc<dyn TwoFactorVerifier>>,
    lockout: LockoutConfig,
    refresh_ttl: Duration,
    refresh_token_bytes: usize,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("lockout", &self.lockout)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("two_factor", &self.two_factor.is_some())
            .finish()
    }
}

impl SessionService {
    /// Creates a session service over the given stores.
    pub fn new(stores: &Stores, config: &AppConfig, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            users: Arc::clone(&stores.users),
            security: Arc::clone(&stores.security),
            roles: Arc::clone(&stores.roles),
            resolver: PermissionResolver::new(stores),
            audit: AuditRecorder::new(Arc::clone(&stores.audit)),
            hasher,
            encoder: JwtEncoder::new(&config.auth),
            decoder: JwtDecoder::new(&config.auth),
            two_factor: None,
            lockout: config.lockout.clone(),
            refresh_ttl: Duration::days(config.auth.refresh_token_ttl_days as i64),
            refresh_token_bytes: config.auth.refresh_token_bytes,
        }
    }

    /// Enables second-factor checks for accounts that have them turned on.
    pub fn with_two_factor(mut self, verifier: Arc<dyn TwoFactorVerifier>) -> Self {
        self.two_factor = Some(verifier);
        self
    }

    /// Performs the login flow:
    ///
    /// 1. Look up the account by username, then by email
    /// 2. Verify the password (a failure counts toward lockout)
    /// 3. Verify the second factor when enabled (same accounting)
    /// 4. Check account state: locked out, unconfirmed, disabled
    /// 5. Reset the failure counter, store a new refresh token, mint a bearer
    ///
    /// Unknown accounts and wrong passwords fail identically.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<SessionTokens> {
        let Some(user) = self.find_user(&request.login).await? else {
            info!(login = %request.login, "Login failed: unknown account");
            return Err(AppError::invalid_credentials());
        };

        let Some(attrs) = self.security.get(user.id).await? else {
            warn!(user_id = %user.id, "Login failed: account has no security attributes");
            return Err(AppError::invalid_credentials());
        };

        let valid = self
            .hasher
            .verify(&request.password, &attrs.password_salt, &attrs.password_hash)?;
        if !valid {
            self.handle_failed_login(&user, &attrs).await?;
            return Err(AppError::invalid_credentials());
        }

        if attrs.two_factor_enabled {
            self.verify_second_factor(&user, &attrs, request.two_factor_code.as_deref())
                .await?;
        }

        self.check_account_state(&user, &attrs).await?;

        if attrs.bad_password_attempts > 0 {
            self.security.reset_failed_attempts(user.id).await?;
        }

        let refresh = self.issue_refresh_token();
        self.security
            .set_refresh_token(user.id, Some(refresh.record.clone()))
            .await?;

        let tokens = self.mint_session(&user, refresh).await?;
        info!(user_id = %user.id, username = %user.username, "Login successful");
        Ok(tokens)
    }

    /// Exchanges an (expired) bearer and the current refresh token for a new
    /// pair. The bearer's signature and algorithm are verified but its expiry
    /// is not. The stored refresh token is replaced only if it still equals
    /// the presented one, so a token can be redeemed at most once.
    pub async fn refresh(&self, bearer: &str, refresh_token: &str) -> AppResult<SessionTokens> {
        let claims = self.decoder.decode_for_refresh(bearer)?;
        let user_id = claims.user_id();

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::token_invalid("Invalid refresh token"))?;
        let attrs = self
            .security
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::token_invalid("Invalid refresh token"))?;

        let presented = token::digest(refresh_token);
        if attrs.refresh_token_hash.as_deref() != Some(presented.as_str()) {
            warn!(user_id = %user_id, "Refresh rejected: token does not match the active one");
            return Err(AppError::token_invalid("Invalid refresh token"));
        }

        let now = Utc::now();
        if attrs.refresh_token_expires_on.is_none_or(|expires| expires <= now) {
            info!(user_id = %user_id, "Refresh rejected: refresh token expired");
            return Err(AppError::token_expired("Refresh token has expired"));
        }

        self.check_account_state(&user, &attrs).await?;

        let replacement = self.issue_refresh_token();
        let swapped = self
            .security
            .swap_refresh_token(user_id, &presented, replacement.record.clone())
            .await?;
        if !swapped {
            warn!(user_id = %user_id, "Refresh rejected: token was already redeemed");
            return Err(AppError::token_invalid("Invalid refresh token"));
        }

        let tokens = self.mint_session(&user, replacement).await?;
        info!(user_id = %user_id, "Session refreshed");
        Ok(tokens)
    }

    /// Clears the user's refresh token. Outstanding bearers stay valid until
    /// they expire.
    pub async fn revoke(&self, user_id: UserId) -> AppResult<()> {
        self.security.set_refresh_token(user_id, None).await?;
        info!(user_id = %user_id, "Refresh token revoked");
        Ok(())
    }

    /// Validates a bearer presented on a request and returns its principal.
    pub fn authenticate(&self, bearer: &str) -> AppResult<Principal> {
        let claims = self.decoder.decode_access_token(bearer)?;
        Ok(Principal::from_claims(&claims))
    }

    /// The claims a bearer for `user` would carry right now.
    pub async fn claim_set_for(&self, user: &User) -> AppResult<ClaimSet> {
        let mut claims = ClaimSet::new(Identity {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        });
        for role in self.roles.get_roles_for_user(user.id).await? {
            claims.push(Claim::Role(role.name));
        }
        for permission in self.resolver.get_effective_permissions(user.id).await? {
            claims.push(Claim::Permission(permission.value));
        }
        Ok(claims)
    }

    async fn find_user(&self, login: &str) -> AppResult<Option<User>> {
        let user = match self.users.get_by_username(login).await? {
            Some(user) => Some(user),
            None => self.users.get_by_email(login).await?,
        };
        Ok(user.filter(|u| !u.is_deleted))
    }

    /// Counts a failed attempt. The transition into `LockedOut` is audited
    /// against the attributes the login started from.
    async fn handle_failed_login(&self, user: &User, before: &SecurityAttributes) -> AppResult<()> {
        let threshold = self.lockout.max_failed_attempts;
        let attrs = self
            .security
            .record_failed_attempt(user.id, Utc::now(), threshold)
            .await?;

        if attrs.is_locked_out() && !before.is_locked_out() {
            warn!(
                user_id = %user.id,
                attempts = attrs.bad_password_attempts,
                "Account locked out after repeated failed logins"
            );
            self.audit.record_update(Actor::System, before, &attrs).await;
        } else {
            info!(
                user_id = %user.id,
                attempts = attrs.bad_password_attempts,
                "Failed login attempt"
            );
        }
        Ok(())
    }

    async fn verify_second_factor(
        &self,
        user: &User,
        attrs: &SecurityAttributes,
        code: Option<&str>,
    ) -> AppResult<()> {
        let Some(verifier) = &self.two_factor else {
            error!(user_id = %user.id, "Second factor enabled but no verifier configured");
            return Err(AppError::configuration(
                "Two-factor authentication is not configured",
            ));
        };

        let verified = match (code, attrs.two_factor_secret.as_deref()) {
            (Some(code), Some(secret)) => verifier.verify(user.id, secret, code).await?,
            _ => false,
        };
        if !verified {
            self.handle_failed_login(user, attrs).await?;
            return Err(AppError::invalid_credentials());
        }
        Ok(())
    }

    /// Lockout first, then confirmation, then the active flag.
    async fn check_account_state(&self, user: &User, attrs: &SecurityAttributes) -> AppResult<()> {
        if attrs.auth_state == AuthState::LockedOut {
            if self.lockout_elapsed(attrs, Utc::now()) {
                self.security.set_auth_state(user.id, AuthState::Enabled).await?;
                self.security.reset_failed_attempts(user.id).await?;

                let mut after = attrs.clone();
                after.auth_state = AuthState::Enabled;
                after.bad_password_attempts = 0;
                after.last_bad_password_on = None;
                self.audit.record_update(Actor::System, attrs, &after).await;
                info!(user_id = %user.id, "Lockout period elapsed, account re-enabled");
            } else {
                warn!(user_id = %user.id, "Login refused: account locked out");
                return Err(AppError::locked_out("Account is locked out"));
            }
        }

        if !user.email_confirmed {
            info!(user_id = %user.id, "Login refused: email not confirmed");
            return Err(AppError::email_not_confirmed("Email address has not been confirmed"));
        }

        if !user.is_active || attrs.auth_state == AuthState::Disabled {
            info!(user_id = %user.id, "Login refused: account disabled");
            return Err(AppError::account_disabled("Account is disabled"));
        }

        Ok(())
    }

    fn lockout_elapsed(&self, attrs: &SecurityAttributes, now: DateTime<Utc>) -> bool {
        if self.lockout.lockout_duration_minutes == 0 {
            return false;
        }
        let duration = Duration::minutes(self.lockout.lockout_duration_minutes as i64);
        attrs
            .last_bad_password_on
            .is_none_or(|last| last + duration <= now)
    }

    fn issue_refresh_token(&self) -> IssuedRefreshToken {
        let token = token::generate_opaque_token(self.refresh_token_bytes);
        let record = RefreshTokenRecord {
            hash: token::digest(&token),
            expires_on: Utc::now() + self.refresh_ttl,
        };
        IssuedRefreshToken { token, record }
    }

    async fn mint_session(&self, user: &User, refresh: IssuedRefreshToken) -> AppResult<SessionTokens> {
        let claims = self.claim_set_for(user).await?;
        let bearer = self.encoder.encode_access_token(user, &claims)?;
        Ok(SessionTokens {
            access_token: bearer.token,
            access_expires_at: bearer.expires_at,
            refresh_token: refresh.token,
            refresh_expires_at: refresh.record.expires_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;
    use gatehouse_entity::user::{AccountType, NewUser};

    use crate::password::Argon2Hasher;

    const PASSWORD: &str = "Correct-Horse-1";

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "unit-test-secret-unit-test-secret-0123".to_string();
        config.lockout.max_failed_attempts = 3;
        config
    }

    async fn seed(stores: &Stores, confirmed: bool) -> User {
        let mut user = User::register(NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            account_type: AccountType::Human,
        });
        user.email_confirmed = confirmed;
        user.is_active = confirmed;
        stores.users.create(&user).await.unwrap();
        let hashed = Argon2Hasher::new().hash(PASSWORD).unwrap();
        stores
            .security
            .create(&SecurityAttributes::new(user.id, hashed.hash, hashed.salt))
            .await
            .unwrap();
        user
    }

    fn service(stores: &Stores) -> SessionService {
        SessionService::new(stores, &config(), Arc::new(Argon2Hasher::new()))
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let stores = Stores::in_memory();
        seed(&stores, true).await;
        let svc = service(&stores);
        assert!(svc.login(&LoginRequest::new("alice", PASSWORD)).await.is_ok());
        assert!(svc.login(&LoginRequest::new("ALICE@example.com", PASSWORD)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_alike() {
        let stores = Stores::in_memory();
        seed(&stores, true).await;
        let svc = service(&stores);
        let unknown = svc.login(&LoginRequest::new("bob", PASSWORD)).await.unwrap_err();
        let wrong = svc.login(&LoginRequest::new("alice", "nope")).await.unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::InvalidCredentials);
        assert_eq!(unknown.kind, wrong.kind);
        assert_eq!(unknown.message, wrong.message);
    }

    #[tokio::test]
    async fn test_unconfirmed_account() {
        let stores = Stores::in_memory();
        seed(&stores, false).await;
        let err = service(&stores)
            .login(&LoginRequest::new("alice", PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmailNotConfirmed);
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        stores.security.set_auth_state(user.id, AuthState::Disabled).await.unwrap();
        let err = service(&stores)
            .login(&LoginRequest::new("alice", PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountDisabled);
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        let svc = service(&stores);
        let _ = svc.login(&LoginRequest::new("alice", "nope")).await;
        let _ = svc.login(&LoginRequest::new("alice", "nope")).await;
        svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap();
        let attrs = stores.security.get(user.id).await.unwrap().unwrap();
        assert_eq!(attrs.bad_password_attempts, 0);
        assert_eq!(attrs.auth_state, AuthState::Enabled);
    }

    #[tokio::test]
    async fn test_timed_lockout_elapses() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        let mut cfg = config();
        cfg.lockout.lockout_duration_minutes = 10;
        let svc = SessionService::new(&stores, &cfg, Arc::new(Argon2Hasher::new()));

        let long_ago = Utc::now() - Duration::minutes(30);
        for _ in 0..3 {
            stores.security.record_failed_attempt(user.id, long_ago, 3).await.unwrap();
        }
        svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap();

        for _ in 0..3 {
            stores.security.record_failed_attempt(user.id, Utc::now(), 3).await.unwrap();
        }
        let err = svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountLockedOut);
    }

    #[tokio::test]
    async fn test_bearer_authenticates() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        let svc = service(&stores);
        let tokens = svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap();
        let principal = svc.authenticate(&tokens.access_token).unwrap();
        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn test_revoke_blocks_refresh() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        let svc = service(&stores);
        let tokens = svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap();
        svc.revoke(user.id).await.unwrap();
        let err = svc
            .refresh(&tokens.access_token, &tokens.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let stores = Stores::in_memory();
        let user = seed(&stores, true).await;
        let svc = service(&stores);
        let tokens = svc.login(&LoginRequest::new("alice", PASSWORD)).await.unwrap();
        stores
            .security
            .set_refresh_token(
                user.id,
                Some(RefreshTokenRecord {
                    hash: token::digest(&tokens.refresh_token),
                    expires_on: Utc::now() - Duration::minutes(1),
                }),
            )
            .await
            .unwrap();
        let err = svc
            .refresh(&tokens.access_token, &tokens.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let request = LoginRequest::new("alice", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
