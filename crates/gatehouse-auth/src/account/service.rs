//! Account lifecycle: registration, email confirmation, password reset.
//!
//! Confirmation and reset codes are stored as extended attributes. At most
//! one pending code of each type exists per user; issuing again while one is
//! pending returns the same code so a link already sitting in an inbox keeps
//! working.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use validator::ValidateEmail;

use gatehouse_core::config::{AccountsConfig, AppConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{Actor, UserId};
use gatehouse_entity::attribute::{AttributeType, ExtendedAttribute};
use gatehouse_entity::role::RoleMembership;
use gatehouse_entity::user::{AccountType, NewUser, SecurityAttributes, User};
use gatehouse_store::{ExtendedAttributeStore, RoleStore, SecurityStore, Stores, UserStore};

use crate::audit::{AuditRecorder, Audited};
use crate::mail::Mailer;
use crate::password::{CredentialHasher, PasswordPolicy, PasswordValidator};
use crate::session::Principal;
use crate::token;

/// Shown for every lifecycle-code failure so the caller cannot tell which
/// step went wrong.
const LIFECYCLE_FAILURE: &str =
    "The code is invalid or has already been used. Please contact the administrator.";

/// Data submitted at sign-up.
#[derive(Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub account_type: AccountType,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("account_type", &self.account_type)
            .finish_non_exhaustive()
    }
}

/// Drives a user account from registration to an active, confirmed state
/// and through password recovery.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    security: Arc<dyn SecurityStore>,
    roles: Arc<dyn RoleStore>,
    attributes: Arc<dyn ExtendedAttributeStore>,
    audit: AuditRecorder,
    hasher: Arc<dyn CredentialHasher>,
    policy: Arc<dyn PasswordPolicy>,
    mailer: Arc<dyn Mailer>,
    accounts: AccountsConfig,
    code_bytes: usize,
    code_ttl: Option<Duration>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("accounts", &self.accounts)
            .field("code_ttl", &self.code_ttl)
            .finish()
    }
}

impl AccountService {
    /// Creates an account service. The password policy comes from the
    /// `password` configuration section.
    pub fn new(
        stores: &Stores,
        config: &AppConfig,
        hasher: Arc<dyn CredentialHasher>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let ttl_hours = config.auth.lifecycle_token_ttl_hours;
        Self {
            users: Arc::clone(&stores.users),
            security: Arc::clone(&stores.security),
            roles: Arc::clone(&stores.roles),
            attributes: Arc::clone(&stores.attributes),
            audit: AuditRecorder::new(Arc::clone(&stores.audit)),
            hasher,
            policy: Arc::new(PasswordValidator::new(&config.password)),
            mailer,
            accounts: config.accounts.clone(),
            code_bytes: config.auth.lifecycle_token_bytes,
            code_ttl: (ttl_hours > 0).then(|| Duration::hours(ttl_hours as i64)),
        }
    }

    /// Replaces the configured password policy.
    pub fn with_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a new account:
    ///
    /// 1. Validate the email and reject a taken username or email
    /// 2. Check password strength, then hash
    /// 3. Create the user unconfirmed and inactive
    /// 4. Add the user to the default role (failure only degrades)
    /// 5. Issue a confirmation code and hand it to the mailer
    pub async fn register(&self, request: RegisterRequest) -> AppResult<Audited<User>> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(AppError::validation(
                "Username must be non-empty and contain no whitespace",
            ));
        }
        if !email.validate_email() {
            return Err(AppError::validation("Email address is not valid"));
        }
        if self.users.get_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.users.get_by_email(email).await?.is_some() {
            return Err(AppError::conflict("Email is already in use"));
        }

        self.policy.check(&request.password)?;
        let hashed = self.hasher.hash(&request.password)?;

        let user = User::register(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            account_type: request.account_type,
        });
        self.users.create(&user).await?;

        let attrs = SecurityAttributes::new(user.id, hashed.hash, hashed.salt);
        if let Err(e) = self.security.create(&attrs).await {
            if let Err(cleanup) = self.users.delete(user.id).await {
                warn!(user_id = %user.id, error = %cleanup, "Failed to remove half-registered user");
            }
            return Err(e);
        }

        let actor = Actor::User(user.id);
        let audit = self.audit.record_create(actor, &user).await;
        info!(user_id = %user.id, username = %user.username, "User registered");

        self.assign_default_role(&user, actor).await;

        match self.issue_email_confirmation(user.id).await {
            Ok(code) => {
                if let Err(e) = self.mailer.send_email_confirmation(&user, &code).await {
                    warn!(user_id = %user.id, error = %e, "Confirmation mail could not be sent");
                }
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Confirmation code could not be issued");
            }
        }

        Ok(Audited::new(user, audit))
    }

    /// Returns the pending confirmation code for the user, minting one if
    /// none is pending.
    pub async fn issue_email_confirmation(&self, user_id: UserId) -> AppResult<String> {
        self.issue_code(user_id, AttributeType::EmailConfirmationToken).await
    }

    /// Re-sends the pending confirmation code. Unknown and already confirmed
    /// addresses succeed without sending anything.
    pub async fn resend_confirmation(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.users.get_by_email(email.trim()).await? else {
            debug!("Confirmation resend for an unknown address ignored");
            return Ok(());
        };
        if user.email_confirmed {
            debug!(user_id = %user.id, "Confirmation resend for a confirmed address ignored");
            return Ok(());
        }

        let code = self.issue_email_confirmation(user.id).await?;
        self.mailer.send_email_confirmation(&user, &code).await?;
        info!(user_id = %user.id, "Confirmation code re-sent");
        Ok(())
    }

    /// Confirms the user's email with the pending code, activating the
    /// account and consuming the code.
    pub async fn confirm_email(&self, user_id: UserId, code: &str) -> AppResult<Audited<User>> {
        let before = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(LIFECYCLE_FAILURE))?;
        self.claim_code(user_id, AttributeType::EmailConfirmationToken, code)
            .await?;

        let mut after = before.clone();
        after.email_confirmed = true;
        after.is_active = true;
        after.modified_on = Utc::now();
        after.modified_by = user_id.into_uuid();
        self.users.update(&after).await?;

        let audit = self.audit.record_update(Actor::User(user_id), &before, &after).await;
        info!(user_id = %user_id, "Email confirmed");
        Ok(Audited::new(after, audit))
    }

    /// Starts password recovery. Unknown and unconfirmed addresses succeed
    /// silently without issuing a code.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.users.get_by_email(email.trim()).await? else {
            debug!("Password reset for an unknown address ignored");
            return Ok(());
        };
        if !user.email_confirmed {
            debug!(user_id = %user.id, "Password reset for an unconfirmed address ignored");
            return Ok(());
        }

        let code = self.issue_password_reset(user.id).await?;
        if let Err(e) = self.mailer.send_password_reset(&user, &code).await {
            warn!(user_id = %user.id, error = %e, "Password reset mail could not be sent");
        }
        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Returns the pending reset code for the user, minting one if none is
    /// pending. The email must already be confirmed.
    pub async fn issue_password_reset(&self, user_id: UserId) -> AppResult<String> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        if !user.email_confirmed {
            return Err(AppError::email_not_confirmed(
                "Email address must be confirmed before a password reset",
            ));
        }
        self.issue_code(user_id, AttributeType::PasswordResetToken).await
    }

    /// Sets a new password with the pending reset code and consumes it. The
    /// refresh token is revoked so existing sessions cannot be extended.
    pub async fn reset_password(
        &self,
        user_id: UserId,
        code: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        if password != confirm_password {
            return Err(AppError::validation("Passwords do not match"));
        }
        self.policy.check(password)?;

        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found(LIFECYCLE_FAILURE));
        }
        let hashed = self.hasher.hash(password)?;
        self.claim_code(user_id, AttributeType::PasswordResetToken, code)
            .await?;

        self.security
            .set_password(user_id, &hashed.hash, &hashed.salt)
            .await?;
        self.security.set_refresh_token(user_id, None).await?;

        info!(user_id = %user_id, "Password reset");
        Ok(())
    }

    /// Changes the caller's own password after re-verifying the current one.
    /// The refresh token is revoked.
    pub async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        let user_id = principal.user_id;
        let attrs = self
            .security
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if !self
            .hasher
            .verify(current_password, &attrs.password_salt, &attrs.password_hash)?
        {
            return Err(AppError::invalid_credentials());
        }
        if new_password != confirm_password {
            return Err(AppError::validation("Passwords do not match"));
        }
        self.policy.check_change(current_password, new_password)?;

        let hashed = self.hasher.hash(new_password)?;
        self.security
            .set_password(user_id, &hashed.hash, &hashed.salt)
            .await?;
        self.security.set_refresh_token(user_id, None).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn assign_default_role(&self, user: &User, actor: Actor) {
        let role = match self.roles.get_by_name(&self.accounts.default_role).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                warn!(
                    user_id = %user.id,
                    role = %self.accounts.default_role,
                    "Default role does not exist; user registered without it"
                );
                return;
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Default role lookup failed");
                return;
            }
        };

        match self.roles.add_user_to_role(user.id, role.id).await {
            Ok(_) => {
                let membership = RoleMembership {
                    user_id: user.id,
                    role_id: role.id,
                };
                self.audit.record_create(actor, &membership).await;
                debug!(user_id = %user.id, role = %role.name, "Default role assigned");
            }
            Err(e) => {
                warn!(
                    user_id = %user.id,
                    role = %role.name,
                    error = %e,
                    "Default role assignment failed; user registered without it"
                );
            }
        }
    }

    async fn issue_code(&self, user_id: UserId, attribute_type: AttributeType) -> AppResult<String> {
        if let Some(pending) = self.pending_code(user_id, attribute_type).await? {
            debug!(user_id = %user_id, kind = %attribute_type, "Reusing pending code");
            return Ok(pending.value);
        }

        let attribute = ExtendedAttribute::new(
            user_id,
            attribute_type,
            token::generate_opaque_token(self.code_bytes),
        );
        self.attributes.add(&attribute).await?;
        debug!(user_id = %user_id, kind = %attribute_type, "Issued new code");
        Ok(attribute.value)
    }

    /// The oldest live pending code. Codes past the configured lifetime are
    /// removed on the way.
    async fn pending_code(
        &self,
        user_id: UserId,
        attribute_type: AttributeType,
    ) -> AppResult<Option<ExtendedAttribute>> {
        let now = Utc::now();
        let mut live = None;
        for attribute in self
            .attributes
            .get_all_of_type_for_owner(user_id, attribute_type)
            .await?
        {
            let expired = self
                .code_ttl
                .is_some_and(|ttl| attribute.is_older_than(ttl, now));
            if expired {
                self.attributes.remove(attribute.id).await?;
                debug!(user_id = %user_id, kind = %attribute_type, "Expired code discarded");
            } else if live.is_none() {
                live = Some(attribute);
            }
        }
        Ok(live)
    }

    /// Checks the presented code against the pending one and removes it.
    ///
    /// The removal is the claim: of two requests presenting the same code,
    /// only the one whose delete actually took the row goes on to apply its
    /// change. A claimed code is spent even if the change then fails.
    async fn claim_code(
        &self,
        user_id: UserId,
        attribute_type: AttributeType,
        presented: &str,
    ) -> AppResult<()> {
        let Some(pending) = self.pending_code(user_id, attribute_type).await? else {
            info!(user_id = %user_id, kind = %attribute_type, "No pending code");
            return Err(AppError::not_found(LIFECYCLE_FAILURE));
        };
        if presented.is_empty() || pending.value != presented {
            warn!(user_id = %user_id, kind = %attribute_type, "Presented code does not match");
            return Err(AppError::token_invalid(LIFECYCLE_FAILURE));
        }
        if !self.attributes.remove(pending.id).await? {
            warn!(user_id = %user_id, kind = %attribute_type, "Code already claimed");
            return Err(AppError::not_found(LIFECYCLE_FAILURE));
        }
        Ok(())
    }
}
