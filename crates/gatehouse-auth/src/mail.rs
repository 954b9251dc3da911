//! Outbound mail collaborator.
//!
//! Delivery is outside the core. Callers plug in their own transport; the
//! in-memory mailer records messages for inspection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::User;

/// Which lifecycle message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    EmailConfirmation,
    PasswordReset,
}

/// Sends lifecycle codes to users.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver an email-confirmation code.
    async fn send_email_confirmation(&self, user: &User, code: &str) -> AppResult<()>;

    /// Deliver a password-reset code.
    async fn send_password_reset(&self, user: &User, code: &str) -> AppResult<()>;
}

/// A message captured by [`MemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub kind: MailKind,
    pub to: String,
    pub code: String,
}

/// Keeps sent messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failing: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Everything sent so far, oldest first.
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    /// The most recent code of `kind` sent to `email`.
    pub async fn last_code(&self, kind: MailKind, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.kind == kind && m.to.eq_ignore_ascii_case(email))
            .map(|m| m.code.clone())
    }

    async fn record(&self, kind: MailKind, user: &User, code: &str) -> AppResult<()> {
        if self.failing {
            return Err(AppError::internal("Mail transport unavailable"));
        }
        self.sent.lock().await.push(SentMail {
            kind,
            to: user.email.clone(),
            code: code.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_email_confirmation(&self, user: &User, code: &str) -> AppResult<()> {
        self.record(MailKind::EmailConfirmation, user, code).await
    }

    async fn send_password_reset(&self, user: &User, code: &str) -> AppResult<()> {
        self.record(MailKind::PasswordReset, user, code).await
    }
}
