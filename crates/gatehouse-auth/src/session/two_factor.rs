//! Second-factor verification contract.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;

/// Checks a one-time code against a user's enrolled secret. Secret
/// generation and enrollment happen elsewhere.
#[async_trait]
pub trait TwoFactorVerifier: Send + Sync + 'static {
    async fn verify(&self, user_id: UserId, secret: &str, code: &str) -> AppResult<bool>;
}
