//! Bearer token creation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_entity::user::User;

use super::claims::{ClaimSet, Claims};

/// Signs HS256 bearer tokens with a fixed lifetime.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer written into every token.
    issuer: String,
    /// Bearer lifetime in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

/// A freshly minted bearer token.
#[derive(Clone, serde::Serialize)]
pub struct BearerToken {
    /// The encoded JWT.
    pub token: String,
    /// Token ID.
    pub jti: Uuid,
    /// When the bearer stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("jti", &self.jti)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl_minutes: config.access_token_ttl_minutes as i64,
        }
    }

    /// Mints a bearer for `user` carrying the role and permission claims of
    /// `claims`.
    pub fn encode_access_token(&self, user: &User, claims: &ClaimSet) -> Result<BearerToken, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);
        let jti = Uuid::new_v4();

        let payload = Claims {
            sub: user.id.into_uuid(),
            email: user.email.clone(),
            username: user.username.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti,
            claims: claims.to_wire(),
        };

        Ok(BearerToken {
            token: self.sign(&payload)?,
            jti,
            expires_at,
        })
    }

    /// Signs an arbitrary payload with the configured key.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode bearer token: {e}")))
    }
}
