//! Bearer token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;

use super::claims::Claims;

/// Validates HS256 bearer tokens.
///
/// Two validation profiles share one key: the strict one used to
/// authenticate requests, and the refresh one which still checks algorithm,
/// signature, and issuer but accepts an expired token.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Full validation, expiry included.
    strict: Validation,
    /// Expiry ignored.
    refresh: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("strict", &self.strict)
            .field("refresh", &self.refresh)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut strict = Validation::new(Algorithm::HS256);
        strict.validate_exp = true;
        strict.leeway = 5; // seconds of clock skew
        strict.set_issuer(&[config.jwt_issuer.as_str()]);

        let mut refresh = strict.clone();
        refresh.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            strict,
            refresh,
        }
    }

    /// Decodes a bearer presented on a normal request.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &self.strict)
    }

    /// Decodes a bearer presented for refresh. Expiry is not checked.
    pub fn decode_for_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &self.refresh)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::token_expired("Token has expired"),
                JwtErrorKind::InvalidToken => AppError::token_invalid("Invalid token format"),
                JwtErrorKind::InvalidSignature => AppError::token_invalid("Invalid token signature"),
                JwtErrorKind::InvalidAlgorithm => {
                    AppError::token_invalid("Token signed with an unexpected algorithm")
                }
                JwtErrorKind::InvalidIssuer => AppError::token_invalid("Token issuer mismatch"),
                _ => AppError::token_invalid(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    use gatehouse_core::error::ErrorKind;

    use super::*;
    use crate::jwt::encoder::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a-test-secret-that-is-long-enough-for-hs256".to_string(),
            ..AuthConfig::default()
        }
    }

    fn claims(expires_in: Duration) -> Claims {
        let now = Utc::now();
        Claims {
            sub: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            iss: config().jwt_issuer,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            jti: Uuid::new_v4(),
            claims: Vec::new(),
        }
    }

    #[test]
    fn test_valid_token_decodes() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let token = encoder.sign(&claims(Duration::minutes(5))).unwrap();
        let decoded = decoder.decode_access_token(&token).unwrap();
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn test_expired_token_rejected_for_access_but_not_refresh() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let token = encoder.sign(&claims(Duration::hours(-2))).unwrap();

        let err = decoder.decode_access_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);

        let decoded = decoder.decode_for_refresh(&token).unwrap();
        assert!(decoded.is_expired());
    }

    #[test]
    fn test_wrong_algorithm_rejected_even_for_refresh() {
        let decoder = JwtDecoder::new(&config());
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims(Duration::minutes(5)),
            &EncodingKey::from_secret(config().jwt_secret.as_bytes()),
        )
        .unwrap();
        let err = decoder.decode_for_refresh(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let signed = encoder.sign(&claims(Duration::hours(-1))).unwrap();
        let split = signed.rfind('.').unwrap() + 1;
        let flipped = if signed[split..].starts_with('A') { 'B' } else { 'A' };
        let token = format!("{}{}{}", &signed[..split], flipped, &signed[split + 1..]);
        let err = decoder.decode_for_refresh(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let foreign = AuthConfig {
            jwt_secret: "another-secret-which-is-also-long-enough!!".to_string(),
            ..AuthConfig::default()
        };
        let token = JwtEncoder::new(&foreign).sign(&claims(Duration::minutes(5))).unwrap();
        let err = JwtDecoder::new(&config()).decode_access_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let encoder = JwtEncoder::new(&config());
        let mut foreign = claims(Duration::minutes(5));
        foreign.iss = "someone-else".to_string();
        let token = encoder.sign(&foreign).unwrap();
        let err = JwtDecoder::new(&config()).decode_access_token(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }
}
