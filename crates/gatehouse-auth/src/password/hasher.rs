//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use gatehouse_core::error::AppError;

/// A password hash together with the salt it was produced with.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: String,
    pub salt: String,
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashedPassword").finish_non_exhaustive()
    }
}

/// The hash/verify pair used for stored credentials.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hashes a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<HashedPassword, AppError>;

    /// Returns `Ok(true)` if `password` matches the stored hash and salt.
    fn verify(&self, password: &str, salt: &str, hash: &str) -> Result<bool, AppError>;
}

/// Argon2id with default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Creates a new hasher instance.
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<HashedPassword, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
            salt: salt.as_str().to_string(),
        })
    }

    /// The PHC string embeds the salt; a stored salt that disagrees with it
    /// means the record was tampered with and never verifies.
    fn verify(&self, password: &str, salt: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        if parsed_hash.salt.map(|s| s.as_str()) != Some(salt) {
            return Ok(false);
        }

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hashed = hasher.hash("Correct-Horse-1").unwrap();
        assert!(hashed.hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Correct-Horse-1", &hashed.salt, &hashed.hash).unwrap());
        assert!(!hasher.verify("wrong", &hashed.salt, &hashed.hash).unwrap());
    }

    #[test]
    fn test_salt_mismatch_fails() {
        let hasher = Argon2Hasher::new();
        let a = hasher.hash("Correct-Horse-1").unwrap();
        let b = hasher.hash("Correct-Horse-1").unwrap();
        assert_ne!(a.salt, b.salt);
        assert!(!hasher.verify("Correct-Horse-1", &b.salt, &a.hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        let err = Argon2Hasher::new().verify("x", "salt", "not-a-phc-string").unwrap_err();
        assert_eq!(err.kind, gatehouse_core::ErrorKind::Internal);
    }
}
