//! Password hashing and policy enforcement.

pub mod hasher;
pub mod validator;

pub use hasher::{Argon2Hasher, CredentialHasher, HashedPassword};
pub use validator::{PasswordPolicy, PasswordValidator, validate_not_same};
