//! # gatehouse-auth
//!
//! The authority core of Gatehouse: everything that decides who a caller is
//! and what they may do.
//!
//! ## Modules
//!
//! - `jwt`: bearer token claims, signing, and validation
//! - `password`: Argon2id hashing and strength policy
//! - `permission`: effective permission resolution
//! - `audit`: field-level diffs and audit entry recording
//! - `session`: login, refresh-token rotation, and the explicit `Principal`
//! - `account`: registration, email confirmation, and password reset
//! - `admin`: role membership, permission grants, and user maintenance
//! - `mail`: the outbound mail collaborator

pub mod account;
pub mod admin;
pub mod audit;
pub mod jwt;
pub mod mail;
pub mod password;
pub mod permission;
pub mod session;
pub mod token;

pub use account::AccountService;
pub use admin::AdminService;
pub use audit::{AuditDiff, AuditOutcome, AuditRecorder, Audited};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use mail::{Mailer, MemoryMailer};
pub use password::{Argon2Hasher, CredentialHasher, PasswordPolicy, PasswordValidator};
pub use permission::{PermissionResolver, PermissionSet};
pub use session::{LoginRequest, Principal, SessionService, SessionTokens, TwoFactorVerifier};
