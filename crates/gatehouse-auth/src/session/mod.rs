//! Login, refresh-token rotation, and the authenticated caller.

pub mod principal;
pub mod service;
pub mod two_factor;

pub use principal::Principal;
pub use service::{LoginRequest, SessionService, SessionTokens};
pub use two_factor::TwoFactorVerifier;
