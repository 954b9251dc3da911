//! User domain entities.

pub mod model;
pub mod security;

pub use model::{AccountType, NewUser, User};
pub use security::{AuthState, RefreshTokenRecord, SecurityAttributes};
