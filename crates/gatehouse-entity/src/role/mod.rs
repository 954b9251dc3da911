//! Role domain entities.

pub mod membership;
pub mod model;

pub use membership::RoleMembership;
pub use model::Role;
