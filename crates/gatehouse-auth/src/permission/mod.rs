//! Effective permission resolution across direct grants and roles.

pub mod resolver;
pub mod set;

pub use resolver::PermissionResolver;
pub use set::PermissionSet;
