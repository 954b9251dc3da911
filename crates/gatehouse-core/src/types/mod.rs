//! Core type definitions used across the Gatehouse workspace.

pub mod actor;
pub mod id;

pub use actor::Actor;
pub use id::*;
