//! # gatehouse-entity
//!
//! Identity entity models for Gatehouse. Every struct in this crate
//! represents a record owned by an external store or a domain value
//! object. The authority core never persists these directly; it asks
//! the store traits in `gatehouse-store` to do so.

pub mod attribute;
pub mod audit;
pub mod permission;
pub mod role;
pub mod user;
