//! Extended per-user attributes.

pub mod model;

pub use model::{AttributeType, ExtendedAttribute};
