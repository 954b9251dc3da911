//! Convenience result type alias for Gatehouse.

use crate::error::AppError;

/// A specialized `Result` type for Gatehouse operations.
///
/// Store adapters and core services all return this so that failures
/// cross crate boundaries as typed values, never as panics.
pub type AppResult<T> = Result<T, AppError>;
