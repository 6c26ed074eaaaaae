//! Errors surfaced by a [`crate::backend::Backend`] implementation.

use thiserror::Error;

/// A backend-reported failure: I/O, constraint violation, or type coercion
/// failure. The journal surfaces these as transaction-abort.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("driver error {code}: {message}")]
pub struct DriverError {
    /// A driver-specific status code (vendor errno, SQLite result code, …).
    pub code: i32,
    /// A human-readable description.
    pub message: String,
}

impl DriverError {
    /// Builds a driver error with the given code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}
