//! Errors raised while compiling or rendering a [`crate::token::Statement`].

use thiserror::Error;

/// Errors raised by a [`crate::dialect::Dialect`]'s compile pass or by
/// [`crate::render::render`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SqlError {
    /// A dialect explicitly rejected a token it does not support.
    #[error("unsupported token for dialect {dialect}: {token}")]
    UnsupportedToken {
        /// The rejecting dialect's name.
        dialect: String,
        /// A short description of the offending token.
        token: String,
    },
    /// An identifier fails the unquoted-identifier grammar and the dialect
    /// has no quoting strategy for it.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Rendering found a `Values`/`Condition` token with no positional
    /// counterpart, or vice versa.
    #[error("malformed statement: {0}")]
    Malformed(String),
}
