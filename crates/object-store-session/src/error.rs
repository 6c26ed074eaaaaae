//! Errors raised while configuring or driving a [`crate::session::Session`].

use object_store_backend::error::DriverError;
use object_store_core::error::{CommitError, FieldError, StoreError};
use object_store_sql::error::SqlError;
use thiserror::Error;

/// A malformed [`crate::config::Config`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `backend` was empty.
    #[error("config.backend must name a registered driver")]
    MissingBackend,
    /// `uri` was empty.
    #[error("config.uri must not be empty")]
    MissingUri,
}

/// Errors raised by [`crate::session::Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// `config.backend` named a driver the supplied
    /// [`object_store_backend::registry::DriverRegistry`] has no factory for.
    #[error("no driver registered under {0:?}")]
    UnknownDriver(String),
    /// The session's configuration was malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A backend connection or statement-execution failure.
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// A dialect compile or render failure.
    #[error(transparent)]
    Sql(#[from] SqlError),
    /// A store-level failure (unknown prototype, transaction state, …).
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A commit failed; the store has already inverted its recorded actions.
    #[error(transparent)]
    Commit(#[from] CommitError),
    /// A serialization/deserialization failure walking an entity's fields.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// A row read back from the backend did not match the shape the
    /// prototype's dummy entity declares.
    #[error("{0}")]
    Decode(String),
}
