//! Error types for the object store, prototype registry, and transaction journal.

use object_store_types::{Identity, TypeName};
use thiserror::Error;

/// Errors raised while serializing or deserializing a managed entity's
/// fields through the [`crate::field::ObjectWriter`]/[`crate::field::ObjectReader`]
/// double-dispatch protocol.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FieldError {
    /// A reader walked a field identifier the entity does not recognize.
    #[error("missing field: {field}")]
    MissingField {
        /// The unresolved field identifier.
        field: &'static str,
    },
    /// A field's stored shape does not match the slot the entity expects.
    #[error("type mismatch for field {field}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The field identifier whose value could not be coerced.
        field: &'static str,
        /// The type the entity's slot expected.
        expected: &'static str,
        /// The type actually present in the record.
        found: &'static str,
    },
}

/// Errors raised by the [`crate::registry::PrototypeRegistry`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegistryError {
    /// `attach` was called with a type name that is already registered.
    #[error("duplicate type: {0}")]
    DuplicateType(TypeName),
    /// `attach` named a parent type that has not been registered.
    #[error("unknown parent: {0}")]
    UnknownParent(TypeName),
}

/// Errors raised by [`crate::store::ObjectStore`] operations.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Delegated registry failure (attach-time duplicate type / unknown parent).
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// An operation named a prototype that has not been attached.
    #[error("unknown prototype: {0}")]
    UnknownPrototype(TypeName),
    /// A field-level serialization failure.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The identity allocator has been exhausted (`u64::MAX` reached).
    #[error("identity allocator exhausted")]
    IdentityExhausted,
    /// A prior failed rollback has left the store unusable.
    #[error("store poisoned by a failed rollback")]
    StorePoisoned,
    /// A transaction-lifecycle invariant was violated (nested begin, commit
    /// on an idle transaction, etc).
    #[error("transaction state error: {0}")]
    TransactionStateError(String),
    /// `get`/`update`/`remove` referenced an identity with no live record.
    #[error("no managed entity with identity {identity} in prototype {prototype}")]
    NotFound {
        /// The prototype bucket that was searched.
        prototype: TypeName,
        /// The identity that was not found.
        identity: Identity,
    },
}

/// Errors raised while committing a transaction.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The journal's observer failed while projecting actions; the journal
    /// inverted the actions before re-raising.
    #[error("commit observer failed, transaction rolled back: {0}")]
    ObserverFailed(#[source] anyhow::Error),
    /// The observer failed AND the subsequent inversion also failed; the
    /// store is now poisoned.
    #[error("commit observer failed and rollback-on-failure also failed; store poisoned")]
    Poisoned(#[source] anyhow::Error),
    /// Plain store-level failure (e.g. commit called with no active
    /// transaction).
    #[error(transparent)]
    Store(#[from] StoreError),
}
