#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **object-store-types** – Shared primitive identifiers for the object-store engine.
//!
//! Dependency-light and sitting at the very bottom of the crate graph so that
//! every other crate can depend on it without causing cycles. Makes no
//! assumptions about SQL dialects, backends, or journaling policy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

//─────────────────────────────
//  Identity
//─────────────────────────────

/// Monotonically assigned 64-bit key uniquely naming a managed entity within
/// a store. Never recycled within a session's process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub u64);

impl Identity {
    /// The sentinel identity never assigned to a managed entity.
    pub const NONE: Identity = Identity(0);

    /// Returns the next identity in allocation order.
    pub fn next(self) -> Identity {
        Identity(self.0 + 1)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//─────────────────────────────
//  Type names
//─────────────────────────────

/// Stable name of a registered prototype. Doubles as the SQL table name.
pub type TypeName = String;

/// Stable field identifier. Doubles as a SQL column name.
pub type FieldId = &'static str;

//─────────────────────────────
//  Transactions
//─────────────────────────────

/// Unique identifier for a transaction (UUID v4).
pub type TransactionId = Uuid;

/// Monotonic version counter, incremented on every committed mutation of an
/// entity.
pub type Version = u64;

//─────────────────────────────
//  Container kind
//─────────────────────────────

/// Distinguishes `object_container` ordering semantics.
///
/// Only `List` containers get an explicit `position` column in the join
/// table generated by the statement creator; `Set` containers are unordered
/// membership only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Unordered membership; no `position` column.
    Set,
    /// Ordered membership; join table carries a `position` column.
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_monotonic_next() {
        let a = Identity(1);
        let b = a.next();
        assert!(b > a);
        assert_eq!(b, Identity(2));
    }

    #[test]
    fn identity_display() {
        assert_eq!(Identity(42).to_string(), "42");
    }
}
