//! The reversible action log entry.

use object_store_types::{Identity, TypeName};

use crate::record::Record;

/// One recorded mutation, carrying enough pre-image to invert itself.
#[derive(Debug, Clone)]
pub enum Action {
    /// An entity was assigned `identity` and attached to `prototype`'s
    /// bucket. Inverting drops the entity and retires the identity.
    ///
    /// `record` is the entity's serialized shape at the moment of
    /// insertion. Inverting never needs it (the identity alone is enough to
    /// drop the entity again); it is carried so a persistence observer can
    /// project the inserted row without a second, separate read of the
    /// live store during commit.
    Insert {
        /// The identity assigned at insertion.
        identity: Identity,
        /// The target prototype's type name.
        prototype: TypeName,
        /// The entity's complete serialized shape at the moment of
        /// insertion.
        record: Record,
    },
    /// An entity's fields were changed. `pre_image` is the full serialized
    /// field vector *before* the change, sufficient to restore it.
    Update {
        /// The mutated entity's identity.
        identity: Identity,
        /// The target prototype's type name.
        prototype: TypeName,
        /// The entity's complete serialized shape immediately before the
        /// mutation.
        pre_image: Record,
        /// The entity's complete serialized shape immediately after the
        /// mutation, carried for the same reason `Insert` carries `record`.
        post_image: Record,
    },
    /// An entity was removed. `full` is its complete serialized shape,
    /// sufficient to reconstruct it under the same identity.
    Delete {
        /// The removed entity's identity.
        identity: Identity,
        /// The target prototype's type name.
        prototype: TypeName,
        /// The entity's complete serialized shape at the moment of removal.
        full: Record,
    },
}

impl Action {
    /// The identity this action targets.
    pub fn identity(&self) -> Identity {
        match self {
            Action::Insert { identity, .. } => *identity,
            Action::Update { identity, .. } => *identity,
            Action::Delete { identity, .. } => *identity,
        }
    }

    /// The prototype this action targets.
    pub fn prototype(&self) -> &str {
        match self {
            Action::Insert { prototype, .. } => prototype,
            Action::Update { prototype, .. } => prototype,
            Action::Delete { prototype, .. } => prototype,
        }
    }
}
