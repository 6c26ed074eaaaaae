//! Identity, storage, and change notification, tied to the transaction
//! journal.

use std::rc::Rc;

use indexmap::IndexMap;
use object_store_types::{Identity, TypeName, Version};
use tracing::{debug, instrument, warn};

use crate::action::Action;
use crate::entity::ManagedEntity;
use crate::error::{CommitError, StoreError};
use crate::field::FieldValue;
use crate::journal::{Journal, JournalState, Observer};
use crate::pointer::StrongPtr;
use crate::record::Record;
use crate::registry::{Producer, Prototype, PrototypeRegistry};

/// One entity's storage slot: identity, prototype, commit-versioned
/// mutation counter, and the boxed entity itself.
pub struct ManagedRecord {
    identity: Identity,
    prototype: TypeName,
    version: Version,
    entity: Box<dyn ManagedEntity>,
}

impl ManagedRecord {
    /// This record's identity.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// This record's prototype type name.
    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    /// Number of committed mutations applied to this entity.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The boxed entity, for reflection (serialization, column discovery).
    pub fn entity(&self) -> &dyn ManagedEntity {
        self.entity.as_ref()
    }
}

/// A typed, in-memory graph of managed entities with identity, a prototype
/// hierarchy, and change notification through the transaction journal.
pub struct ObjectStore {
    registry: PrototypeRegistry,
    next_identity: u64,
    buckets: IndexMap<TypeName, IndexMap<Identity, ManagedRecord>>,
    transaction: Option<Journal>,
    poisoned: bool,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore {
    /// Creates an empty store with an empty prototype registry.
    pub fn new() -> Self {
        Self {
            registry: PrototypeRegistry::new(),
            next_identity: 1,
            buckets: IndexMap::new(),
            transaction: None,
            poisoned: false,
        }
    }

    /// Read access to the prototype registry (`find`/`walk`).
    pub fn registry(&self) -> &PrototypeRegistry {
        &self.registry
    }

    /// `true` once a failed rollback has left the store unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Whether a transaction is currently open.
    pub fn has_active_transaction(&self) -> bool {
        matches!(self.transaction.as_ref().map(Journal::state), Some(JournalState::Active))
    }

    //─────────────────────────────
    //  Prototype registration
    //─────────────────────────────

    /// Registers a new managed type. See [`PrototypeRegistry::attach`].
    pub fn attach(
        &mut self,
        type_name: impl Into<TypeName>,
        producer: Producer,
        parent_type_name: Option<&str>,
    ) -> Result<Rc<Prototype>, StoreError> {
        let type_name = type_name.into();
        let node = self.registry.attach(type_name.clone(), producer, parent_type_name)?;
        self.buckets.entry(type_name).or_default();
        Ok(node)
    }

    //─────────────────────────────
    //  Transaction lifecycle
    //─────────────────────────────

    /// Begins a new transaction. Fails with
    /// [`StoreError::TransactionStateError`] if one is already active
    /// (flat transactions only), and with [`StoreError::StorePoisoned`] if
    /// the store has been poisoned by a prior failed rollback.
    #[instrument(skip(self, observer))]
    pub fn begin(&mut self, observer: &mut dyn Observer) -> Result<(), StoreError> {
        self.check_not_poisoned()?;
        if self.transaction.is_some() {
            return Err(StoreError::TransactionStateError(
                "nested begin rejected; flat transactions only".into(),
            ));
        }
        self.transaction = Some(Journal::begin(Identity(self.next_identity)));
        observer.on_begin();
        Ok(())
    }

    /// Commits the active transaction: invokes `observer.on_commit` with the
    /// recorded actions. If the observer fails, the journal inverts the
    /// actions (rollback semantics) before re-raising.
    #[instrument(skip(self, observer))]
    pub fn commit(&mut self, observer: &mut dyn Observer) -> Result<(), CommitError> {
        self.check_not_poisoned()?;
        let mut journal = self
            .transaction
            .take()
            .ok_or_else(|| StoreError::TransactionStateError("commit on idle transaction".into()))?;
        let actions = journal.actions().to_vec();

        match observer.on_commit(&actions) {
            Ok(()) => {
                journal.mark_committed();
                self.bump_versions(&actions);
                debug!(action_count = actions.len(), "transaction committed");
                Ok(())
            }
            Err(observer_err) => {
                warn!(error = %observer_err, "commit observer failed; rolling back");
                match self.invert_actions(&actions) {
                    Ok(()) => {
                        journal.mark_rolled_back();
                        observer.on_rollback();
                        Err(CommitError::ObserverFailed(observer_err))
                    }
                    Err(invert_err) => {
                        self.poisoned = true;
                        Err(CommitError::Poisoned(invert_err.into()))
                    }
                }
            }
        }
    }

    /// Rolls back the active transaction, inverting its actions in reverse
    /// order. A failed rollback poisons the store.
    #[instrument(skip(self, observer))]
    pub fn rollback(&mut self, observer: &mut dyn Observer) -> Result<(), StoreError> {
        self.check_not_poisoned()?;
        let mut journal = self
            .transaction
            .take()
            .ok_or_else(|| StoreError::TransactionStateError("rollback on idle transaction".into()))?;
        let actions = journal.actions().to_vec();

        match self.invert_actions(&actions) {
            Ok(()) => {
                journal.mark_rolled_back();
                observer.on_rollback();
                Ok(())
            }
            Err(_) => {
                self.poisoned = true;
                Err(StoreError::StorePoisoned)
            }
        }
    }

    fn bump_versions(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::Delete { .. } = action {
                continue;
            }
            if let Some(bucket) = self.buckets.get_mut(action.prototype()) {
                if let Some(record) = bucket.get_mut(&action.identity()) {
                    record.version += 1;
                }
            }
        }
    }

    fn invert_actions(&mut self, actions: &[Action]) -> Result<(), StoreError> {
        for action in actions.iter().rev() {
            match action {
                Action::Insert { identity, prototype, .. } => {
                    let bucket = self
                        .buckets
                        .get_mut(prototype)
                        .ok_or_else(|| StoreError::UnknownPrototype(prototype.clone()))?;
                    bucket.shift_remove(identity);
                }
                Action::Update { identity, prototype, pre_image, .. } => {
                    let bucket = self
                        .buckets
                        .get_mut(prototype)
                        .ok_or_else(|| StoreError::UnknownPrototype(prototype.clone()))?;
                    let record = bucket.get_mut(identity).ok_or_else(|| StoreError::NotFound {
                        prototype: prototype.clone(),
                        identity: *identity,
                    })?;
                    pre_image.apply(record.entity.as_mut())?;
                }
                Action::Delete { identity, prototype, full } => {
                    let node = self
                        .registry
                        .find(prototype)
                        .ok_or_else(|| StoreError::UnknownPrototype(prototype.clone()))?;
                    let mut entity = node.produce();
                    full.apply(entity.as_mut())?;
                    let bucket = self.buckets.entry(prototype.clone()).or_default();
                    bucket.insert(
                        *identity,
                        ManagedRecord { identity: *identity, prototype: prototype.clone(), version: 0, entity },
                    );
                }
            }
        }
        Ok(())
    }

    //─────────────────────────────
    //  Mutations
    //─────────────────────────────

    /// Assigns a fresh identity, attaches `entity` to its prototype bucket,
    /// and (if a transaction is active) appends an insert action.
    pub fn insert<T: ManagedEntity + 'static>(&mut self, entity: T) -> Result<StrongPtr<T>, StoreError> {
        self.check_not_poisoned()?;
        let prototype = entity.prototype_name().to_string();
        if self.registry.find(&prototype).is_none() {
            return Err(StoreError::UnknownPrototype(prototype));
        }
        let identity = self.alloc_identity()?;
        let snapshot = Record::capture(&entity)?;
        let record = ManagedRecord {
            identity,
            prototype: prototype.clone(),
            version: 0,
            entity: Box::new(entity),
        };
        self.buckets.entry(prototype.clone()).or_default().insert(identity, record);
        if let Some(txn) = self.transaction.as_mut() {
            txn.record(Action::Insert { identity, prototype: prototype.clone(), record: snapshot });
        }
        debug!(%identity, prototype = %prototype, "inserted entity");
        Ok(StrongPtr::new(identity, prototype))
    }

    /// Mutates the entity addressed by `ptr` in place via `mutate`,
    /// capturing a pre-image of its current state first so the change can
    /// be inverted. Appends an update action if a transaction is active.
    pub fn update<T: ManagedEntity + 'static>(
        &mut self,
        ptr: &StrongPtr<T>,
        mutate: impl FnOnce(&mut T),
    ) -> Result<(), StoreError> {
        self.check_not_poisoned()?;
        let prototype = ptr.prototype().to_string();
        let bucket = self.buckets.get_mut(&prototype).ok_or_else(|| StoreError::NotFound {
            prototype: prototype.clone(),
            identity: ptr.identity(),
        })?;
        let record = bucket.get_mut(&ptr.identity()).ok_or_else(|| StoreError::NotFound {
            prototype: prototype.clone(),
            identity: ptr.identity(),
        })?;
        let pre_image = Record::capture(record.entity.as_ref())?;
        let typed = record
            .entity
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("StrongPtr<T> always addresses a record whose entity is a T");
        mutate(typed);
        let post_image = Record::capture(record.entity.as_ref())?;
        if let Some(txn) = self.transaction.as_mut() {
            txn.record(Action::Update { identity: ptr.identity(), prototype, pre_image, post_image });
        }
        Ok(())
    }

    /// Detaches the entity addressed by `ptr` from its bucket and retires
    /// its identity. Cascades into any owned containers, removing their
    /// members first. Appends a delete action (per
    /// removed entity, children before the owner) if a transaction is
    /// active.
    pub fn remove<T: ManagedEntity + 'static>(&mut self, ptr: &StrongPtr<T>) -> Result<(), StoreError> {
        self.check_not_poisoned()?;
        self.remove_raw(ptr.prototype(), ptr.identity())
    }

    fn remove_raw(&mut self, prototype: &str, identity: Identity) -> Result<(), StoreError> {
        let bucket = self.buckets.get_mut(prototype).ok_or_else(|| StoreError::NotFound {
            prototype: prototype.to_string(),
            identity,
        })?;
        let record = bucket.shift_remove(&identity).ok_or_else(|| StoreError::NotFound {
            prototype: prototype.to_string(),
            identity,
        })?;
        let full = Record::capture(record.entity.as_ref())?;

        for (_, value) in full.iter() {
            if let FieldValue::Container { prototype: child_prototype, items, .. } = value {
                for child_identity in items {
                    self.remove_raw(child_prototype, *child_identity)?;
                }
            }
        }

        if let Some(txn) = self.transaction.as_mut() {
            txn.record(Action::Delete { identity, prototype: prototype.to_string(), full });
        }
        debug!(%identity, prototype, "removed entity");
        Ok(())
    }

    //─────────────────────────────
    //  Reads
    //─────────────────────────────

    /// Looks up a live entity by prototype and identity, downcast to `T`.
    pub fn get_typed<T: ManagedEntity + 'static>(&self, prototype: &str, identity: Identity) -> Option<&T> {
        self.buckets.get(prototype)?.get(&identity)?.entity.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`ObjectStore::get_typed`]. Does not capture a
    /// pre-image or journal the change — prefer [`ObjectStore::update`]
    /// inside a transaction.
    pub fn get_typed_mut<T: ManagedEntity + 'static>(
        &mut self,
        prototype: &str,
        identity: Identity,
    ) -> Option<&mut T> {
        self.buckets.get_mut(prototype)?.get_mut(&identity)?.entity.as_any_mut().downcast_mut::<T>()
    }

    /// Untyped lookup by prototype and identity.
    pub fn get(&self, prototype: &str, identity: Identity) -> Option<&ManagedRecord> {
        self.buckets.get(prototype)?.get(&identity)
    }

    /// All live records for one prototype bucket, in insertion order.
    pub fn bucket(&self, prototype: &str) -> impl Iterator<Item = &ManagedRecord> {
        self.buckets.get(prototype).into_iter().flat_map(|b| b.values())
    }

    /// Number of live entities across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    /// `true` if no entities are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn alloc_identity(&mut self) -> Result<Identity, StoreError> {
        if self.next_identity == u64::MAX {
            return Err(StoreError::IdentityExhausted);
        }
        let identity = Identity(self.next_identity);
        self.next_identity += 1;
        Ok(identity)
    }

    fn check_not_poisoned(&self) -> Result<(), StoreError> {
        if self.poisoned {
            Err(StoreError::StorePoisoned)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::{Department, Employee, Person};
    use crate::journal::NullObserver;

    fn person_store() -> ObjectStore {
        let mut store = ObjectStore::new();
        store
            .attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)
            .unwrap();
        store
    }

    #[test]
    fn identity_monotonicity() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let a = store.insert(Person::new(0, "ada", 36)).unwrap();
        let b = store.insert(Person::new(0, "bob", 40)).unwrap();
        store.commit(&mut obs).unwrap();
        assert!(a.identity() < b.identity());
    }

    #[test]
    fn insert_assigns_identity_and_tracks_version() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let ptr = store.insert(Person::new(0, "ada", 36)).unwrap();
        store.commit(&mut obs).unwrap();

        let person = ptr.resolve(&store).unwrap();
        assert_eq!(person.name, "ada");
        assert_eq!(store.get("person", ptr.identity()).unwrap().version(), 1);
    }

    #[test]
    fn rollback_restores_prior_state() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let ptr = store.insert(Person::new(0, "ada", 36)).unwrap();
        store.commit(&mut obs).unwrap();

        store.begin(&mut obs).unwrap();
        store.update(&ptr, |p| p.name = "bob".to_string()).unwrap();
        store.rollback(&mut obs).unwrap();

        assert_eq!(ptr.resolve(&store).unwrap().name, "ada");
    }

    #[test]
    fn removed_identity_resolves_to_none_not_dangling() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let ptr = store.insert(Person::new(0, "ada", 36)).unwrap();
        store.commit(&mut obs).unwrap();

        store.begin(&mut obs).unwrap();
        store.remove(&ptr).unwrap();
        store.commit(&mut obs).unwrap();

        assert!(ptr.resolve(&store).is_none());
    }

    #[test]
    fn rollback_of_delete_reinserts_under_same_identity() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let ptr = store.insert(Person::new(0, "ada", 36)).unwrap();
        store.commit(&mut obs).unwrap();
        let original_identity = ptr.identity();

        store.begin(&mut obs).unwrap();
        store.remove(&ptr).unwrap();
        store.rollback(&mut obs).unwrap();

        let restored = store.get_typed::<Person>("person", original_identity).unwrap();
        assert_eq!(restored.name, "ada");
    }

    #[test]
    fn cascade_delete_removes_container_members() {
        let mut store = ObjectStore::new();
        store
            .attach("department", Rc::new(|| Box::new(Department::default()) as Box<dyn ManagedEntity>), None)
            .unwrap();
        store
            .attach("employee", Rc::new(|| Box::new(Employee::default()) as Box<dyn ManagedEntity>), None)
            .unwrap();

        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let e1 = store.insert(Employee::new("ada")).unwrap();
        let e2 = store.insert(Employee::new("bob")).unwrap();
        let dept_ptr = store
            .insert(Department { name: "eng".into(), employees: vec![e1.identity(), e2.identity()] })
            .unwrap();
        store.commit(&mut obs).unwrap();

        store.begin(&mut obs).unwrap();
        store.remove(&dept_ptr).unwrap();
        store.commit(&mut obs).unwrap();

        assert!(e1.resolve(&store).is_none());
        assert!(e2.resolve(&store).is_none());
        assert!(dept_ptr.resolve(&store).is_none());
    }

    #[test]
    fn identity_exhausted_is_fatal() {
        let mut store = person_store();
        store.next_identity = u64::MAX;
        let err = store.insert(Person::new(0, "ada", 36)).unwrap_err();
        assert!(matches!(err, StoreError::IdentityExhausted));
    }

    #[test]
    fn nested_begin_rejected() {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();
        let err = store.begin(&mut obs).unwrap_err();
        assert!(matches!(err, StoreError::TransactionStateError(_)));
    }

    #[test]
    fn unregistered_prototype_rejected() {
        let mut store = ObjectStore::new();
        let err = store.insert(Person::new(0, "ada", 36)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownPrototype(_)));
    }
}
