//! The session façade: opens a backend connection against a driver
//! registry, attaches prototypes (creating their tables), and drives the
//! object store's transaction lifecycle through a [`PersistenceObserver`].

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::instrument;

use object_store_backend::backend::Backend;
use object_store_backend::backend::CollectingSink;
use object_store_backend::registry::DriverRegistry;
use object_store_core::entity::ManagedEntity;
use object_store_core::pointer::StrongPtr;
use object_store_core::record::Record;
use object_store_core::registry::{Producer, Prototype};
use object_store_core::store::ObjectStore;
use object_store_sql::creator;
use object_store_sql::dialect::{compile, Dialect};
use object_store_sql::render::render;
use object_store_sql::token::Statement;
use object_store_types::TypeName;

use crate::config::Config;
use crate::error::SessionError;
use crate::observer::PersistenceObserver;
use crate::schema::TypeSchema;

/// A live connection to one backend, with its own object store, prototype
/// schemas, and transaction lifecycle.
pub struct Session {
    config: Config,
    store: ObjectStore,
    backend: Box<dyn Backend>,
    dialect: Box<dyn Dialect>,
    schemas: IndexMap<TypeName, TypeSchema>,
}

impl Session {
    /// Resolves `config.backend` through `registry`, opens it against
    /// `config.uri`, and returns an empty session ready for `attach`.
    #[instrument(skip(registry, dialect))]
    pub fn open(config: Config, registry: &DriverRegistry, dialect: Box<dyn Dialect>) -> Result<Self, SessionError> {
        config.validate()?;
        let mut backend =
            registry.create(&config.backend).ok_or_else(|| SessionError::UnknownDriver(config.backend.clone()))?;
        backend.open(&config.uri)?;
        Ok(Self { config, store: ObjectStore::new(), backend, dialect, schemas: IndexMap::new() })
    }

    /// Closes the backend connection. A no-op on an already-closed session.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.backend.close()?;
        Ok(())
    }

    /// Read access to the in-memory object store.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Direct access to the backend connection, for ad-hoc reads (e.g.
    /// verifying persisted rows survive a close/reopen).
    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    /// Registers a new managed type with the object store, derives its
    /// schema from a freshly produced dummy entity, and — if
    /// `config.auto_create` — issues the `CREATE TABLE` statements for the
    /// entity's own table and every container field's join table.
    pub fn attach(
        &mut self,
        type_name: impl Into<TypeName>,
        producer: Producer,
        parent_type_name: Option<&str>,
    ) -> Result<Rc<Prototype>, SessionError> {
        let type_name = type_name.into();
        let node = self.store.attach(type_name.clone(), producer, parent_type_name)?;
        let dummy = Record::capture(node.produce().as_ref())?;
        let schema = TypeSchema::from_dummy(dummy);

        if self.config.auto_create {
            self.create_tables(&type_name, &schema)?;
        }

        self.schemas.insert(type_name, schema);
        Ok(node)
    }

    fn create_tables(&mut self, type_name: &str, schema: &TypeSchema) -> Result<(), SessionError> {
        let create = creator::create_table(type_name, &schema.dummy)?;
        self.execute_ddl(create)?;
        for container in &schema.containers {
            let create = creator::create_container_table(type_name, container.field, container.kind);
            self.execute_ddl(create)?;
        }
        Ok(())
    }

    fn execute_ddl(&mut self, stmt: Statement) -> Result<(), SessionError> {
        let compiled = compile(stmt, self.dialect.as_mut())?;
        let (sql, _binds) = render(&compiled, self.dialect.as_ref())?;
        let mut sink = CollectingSink::default();
        self.backend.execute(&sql, &mut sink)?;
        Ok(())
    }

    /// Begins a transaction: opens the backend's transaction, then the
    /// store's journal.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.backend.begin()?;
        let mut observer = PersistenceObserver::new(self.backend.as_mut(), self.dialect.as_mut(), &self.schemas);
        self.store.begin(&mut observer)?;
        Ok(())
    }

    /// Inserts `entity` into the active transaction. The row is not written
    /// to the backend until [`Session::commit`].
    pub fn insert<T: ManagedEntity + 'static>(&mut self, entity: T) -> Result<StrongPtr<T>, SessionError> {
        Ok(self.store.insert(entity)?)
    }

    /// Mutates the entity addressed by `ptr` within the active transaction.
    pub fn update<T: ManagedEntity + 'static>(
        &mut self,
        ptr: &StrongPtr<T>,
        mutate: impl FnOnce(&mut T),
    ) -> Result<(), SessionError> {
        Ok(self.store.update(ptr, mutate)?)
    }

    /// Removes the entity addressed by `ptr` (cascading into any owned
    /// containers) within the active transaction.
    pub fn remove<T: ManagedEntity + 'static>(&mut self, ptr: &StrongPtr<T>) -> Result<(), SessionError> {
        Ok(self.store.remove(ptr)?)
    }

    /// Projects every recorded action onto the backend and, on success,
    /// issues the backend's `COMMIT`. On an observer (projection) failure,
    /// the store has already inverted its in-memory state; this also issues
    /// the backend's `ROLLBACK` to discard any statements already stepped
    /// within the open backend transaction.
    #[instrument(skip(self))]
    pub fn commit(&mut self) -> Result<(), SessionError> {
        let mut observer = PersistenceObserver::new(self.backend.as_mut(), self.dialect.as_mut(), &self.schemas);
        match self.store.commit(&mut observer) {
            Ok(()) => {
                if self.config.flush_on_commit {
                    self.backend.commit()?;
                }
                Ok(())
            }
            Err(store_err) => {
                let _ = self.backend.rollback();
                Err(store_err.into())
            }
        }
    }

    /// Rolls back the active transaction: inverts the store's in-memory
    /// state and issues the backend's `ROLLBACK`. No action is ever
    /// projected to the backend on a plain rollback (only `commit` drives
    /// the observer's `visit_*` leaves), so there is nothing backend-side to
    /// undo beyond the open transaction itself.
    pub fn rollback(&mut self) -> Result<(), SessionError> {
        let mut observer = PersistenceObserver::new(self.backend.as_mut(), self.dialect.as_mut(), &self.schemas);
        self.store.rollback(&mut observer)?;
        self.backend.rollback()?;
        Ok(())
    }
}
