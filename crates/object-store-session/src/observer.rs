//! The commit observer that projects a transaction's recorded actions onto a
//! SQL backend: `object-store-core`'s journal calls this, and it in turn
//! drives `object-store-sql`'s statement creator and `object-store-backend`'s
//! prepared-statement lifecycle.

use indexmap::IndexMap;
use object_store_core::action::Action;
use object_store_core::field::FieldValue;
use object_store_core::journal::Observer;
use object_store_core::record::Record;
use object_store_types::TypeName;
use object_store_sql::creator::{self, ID_COLUMN};
use object_store_sql::dialect::{compile, Dialect};
use object_store_sql::render::render;
use object_store_sql::token::{CompareOp, Condition, Statement};
use object_store_backend::backend::Backend;
use object_store_backend::error::DriverError;

use crate::schema::TypeSchema;

/// Compiles, renders, and steps one statement to completion against
/// `backend`, guaranteeing the prepared statement is finalized on every exit
/// path — success, a bind/step failure, or a compile/render failure before a
/// statement was ever prepared.
fn execute_statement(backend: &mut dyn Backend, dialect: &mut dyn Dialect, stmt: Statement) -> anyhow::Result<()> {
    let compiled = compile(stmt, dialect)?;
    let (sql, binds) = render(&compiled, dialect)?;
    let mut prepared = backend.prepare(&sql)?;

    let outcome = (|| -> Result<(), DriverError> {
        for (index, value) in binds.iter().enumerate() {
            prepared.bind(index, value)?;
        }
        prepared.step()?;
        Ok(())
    })();

    let finalize_result = prepared.finalize();
    outcome?;
    finalize_result?;
    Ok(())
}

/// Projects one transaction's actions onto a backend connection, one
/// statement per action (plus one delete/insert pair per container field
/// touched).
pub struct PersistenceObserver<'a> {
    backend: &'a mut dyn Backend,
    dialect: &'a mut dyn Dialect,
    schemas: &'a IndexMap<TypeName, TypeSchema>,
}

impl<'a> PersistenceObserver<'a> {
    /// Builds an observer bound to `backend`/`dialect` for the duration of
    /// one `store.commit`/`store.rollback` call.
    pub fn new(
        backend: &'a mut dyn Backend,
        dialect: &'a mut dyn Dialect,
        schemas: &'a IndexMap<TypeName, TypeSchema>,
    ) -> Self {
        Self { backend, dialect, schemas }
    }

    fn id_condition(identity: u64) -> Condition {
        Condition::Compare { column: ID_COLUMN.to_string(), op: CompareOp::Eq, value: FieldValue::ULong(identity) }
    }

    /// Clears and re-inserts every row of every container field `record`
    /// declares for `prototype`, against `owner_id`.
    fn project_containers(&mut self, prototype: &str, owner_id: u64, record: &Record) -> anyhow::Result<()> {
        let Some(schema) = self.schemas.get(prototype) else { return Ok(()) };
        for container in &schema.containers {
            let Some(FieldValue::Container { items, kind, .. }) = record.get(container.field) else { continue };
            let item_ids: Vec<u64> = items.iter().map(|identity| identity.0).collect();
            execute_statement(self.backend, self.dialect, creator::delete_container_rows(prototype, container.field, owner_id))?;
            for stmt in creator::insert_container_rows(prototype, container.field, *kind, owner_id, &item_ids) {
                execute_statement(self.backend, self.dialect, stmt)?;
            }
        }
        Ok(())
    }

    /// Deletes every row of every container field `prototype` declares,
    /// owned by `owner_id`, without re-inserting — used ahead of deleting
    /// the owner's own row.
    fn clear_containers(&mut self, prototype: &str, owner_id: u64) -> anyhow::Result<()> {
        let Some(schema) = self.schemas.get(prototype) else { return Ok(()) };
        for container in &schema.containers {
            execute_statement(self.backend, self.dialect, creator::delete_container_rows(prototype, container.field, owner_id))?;
        }
        Ok(())
    }
}

impl<'a> Observer for PersistenceObserver<'a> {
    fn visit_insert(&mut self, action: &Action) -> anyhow::Result<()> {
        let Action::Insert { identity, prototype, record } = action else { return Ok(()) };
        let stmt = creator::insert(prototype, identity.0, record);
        execute_statement(self.backend, self.dialect, stmt)?;
        self.project_containers(prototype, identity.0, record)?;
        Ok(())
    }

    fn visit_update(&mut self, action: &Action) -> anyhow::Result<()> {
        let Action::Update { identity, prototype, post_image, .. } = action else { return Ok(()) };
        let stmt = creator::update(prototype, post_image, Self::id_condition(identity.0));
        execute_statement(self.backend, self.dialect, stmt)?;
        self.project_containers(prototype, identity.0, post_image)?;
        Ok(())
    }

    fn visit_delete(&mut self, action: &Action) -> anyhow::Result<()> {
        let Action::Delete { identity, prototype, .. } = action else { return Ok(()) };
        self.clear_containers(prototype, identity.0)?;
        let stmt = creator::delete(prototype, Self::id_condition(identity.0));
        execute_statement(self.backend, self.dialect, stmt)?;
        Ok(())
    }
}
