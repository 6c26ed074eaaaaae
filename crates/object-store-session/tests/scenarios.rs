//! End-to-end scenarios driving a [`Session`] against the in-memory
//! [`FakeDriver`], one per notable end-to-end case: reopen durability,
//! rollback, cascade delete, mid-commit driver failure, unknown driver
//! names, and stale-identity updates.

use std::rc::Rc;

use object_store_backend::backend::{Backend, CollectingSink};
use object_store_backend::fake::FakeDriver;
use object_store_backend::registry::DriverRegistry;
use object_store_core::entity::test_support::{Department, Employee, Person};
use object_store_core::entity::ManagedEntity;
use object_store_core::error::{CommitError, StoreError};
use object_store_sql::dialect::sqlite::SqliteDialect;
use object_store_session::error::SessionError;
use object_store_session::prelude::*;

/// Registers `handle` under the name `"fake"`, returning a registry that
/// hands out fresh clones of it (all sharing one backing [`FakeDriver`]
/// state) plus the handle itself, kept for post-session introspection.
fn fake_registry() -> (DriverRegistry, FakeDriver) {
    let handle = FakeDriver::new();
    let mut registry = DriverRegistry::new();
    let for_registry = handle.clone();
    registry.register("fake", Rc::new(move || Box::new(for_registry.clone()) as Box<dyn Backend>));
    (registry, handle)
}

fn open_session(registry: &DriverRegistry) -> Result<Session, SessionError> {
    Session::open(Config::new("fake", "memory"), registry, Box::new(SqliteDialect::new()))
}

#[test]
fn insert_and_reopen_round_trips_through_select() -> anyhow::Result<()> {
    let (registry, handle) = fake_registry();
    let mut session = open_session(&registry)?;
    session.attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    let ptr = session.insert(Person::new(0, "ada", 36))?;
    session.commit()?;
    assert_eq!(ptr.identity().0, 1);

    session.close()?;
    session.backend_mut().open("memory")?;

    let mut sink = CollectingSink::default();
    session.backend_mut().execute("SELECT * FROM person", &mut sink)?;
    assert_eq!(sink.rows, vec![vec!["1".to_string(), "ada".to_string(), "36".to_string()]]);

    // Same assertion against the fake's own row store, bypassing string formatting.
    assert_eq!(handle.table_rows("person").len(), 1);
    Ok(())
}

#[test]
fn rollback_restores_prior_state() -> anyhow::Result<()> {
    let (registry, _handle) = fake_registry();
    let mut session = open_session(&registry)?;
    session.attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    let ptr = session.insert(Person::new(0, "ada", 36))?;
    session.commit()?;

    session.begin()?;
    session.update(&ptr, |p| p.name = "bob".to_string())?;
    session.rollback()?;

    assert_eq!(ptr.resolve(session.store()).unwrap().name, "ada");
    Ok(())
}

#[test]
fn cascade_delete_clears_join_table_and_member_rows() -> anyhow::Result<()> {
    let (registry, handle) = fake_registry();
    let mut session = open_session(&registry)?;
    session.attach("employee", Rc::new(|| Box::new(Employee::default()) as Box<dyn ManagedEntity>), None)?;
    session.attach("department", Rc::new(|| Box::new(Department::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    let amy = session.insert(Employee::new("amy"))?;
    let bo = session.insert(Employee::new("bo"))?;
    let dept = session.insert(Department::new("engineering"))?;
    session.update(&dept, |d| {
        d.employees.push(amy.identity());
        d.employees.push(bo.identity());
    })?;
    session.commit()?;

    assert_eq!(handle.table_rows("employee").len(), 2);
    assert_eq!(handle.table_rows("department").len(), 1);
    assert_eq!(handle.table_rows("department_employees").len(), 2);

    session.begin()?;
    session.remove(&dept)?;
    session.commit()?;

    assert!(handle.table_rows("employee").is_empty());
    assert!(handle.table_rows("department").is_empty());
    assert!(handle.table_rows("department_employees").is_empty());
    assert!(dept.resolve(session.store()).is_none());
    assert!(amy.resolve(session.store()).is_none());
    Ok(())
}

#[test]
fn driver_failure_on_second_of_three_inserts_rolls_back_the_first() -> anyhow::Result<()> {
    let (registry, handle) = fake_registry();
    let mut session = open_session(&registry)?;
    session.attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    session.insert(Person::new(0, "ada", 36))?;
    session.insert(Person::new(0, "bob", 40))?;
    session.insert(Person::new(0, "cid", 50))?;
    handle.fail_on_nth_mutation(2);

    let err = session.commit().expect_err("second insert should fail");
    assert!(matches!(err, SessionError::Commit(CommitError::ObserverFailed(_))));

    assert_eq!(session.store().len(), 0);
    assert_eq!(handle.outstanding_statements(), 0);
    Ok(())
}

#[test]
fn unknown_driver_name_is_rejected_before_touching_the_store() {
    let registry = DriverRegistry::new();
    let err = Session::open(Config::new("postgres", "memory"), &registry, Box::new(SqliteDialect::new()))
        .expect_err("no driver named postgres is registered");
    assert!(matches!(err, SessionError::UnknownDriver(name) if name == "postgres"));
}

#[test]
fn insert_and_reopen_survives_a_file_backed_uri() -> anyhow::Result<()> {
    // Exercises the same reopen path as `insert_and_reopen_round_trips_through_select`,
    // but against a realistic on-disk-style connection string rather than the
    // literal `"memory"` placeholder, the way a `sqlite`/`mssql` driver's `uri`
    // would actually be shaped.
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("session.db");
    let uri = format!("file:{}", db_path.display());

    let (registry, handle) = fake_registry();
    let mut session = Session::open(Config::new("fake", uri.clone()), &registry, Box::new(SqliteDialect::new()))?;
    session.attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    session.insert(Person::new(0, "ada", 36))?;
    session.commit()?;

    session.close()?;
    session.backend_mut().open(&uri)?;

    assert_eq!(handle.table_rows("person").len(), 1);
    Ok(())
}

#[test]
fn update_against_a_removed_identity_surfaces_not_found() -> anyhow::Result<()> {
    let (registry, _handle) = fake_registry();
    let mut session = open_session(&registry)?;
    session.attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)?;

    session.begin()?;
    let ptr = session.insert(Person::new(0, "ada", 36))?;
    session.remove(&ptr)?;
    session.commit()?;

    session.begin()?;
    let err = session.update(&ptr, |p| p.age += 1).expect_err("identity was already removed");
    assert!(matches!(err, SessionError::Store(StoreError::NotFound { .. })));
    session.rollback()?;
    Ok(())
}
