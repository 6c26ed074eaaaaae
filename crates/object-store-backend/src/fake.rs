//! An in-memory fake driver satisfying the [`crate::backend::Backend`]
//! contract, used for this crate's own prepared-statement lifecycle tests
//! and reused by `object-store-session`'s integration tests to exercise
//! end-to-end scenarios (insert-and-reopen, rollback, cascade delete,
//! driver failure mid-commit) without a real SQL engine.
//!
//! Parses exactly the SQL shapes `object-store-sql`'s [`SqliteDialect`]
//! renders (`object_store_sql::dialect::sqlite::SqliteDialect`) — this is a
//! test fake standing in for a driver, not a general-purpose SQL engine.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::IndexMap;
use object_store_core::field::FieldValue;

use crate::backend::{Backend, PreparedStatement, ResultSink, Step};
use crate::error::DriverError;

#[derive(Debug, Clone, Default)]
struct FakeTable {
    columns: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

/// Configures the fake driver to fail the Nth mutating statement
/// (insert/update/delete) it steps, simulating a driver failure partway
/// through a multi-statement commit.
#[derive(Debug, Clone, Copy)]
struct FailPlan {
    fail_at_mutation: usize,
}

#[derive(Default)]
struct FakeState {
    tables: IndexMap<String, FakeTable>,
    fail_plan: Option<FailPlan>,
    mutation_count: usize,
    outstanding_statements: usize,
}

/// An in-memory, single-process [`Backend`] used for tests. Not a vendor
/// driver: `open`/`close` just toggle a flag, while table data lives in a
/// shared, `Rc`-held [`FakeState`] that survives a close/reopen of the same
/// instance, simulating a durable backend for reopen-style assertions.
///
/// `Clone` hands back another handle onto the same underlying state (only
/// `open` is per-handle) — a caller can register one clone with a
/// [`crate::registry::DriverRegistry`] factory and keep another for
/// introspection (`table_rows`, `fail_on_nth_mutation`) after the registry's
/// copy has been boxed away behind `dyn Backend`.
#[derive(Default, Clone)]
pub struct FakeDriver {
    open: bool,
    state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    /// Creates a fresh, unopened fake driver with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the driver to fail the `n`th mutating statement (1-based)
    /// it steps, after which it returns `Ok` normally again. Used to drive
    /// a driver-failure-during-commit scenario.
    pub fn fail_on_nth_mutation(&self, n: usize) {
        self.state.borrow_mut().fail_plan = Some(FailPlan { fail_at_mutation: n });
    }

    /// Number of `prepare()` calls with no matching `finalize()` yet, for
    /// asserting that every prepared statement was released.
    pub fn outstanding_statements(&self) -> usize {
        self.state.borrow().outstanding_statements
    }

    /// A snapshot of one table's rows, in insertion order, for test
    /// assertions. Empty if the table doesn't exist.
    pub fn table_rows(&self, table: &str) -> Vec<Vec<FieldValue>> {
        self.state.borrow().tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }
}

impl Backend for FakeDriver {
    fn open(&mut self, _uri: &str) -> Result<(), DriverError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.open = false;
        Ok(())
    }

    fn execute(&mut self, sql: &str, sink: &mut dyn ResultSink) -> Result<(), DriverError> {
        let sql = sql.trim();
        let mut state = self.state.borrow_mut();
        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            let (name, columns) = parse_create(rest)?;
            state.tables.insert(name, FakeTable { columns, rows: Vec::new() });
            Ok(())
        } else if let Some(rest) = sql.strip_prefix("DROP TABLE ") {
            state.tables.shift_remove(rest.trim());
            Ok(())
        } else if matches!(sql, "BEGIN" | "COMMIT" | "ROLLBACK") {
            Ok(())
        } else if let Some(rest) = sql.strip_prefix("SELECT ") {
            let (cols, table) = parse_bare_select(rest)?;
            let fake_table = state
                .tables
                .get(&table)
                .ok_or_else(|| DriverError::new(1, format!("no such table: {table}")))?;
            let indices = column_indices(&cols, &fake_table.columns)?;
            for row in &fake_table.rows {
                sink.push_row(indices.iter().map(|&i| field_to_string(&row[i])).collect());
            }
            Ok(())
        } else {
            Err(DriverError::new(1, format!("fake driver cannot execute: {sql}")))
        }
    }

    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>, DriverError> {
        let kind = parse_prepared(sql.trim())?;
        let bind_count = kind.bind_count();
        self.state.borrow_mut().outstanding_statements += 1;
        Ok(Box::new(FakePreparedStatement {
            state: self.state.clone(),
            kind,
            binds: vec![None; bind_count],
            queued_rows: None,
        }))
    }

    fn begin(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum ParsedStatement {
    Insert { table: String, columns: Vec<String> },
    Update { table: String, set_columns: Vec<String>, where_column: String },
    Delete { table: String, where_column: String },
    Select { table: String, columns: Vec<String>, where_column: Option<String> },
}

impl ParsedStatement {
    fn bind_count(&self) -> usize {
        match self {
            ParsedStatement::Insert { columns, .. } => columns.len(),
            ParsedStatement::Update { set_columns, .. } => set_columns.len() + 1,
            ParsedStatement::Delete { .. } => 1,
            ParsedStatement::Select { where_column, .. } => {
                if where_column.is_some() {
                    1
                } else {
                    0
                }
            }
        }
    }
}

fn parse_prepared(sql: &str) -> Result<ParsedStatement, DriverError> {
    if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
        let open = rest.find('(').ok_or_else(|| DriverError::new(1, "malformed INSERT"))?;
        let close = rest.find(')').ok_or_else(|| DriverError::new(1, "malformed INSERT"))?;
        let table = rest[..open].trim().to_string();
        let columns = rest[open + 1..close].split(", ").map(|c| c.trim().to_string()).collect();
        Ok(ParsedStatement::Insert { table, columns })
    } else if let Some(rest) = sql.strip_prefix("UPDATE ") {
        let set_at = rest.find(" SET ").ok_or_else(|| DriverError::new(1, "malformed UPDATE"))?;
        let table = rest[..set_at].trim().to_string();
        let after_set = &rest[set_at + " SET ".len()..];
        let where_at = after_set.find(" WHERE ").ok_or_else(|| DriverError::new(1, "UPDATE requires WHERE"))?;
        let assignments = &after_set[..where_at];
        let where_part = &after_set[where_at + " WHERE ".len()..];
        let set_columns = assignments.split(", ").map(|a| column_name_of_assignment(a)).collect();
        let where_column = column_name_of_assignment(where_part);
        Ok(ParsedStatement::Update { table, set_columns, where_column })
    } else if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
        let where_at = rest.find(" WHERE ").ok_or_else(|| DriverError::new(1, "DELETE requires WHERE"))?;
        let table = rest[..where_at].trim().to_string();
        let where_column = column_name_of_assignment(&rest[where_at + " WHERE ".len()..]);
        Ok(ParsedStatement::Delete { table, where_column })
    } else if let Some(rest) = sql.strip_prefix("SELECT ") {
        let from_at = rest.find(" FROM ").ok_or_else(|| DriverError::new(1, "malformed SELECT"))?;
        let columns = rest[..from_at].split(", ").map(|c| c.trim().to_string()).collect();
        let after_from = &rest[from_at + " FROM ".len()..];
        let (table, where_column) = match after_from.find(" WHERE ") {
            Some(where_at) => {
                let table = after_from[..where_at].trim().to_string();
                let where_column = column_name_of_assignment(&after_from[where_at + " WHERE ".len()..]);
                (table, Some(where_column))
            }
            None => (after_from.trim().to_string(), None),
        };
        Ok(ParsedStatement::Select { table, columns, where_column })
    } else {
        Err(DriverError::new(1, format!("fake driver cannot prepare: {sql}")))
    }
}

fn column_name_of_assignment(part: &str) -> String {
    part.split('=').next().unwrap_or(part).trim().to_string()
}

fn parse_create(rest: &str) -> Result<(String, Vec<String>), DriverError> {
    let open = rest.find('(').ok_or_else(|| DriverError::new(1, "malformed CREATE TABLE"))?;
    let close = rest.rfind(')').ok_or_else(|| DriverError::new(1, "malformed CREATE TABLE"))?;
    let table = rest[..open].trim().to_string();
    let columns = rest[open + 1..close]
        .split(", ")
        .map(|def| def.split_whitespace().next().unwrap_or_default().to_string())
        .collect();
    Ok((table, columns))
}

fn parse_bare_select(rest: &str) -> Result<(Vec<String>, String), DriverError> {
    let from_at = rest.find(" FROM ").ok_or_else(|| DriverError::new(1, "malformed SELECT"))?;
    let columns = rest[..from_at].split(", ").map(|c| c.trim().to_string()).collect();
    let table = rest[from_at + " FROM ".len()..].trim().to_string();
    Ok((columns, table))
}

fn column_indices(requested: &[String], schema: &[String]) -> Result<Vec<usize>, DriverError> {
    if requested.len() == 1 && requested[0] == "*" {
        return Ok((0..schema.len()).collect());
    }
    requested
        .iter()
        .map(|name| {
            schema
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| DriverError::new(1, format!("no such column: {name}")))
        })
        .collect()
}

fn field_to_string(value: &FieldValue) -> String {
    match value {
        FieldValue::Char(v) => v.to_string(),
        FieldValue::Short(v) => v.to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Long(v) => v.to_string(),
        FieldValue::UChar(v) => v.to_string(),
        FieldValue::UShort(v) => v.to_string(),
        FieldValue::UInt(v) => v.to_string(),
        FieldValue::ULong(v) => v.to_string(),
        FieldValue::Bool(v) => if *v { "1".to_string() } else { "0".to_string() },
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Double(v) => v.to_string(),
        FieldValue::Bytes { bytes, .. } => String::from_utf8_lossy(bytes).to_string(),
        FieldValue::Varchar { value, .. } => value.clone(),
        FieldValue::Text(value) => value.clone(),
        FieldValue::ObjectRef { identity, .. } => identity.map(|i| i.0.to_string()).unwrap_or_default(),
        FieldValue::Container { .. } => String::new(),
    }
}

struct FakePreparedStatement {
    state: Rc<RefCell<FakeState>>,
    kind: ParsedStatement,
    binds: Vec<Option<FieldValue>>,
    queued_rows: Option<VecDeque<Vec<FieldValue>>>,
}

impl FakePreparedStatement {
    fn require_bind(&self, index: usize) -> Result<&FieldValue, DriverError> {
        self.binds
            .get(index)
            .and_then(|v| v.as_ref())
            .ok_or_else(|| DriverError::new(2, format!("bind parameter {index} not set")))
    }

    fn check_and_count_mutation(state: &mut FakeState) -> Result<(), DriverError> {
        state.mutation_count += 1;
        if let Some(plan) = state.fail_plan {
            if state.mutation_count == plan.fail_at_mutation {
                return Err(DriverError::new(5, format!("simulated failure on mutation {}", state.mutation_count)));
            }
        }
        Ok(())
    }
}

impl PreparedStatement for FakePreparedStatement {
    fn bind(&mut self, index: usize, value: &FieldValue) -> Result<(), DriverError> {
        let slot = self.binds.get_mut(index).ok_or_else(|| DriverError::new(3, format!("bind index {index} out of range")))?;
        *slot = Some(value.clone());
        Ok(())
    }

    fn step(&mut self) -> Result<Step, DriverError> {
        match &self.kind {
            ParsedStatement::Insert { table, columns } => {
                let values: Vec<FieldValue> = (0..columns.len()).map(|i| self.require_bind(i).map(|v| v.clone())).collect::<Result<_, _>>()?;
                let mut state = self.state.borrow_mut();
                Self::check_and_count_mutation(&mut state)?;
                let fake_table = state
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| DriverError::new(1, format!("no such table: {table}")))?;
                let mut row = vec![FieldValue::Bool(false); fake_table.columns.len()];
                for (col, value) in columns.iter().zip(values) {
                    let idx = fake_table
                        .columns
                        .iter()
                        .position(|c| c == col)
                        .ok_or_else(|| DriverError::new(1, format!("no such column: {col}")))?;
                    row[idx] = value;
                }
                fake_table.rows.push(row);
                Ok(Step::Done)
            }
            ParsedStatement::Update { table, set_columns, where_column } => {
                let where_value = self.require_bind(set_columns.len())?.clone();
                let set_values: Vec<FieldValue> =
                    (0..set_columns.len()).map(|i| self.require_bind(i).map(|v| v.clone())).collect::<Result<_, _>>()?;
                let mut state = self.state.borrow_mut();
                Self::check_and_count_mutation(&mut state)?;
                let fake_table = state
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| DriverError::new(1, format!("no such table: {table}")))?;
                let where_idx = fake_table
                    .columns
                    .iter()
                    .position(|c| c == where_column)
                    .ok_or_else(|| DriverError::new(1, format!("no such column: {where_column}")))?;
                let set_indices: Vec<usize> = set_columns
                    .iter()
                    .map(|col| {
                        fake_table
                            .columns
                            .iter()
                            .position(|c| c == col)
                            .ok_or_else(|| DriverError::new(1, format!("no such column: {col}")))
                    })
                    .collect::<Result<_, _>>()?;
                for row in fake_table.rows.iter_mut().filter(|r| r[where_idx] == where_value) {
                    for (idx, value) in set_indices.iter().zip(&set_values) {
                        row[*idx] = value.clone();
                    }
                }
                Ok(Step::Done)
            }
            ParsedStatement::Delete { table, where_column } => {
                let where_value = self.require_bind(0)?.clone();
                let mut state = self.state.borrow_mut();
                Self::check_and_count_mutation(&mut state)?;
                let fake_table = state
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| DriverError::new(1, format!("no such table: {table}")))?;
                let where_idx = fake_table
                    .columns
                    .iter()
                    .position(|c| c == where_column)
                    .ok_or_else(|| DriverError::new(1, format!("no such column: {where_column}")))?;
                fake_table.rows.retain(|r| r[where_idx] != where_value);
                Ok(Step::Done)
            }
            ParsedStatement::Select { table, columns, where_column } => {
                if self.queued_rows.is_none() {
                    let state = self.state.borrow();
                    let fake_table = state
                        .tables
                        .get(table)
                        .ok_or_else(|| DriverError::new(1, format!("no such table: {table}")))?;
                    let indices = column_indices(columns, &fake_table.columns)?;
                    let filtered: Vec<Vec<FieldValue>> = match where_column {
                        Some(col) => {
                            let where_idx = fake_table
                                .columns
                                .iter()
                                .position(|c| c == col)
                                .ok_or_else(|| DriverError::new(1, format!("no such column: {col}")))?;
                            let where_value = self.require_bind(0)?.clone();
                            fake_table.rows.iter().filter(|r| r[where_idx] == where_value).cloned().collect()
                        }
                        None => fake_table.rows.clone(),
                    };
                    let projected = filtered
                        .into_iter()
                        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                        .collect();
                    self.queued_rows = Some(projected);
                }
                match self.queued_rows.as_mut().and_then(VecDeque::pop_front) {
                    Some(row) => Ok(Step::Row(row.iter().map(field_to_string).collect())),
                    None => Ok(Step::Done),
                }
            }
        }
    }

    fn reset(&mut self) -> Result<(), DriverError> {
        self.binds.iter_mut().for_each(|b| *b = None);
        self.queued_rows = None;
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<(), DriverError> {
        self.state.borrow_mut().outstanding_statements -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CollectingSink;

    fn create_person_table(driver: &mut FakeDriver) {
        let mut sink = CollectingSink::default();
        driver
            .execute("CREATE TABLE person (id BIGINT PRIMARY KEY NOT NULL AUTOINCREMENT, name VARCHAR(32), age INTEGER)", &mut sink)
            .unwrap();
    }

    #[test]
    fn insert_then_select_round_trips() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);

        let mut insert = driver.prepare("INSERT INTO person (id, name, age) VALUES (?, ?, ?)").unwrap();
        insert.bind(0, &FieldValue::ULong(1)).unwrap();
        insert.bind(1, &FieldValue::Varchar { value: "ada".into(), max_len: 32 }).unwrap();
        insert.bind(2, &FieldValue::Int(36)).unwrap();
        assert_eq!(insert.step().unwrap(), Step::Done);
        insert.finalize().unwrap();

        let mut sink = CollectingSink::default();
        driver.execute("SELECT id, name, age FROM person", &mut sink).unwrap();
        assert_eq!(sink.rows, vec![vec!["1".to_string(), "ada".to_string(), "36".to_string()]]);
    }

    #[test]
    fn survives_close_and_reopen() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);
        let mut insert = driver.prepare("INSERT INTO person (id, name, age) VALUES (?, ?, ?)").unwrap();
        insert.bind(0, &FieldValue::ULong(1)).unwrap();
        insert.bind(1, &FieldValue::Varchar { value: "ada".into(), max_len: 32 }).unwrap();
        insert.bind(2, &FieldValue::Int(36)).unwrap();
        insert.step().unwrap();
        insert.finalize().unwrap();

        driver.close().unwrap();
        driver.open(":memory:").unwrap();

        let mut sink = CollectingSink::default();
        driver.execute("SELECT id, name, age FROM person", &mut sink).unwrap();
        assert_eq!(sink.rows.len(), 1);
    }

    #[test]
    fn update_then_delete_affect_only_matching_row() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);

        for (id, name) in [(1u64, "ada"), (2, "bob")] {
            let mut insert = driver.prepare("INSERT INTO person (id, name, age) VALUES (?, ?, ?)").unwrap();
            insert.bind(0, &FieldValue::ULong(id)).unwrap();
            insert.bind(1, &FieldValue::Varchar { value: name.into(), max_len: 32 }).unwrap();
            insert.bind(2, &FieldValue::Int(30)).unwrap();
            insert.step().unwrap();
            insert.finalize().unwrap();
        }

        let mut update = driver.prepare("UPDATE person SET name = ?, age = ? WHERE id = ?").unwrap();
        update.bind(0, &FieldValue::Varchar { value: "bobby".into(), max_len: 32 }).unwrap();
        update.bind(1, &FieldValue::Int(31)).unwrap();
        update.bind(2, &FieldValue::ULong(2)).unwrap();
        update.step().unwrap();
        update.finalize().unwrap();

        let mut delete = driver.prepare("DELETE FROM person WHERE id = ?").unwrap();
        delete.bind(0, &FieldValue::ULong(1)).unwrap();
        delete.step().unwrap();
        delete.finalize().unwrap();

        let rows = driver.table_rows("person");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], FieldValue::Varchar { value: "bobby".into(), max_len: 32 });
    }

    #[test]
    fn fail_on_nth_mutation_aborts_that_insert_only() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);
        driver.fail_on_nth_mutation(2);

        let mut outcomes = Vec::new();
        for (id, name) in [(1u64, "ada"), (2, "bob"), (3, "cid")] {
            let mut insert = driver.prepare("INSERT INTO person (id, name, age) VALUES (?, ?, ?)").unwrap();
            insert.bind(0, &FieldValue::ULong(id)).unwrap();
            insert.bind(1, &FieldValue::Varchar { value: name.into(), max_len: 32 }).unwrap();
            insert.bind(2, &FieldValue::Int(30)).unwrap();
            outcomes.push(insert.step());
            insert.finalize().unwrap();
        }

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
        assert_eq!(driver.table_rows("person").len(), 2);
    }

    #[test]
    fn finalize_clears_outstanding_statement_count() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);

        let stmt = driver.prepare("SELECT id, name, age FROM person").unwrap();
        assert_eq!(driver.outstanding_statements(), 1);
        stmt.finalize().unwrap();
        assert_eq!(driver.outstanding_statements(), 0);
    }

    #[test]
    fn unfinalized_statement_is_detected_as_a_leak() {
        let mut driver = FakeDriver::new();
        driver.open(":memory:").unwrap();
        create_person_table(&mut driver);

        let _stmt = driver.prepare("SELECT id, name, age FROM person").unwrap();
        assert_eq!(driver.outstanding_statements(), 1, "a dropped-without-finalize statement must still count as outstanding");
    }
}
