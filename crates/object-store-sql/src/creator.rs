//! Projects a managed entity's serialized shape into parameterized
//! `CREATE`/`SELECT`/`INSERT`/`UPDATE`/`DELETE` statements.
//!
//! Discovers a table's columns by building a dummy instance of the entity
//! and walking its serialized fields (`object-store-core`'s
//! [`Record::capture`] plays the dummy-walk role), rather than requiring a
//! separate schema description. One creator function per statement kind,
//! since Rust's enum-based [`SqlToken`] grammar already gives CREATE/SELECT/
//! INSERT/UPDATE/DELETE their own shape without needing per-kind structs.

use object_store_core::field::FieldValue;
use object_store_core::record::Record;
use object_store_types::ContainerKind;

use crate::builder::StatementBuilder;
use crate::error::SqlError;
use crate::token::{ColumnToken, Condition, SqlType, Statement};

/// Column name of the identity column every generated table declares.
pub const ID_COLUMN: &str = "id";

/// Maps one serialized [`FieldValue`] to its SQL column type.
///
/// Panics if given a [`FieldValue::Container`] — containers are never a
/// column on the owning entity's own table; see [`container_table_name`]
/// and [`create_container_table`].
fn sql_type_for(value: &FieldValue) -> SqlType {
    match value {
        FieldValue::Char(_)
        | FieldValue::Short(_)
        | FieldValue::Int(_)
        | FieldValue::UChar(_)
        | FieldValue::UShort(_)
        | FieldValue::UInt(_) => SqlType::Integer,
        FieldValue::Long(_) | FieldValue::ULong(_) => SqlType::BigInteger,
        FieldValue::Bool(_) => SqlType::Boolean,
        FieldValue::Float(_) => SqlType::Real,
        FieldValue::Double(_) => SqlType::Double,
        FieldValue::Bytes { len, .. } => SqlType::Char(*len),
        FieldValue::Varchar { max_len, .. } => SqlType::Varchar(*max_len),
        FieldValue::Text(_) => SqlType::Text,
        FieldValue::ObjectRef { prototype, .. } => SqlType::ForeignKey { table: prototype.clone() },
        FieldValue::Container { .. } => {
            unreachable!("container fields are realized as a join table, never an entity column")
        }
    }
}

/// The join-table name for one owner's container field: `<owner>_<field>`.
pub fn container_table_name(owner_type: &str, field: &str) -> String {
    format!("{owner_type}_{field}")
}

/// `CREATE TABLE <type> (id ..., <scalar/object-ref columns>...)`.
///
/// Enumerates `dummy`'s fields via [`Record::capture`] in serialization
/// order, marking the identity column `PRIMARY KEY NOT NULL` (with the
/// dialect's autoincrement spelling applied at render time). Container
/// fields are skipped here; call [`create_container_table`] once per
/// container field to create its join table.
pub fn create_table(type_name: &str, dummy: &Record) -> Result<Statement, SqlError> {
    let mut columns = vec![ColumnToken::Identifier { name: ID_COLUMN.to_string(), sql_type: SqlType::BigInteger }];
    for (name, value) in dummy.iter() {
        if let FieldValue::Container { .. } = value {
            continue;
        }
        columns.push(ColumnToken::Typed { name: name.to_string(), sql_type: sql_type_for(value) });
    }
    Ok(StatementBuilder::new().create(type_name).column_tokens(columns).build())
}

/// `CREATE TABLE <owner>_<field> (owner_id, item_id[, position])`.
///
/// List-kind containers get an explicit `position` column; set-kind
/// containers are unordered membership only.
pub fn create_container_table(owner_type: &str, field: &str, kind: ContainerKind) -> Statement {
    let mut columns = vec![
        ColumnToken::Typed { name: "owner_id".to_string(), sql_type: SqlType::BigInteger },
        ColumnToken::Typed { name: "item_id".to_string(), sql_type: SqlType::BigInteger },
    ];
    if kind == ContainerKind::List {
        columns.push(ColumnToken::Typed { name: "position".to_string(), sql_type: SqlType::Integer });
    }
    StatementBuilder::new().create(container_table_name(owner_type, field)).column_tokens(columns).build()
}

/// `SELECT id, <cols> FROM <type> [WHERE <condition>]`.
///
/// Column order is `id` followed by `dummy`'s serialization order, matching
/// [`create_table`] so result rows line up positionally with a reader built
/// over the same field list.
pub fn select(type_name: &str, dummy: &Record, condition: Option<Condition>) -> Statement {
    let mut names = vec![ID_COLUMN.to_string()];
    names.extend(dummy.iter().filter(|(_, v)| !matches!(v, FieldValue::Container { .. })).map(|(n, _)| n.to_string()));
    let mut builder = StatementBuilder::new().select().columns(names).from(type_name);
    if let Some(condition) = condition {
        builder = builder.where_cond(condition);
    }
    builder.build()
}

/// `INSERT INTO <type> (id, <cols>) VALUES (?, ...)`.
///
/// `identity` is bound as the leading value; placeholders for the remaining
/// columns follow `record`'s serialization order so the execution layer can
/// bind positionally via the same order used to capture `record`.
pub fn insert(type_name: &str, identity: u64, record: &Record) -> Statement {
    let mut names = vec![ID_COLUMN.to_string()];
    let mut values = vec![FieldValue::ULong(identity)];
    for (name, value) in record.iter() {
        if let FieldValue::Container { .. } = value {
            continue;
        }
        names.push(name.to_string());
        values.push(value.clone());
    }
    StatementBuilder::new().insert(type_name).columns(names).values(values).build()
}

/// `UPDATE <type> SET <col>=?, ... WHERE <condition>`.
///
/// The caller supplies `condition` (typically `id = ?` against the target
/// identity); this creator only owns the `SET` list.
pub fn update(type_name: &str, record: &Record, condition: Condition) -> Statement {
    let assignments = record
        .iter()
        .filter(|(_, v)| !matches!(v, FieldValue::Container { .. }))
        .map(|(name, value)| ColumnToken::Value { name: name.to_string(), value: value.clone() })
        .collect();
    StatementBuilder::new().update(type_name).set().column_tokens(assignments).where_cond(condition).build()
}

/// `DELETE FROM <type> WHERE <condition>`.
pub fn delete(type_name: &str, condition: Condition) -> Statement {
    StatementBuilder::new().remove().from(type_name).where_cond(condition).build()
}

/// `INSERT INTO <owner>_<field> (owner_id, item_id[, position]) VALUES (...)`,
/// one row per member, for realizing a container's contents on commit.
pub fn insert_container_rows(
    owner_type: &str,
    field: &str,
    kind: ContainerKind,
    owner_id: u64,
    items: &[u64],
) -> Vec<Statement> {
    items
        .iter()
        .enumerate()
        .map(|(position, &item_id)| {
            let mut names = vec!["owner_id".to_string(), "item_id".to_string()];
            let mut values = vec![FieldValue::ULong(owner_id), FieldValue::ULong(item_id)];
            if kind == ContainerKind::List {
                names.push("position".to_string());
                values.push(FieldValue::ULong(position as u64));
            }
            StatementBuilder::new().insert(container_table_name(owner_type, field)).columns(names).values(values).build()
        })
        .collect()
}

/// `DELETE FROM <owner>_<field> WHERE owner_id = ?`, clearing every row for
/// one owner before re-inserting its current membership (or permanently, on
/// cascade delete of the owner itself).
pub fn delete_container_rows(owner_type: &str, field: &str, owner_id: u64) -> Statement {
    delete(
        &container_table_name(owner_type, field),
        Condition::Compare { column: "owner_id".to_string(), op: crate::token::CompareOp::Eq, value: FieldValue::ULong(owner_id) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::compile;
    use crate::dialect::sqlite::SqliteDialect;
    use crate::render::render;
    use object_store_core::entity::test_support::Person;

    fn person_record() -> Record {
        Record::capture(&Person::new(0, "ada", 36)).unwrap()
    }

    #[test]
    fn create_table_marks_identity_primary_key() {
        let stmt = create_table("person", &person_record()).unwrap();
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "CREATE TABLE person (id BIGINT PRIMARY KEY NOT NULL AUTOINCREMENT, name VARCHAR(32), age INTEGER)");
    }

    #[test]
    fn insert_binds_identity_then_fields_in_order() {
        let stmt = insert("person", 1, &person_record());
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, binds) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "INSERT INTO person (id, name, age) VALUES (?, ?, ?)");
        assert_eq!(binds, vec![FieldValue::ULong(1), FieldValue::Varchar { value: "ada".into(), max_len: 32 }, FieldValue::Int(36)]);
    }

    #[test]
    fn select_includes_leading_id_column() {
        let stmt = select("person", &person_record(), None);
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id, name, age FROM person");
    }

    #[test]
    fn select_with_condition_appends_where() {
        let condition = Condition::Compare {
            column: "id".to_string(),
            op: crate::token::CompareOp::Eq,
            value: FieldValue::ULong(1),
        };
        let stmt = select("person", &person_record(), Some(condition));
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, binds) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id, name, age FROM person WHERE id = ?");
        assert_eq!(binds, vec![FieldValue::ULong(1)]);
    }

    #[test]
    fn update_sets_fields_and_applies_where() {
        let condition = Condition::Compare {
            column: "id".to_string(),
            op: crate::token::CompareOp::Eq,
            value: FieldValue::ULong(1),
        };
        let stmt = update("person", &person_record(), condition);
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, binds) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "UPDATE person SET name = ?, age = ? WHERE id = ?");
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn delete_emits_delete_from_with_where() {
        let condition = Condition::Compare {
            column: "id".to_string(),
            op: crate::token::CompareOp::Eq,
            value: FieldValue::ULong(1),
        };
        let stmt = delete("person", condition);
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "DELETE FROM person WHERE id = ?");
    }

    #[test]
    fn container_table_gets_position_column_only_for_list_kind() {
        let set_stmt = create_container_table("department", "employees", ContainerKind::Set);
        let mut dialect = SqliteDialect::new();
        let (sql, _) = render(&compile(set_stmt, &mut dialect).unwrap(), &dialect).unwrap();
        assert_eq!(sql, "CREATE TABLE department_employees (owner_id BIGINT, item_id BIGINT)");

        let list_stmt = create_container_table("department", "employees", ContainerKind::List);
        let (sql, _) = render(&compile(list_stmt, &mut dialect).unwrap(), &dialect).unwrap();
        assert_eq!(sql, "CREATE TABLE department_employees (owner_id BIGINT, item_id BIGINT, position INTEGER)");
    }

    #[test]
    fn container_rows_carry_position_only_for_list_kind() {
        let stmts = insert_container_rows("department", "employees", ContainerKind::List, 1, &[10, 20]);
        assert_eq!(stmts.len(), 2);
        let mut dialect = SqliteDialect::new();
        let (sql, binds) = render(&compile(stmts[1].clone(), &mut dialect).unwrap(), &dialect).unwrap();
        assert_eq!(sql, "INSERT INTO department_employees (owner_id, item_id, position) VALUES (?, ?, ?)");
        assert_eq!(binds, vec![FieldValue::ULong(1), FieldValue::ULong(20), FieldValue::ULong(1)]);
    }
}
