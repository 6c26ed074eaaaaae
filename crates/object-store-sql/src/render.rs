//! Turns a compiled [`Statement`] into literal SQL text plus the positional
//! bind list the execution layer consumes alongside it.

use object_store_core::field::FieldValue;

use crate::dialect::Dialect;
use crate::error::SqlError;
use crate::token::{ColumnToken, Condition, SortDirection, SqlToken, Statement};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnsMode {
    /// No preceding context; render as a bare comma list of names.
    Plain,
    /// Immediately after `CREATE`: typed schema definition.
    Schema,
    /// Immediately after `SET`: `col = ?` assignments.
    Assign,
    /// Immediately after `INSERT INTO <table>`: a parenthesized column list.
    InsertList,
}

/// Quotes `name` through `dialect`. If the dialect leaves it unquoted (the
/// default), it must satisfy the unquoted-identifier grammar spec.md §4.5
/// requires: ASCII `[A-Za-z_][A-Za-z0-9_]*`.
fn quoted(dialect: &dyn Dialect, name: &str) -> Result<String, SqlError> {
    let rendered = dialect.quote_identifier(name);
    if rendered == name && !is_bare_identifier(name) {
        return Err(SqlError::InvalidIdentifier(name.to_string()));
    }
    Ok(rendered)
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_one(statement: &[SqlToken], dialect: &dyn Dialect, binds: &mut Vec<FieldValue>) -> Result<String, SqlError> {
    let mut sql = String::new();
    let mut mode = ColumnsMode::Plain;

    let push = |sql: &mut String, word: &str| {
        if !sql.is_empty() {
            sql.push(' ');
        }
        sql.push_str(word);
    };

    for (i, token) in statement.iter().enumerate() {
        match token {
            SqlToken::Create { table } => {
                push(&mut sql, &format!("CREATE TABLE {}", quoted(dialect, table)?));
                mode = ColumnsMode::Schema;
            }
            SqlToken::Drop { table } => {
                push(&mut sql, &format!("DROP TABLE {}", quoted(dialect, table)?));
            }
            SqlToken::Select => {
                push(&mut sql, "SELECT");
                mode = ColumnsMode::Plain;
            }
            SqlToken::Distinct => push(&mut sql, "DISTINCT"),
            SqlToken::Update { table } => {
                push(&mut sql, &format!("UPDATE {}", quoted(dialect, table)?));
            }
            SqlToken::Set => {
                push(&mut sql, "SET");
                mode = ColumnsMode::Assign;
            }
            SqlToken::Columns(columns) => {
                let rendered = render_columns(columns, mode, dialect, binds)?;
                push(&mut sql, &rendered);
            }
            SqlToken::From { table } => push(&mut sql, &format!("FROM {}", quoted(dialect, table)?)),
            SqlToken::Where => push(&mut sql, "WHERE"),
            SqlToken::Condition(condition) => push(&mut sql, &render_condition(condition, dialect, binds)?),
            SqlToken::OrderBy(columns) => push(&mut sql, &render_order_by(columns, dialect)?),
            SqlToken::GroupBy(columns) => {
                let mut parts = Vec::with_capacity(columns.len());
                for c in columns {
                    parts.push(quoted(dialect, c)?);
                }
                push(&mut sql, &format!("GROUP BY {}", parts.join(", ")));
            }
            SqlToken::Insert { table } => {
                push(&mut sql, &format!("INSERT INTO {}", quoted(dialect, table)?));
                mode = ColumnsMode::InsertList;
            }
            SqlToken::Values(values) => {
                let placeholders = values
                    .iter()
                    .map(|v| {
                        let ph = dialect.placeholder(binds.len());
                        binds.push(v.clone());
                        ph
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                push(&mut sql, &format!("VALUES ({placeholders})"));
            }
            SqlToken::Remove => push(&mut sql, "DELETE"),
            SqlToken::Top(n) => {
                let splice = i > 0 && matches!(statement[i - 1], SqlToken::Select | SqlToken::Distinct);
                if splice {
                    push(&mut sql, &format!("TOP {n}"));
                } else {
                    push(&mut sql, &format!("LIMIT {n}"));
                }
            }
            SqlToken::As(alias) => push(&mut sql, &format!("AS {alias}")),
            SqlToken::Begin => push(&mut sql, "BEGIN"),
            SqlToken::Commit => push(&mut sql, "COMMIT"),
            SqlToken::Rollback => push(&mut sql, "ROLLBACK"),
            SqlToken::Query(inner) => {
                let nested = render_one(inner, dialect, binds)?;
                push(&mut sql, &format!("({nested})"));
            }
        }
    }

    Ok(sql)
}

fn render_columns(
    columns: &[ColumnToken],
    mode: ColumnsMode,
    dialect: &dyn Dialect,
    binds: &mut Vec<FieldValue>,
) -> Result<String, SqlError> {
    match mode {
        ColumnsMode::Schema => {
            let mut parts = Vec::with_capacity(columns.len());
            for column in columns {
                parts.push(render_schema_column(column, dialect)?);
            }
            Ok(format!("({})", parts.join(", ")))
        }
        ColumnsMode::Assign => {
            let mut parts = Vec::with_capacity(columns.len());
            for column in columns {
                match column {
                    ColumnToken::Value { name, value } => {
                        let ph = dialect.placeholder(binds.len());
                        binds.push(value.clone());
                        parts.push(format!("{} = {ph}", quoted(dialect, name)?));
                    }
                    other => {
                        return Err(SqlError::Malformed(format!(
                            "expected value-column in SET list, found {other:?}"
                        )))
                    }
                }
            }
            Ok(parts.join(", "))
        }
        ColumnsMode::Plain => {
            let mut names = Vec::with_capacity(columns.len());
            for c in columns {
                names.push(quoted(dialect, column_name(c))?);
            }
            Ok(names.join(", "))
        }
        ColumnsMode::InsertList => {
            let mut names = Vec::with_capacity(columns.len());
            for c in columns {
                names.push(quoted(dialect, column_name(c))?);
            }
            Ok(format!("({})", names.join(", ")))
        }
    }
}

fn column_name(column: &ColumnToken) -> &str {
    match column {
        ColumnToken::Column { name }
        | ColumnToken::Typed { name, .. }
        | ColumnToken::Identifier { name, .. }
        | ColumnToken::Varchar { name, .. }
        | ColumnToken::Value { name, .. } => name,
    }
}

fn render_schema_column(column: &ColumnToken, dialect: &dyn Dialect) -> Result<String, SqlError> {
    Ok(match column {
        ColumnToken::Identifier { name, sql_type } => {
            let autoincrement = dialect.autoincrement_clause();
            let suffix = if autoincrement.is_empty() { String::new() } else { format!(" {autoincrement}") };
            format!(
                "{} {} PRIMARY KEY NOT NULL{suffix}",
                quoted(dialect, name)?,
                dialect.sql_type_name(sql_type)
            )
        }
        ColumnToken::Typed { name, sql_type } => {
            format!("{} {}", quoted(dialect, name)?, dialect.sql_type_name(sql_type))
        }
        ColumnToken::Varchar { name, max_len } => {
            format!("{} VARCHAR({max_len})", quoted(dialect, name)?)
        }
        ColumnToken::Column { name } => quoted(dialect, name)?,
        ColumnToken::Value { name, .. } => {
            return Err(SqlError::Malformed(format!("value-column {name} has no place in a schema definition")))
        }
    })
}

fn render_condition(condition: &Condition, dialect: &dyn Dialect, binds: &mut Vec<FieldValue>) -> Result<String, SqlError> {
    Ok(match condition {
        Condition::Compare { column, op, value } => {
            let ph = dialect.placeholder(binds.len());
            binds.push(value.clone());
            format!("{} {} {ph}", quoted(dialect, column)?, op.as_sql())
        }
        Condition::In { column, values } => {
            if values.is_empty() {
                "0=1".to_string()
            } else {
                let placeholders = values
                    .iter()
                    .map(|v| {
                        let ph = dialect.placeholder(binds.len());
                        binds.push(v.clone());
                        ph
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} IN ({placeholders})", quoted(dialect, column)?)
            }
        }
    })
}

fn render_order_by(columns: &[(String, SortDirection)], dialect: &dyn Dialect) -> Result<String, SqlError> {
    let mut parts = Vec::with_capacity(columns.len());
    for (name, dir) in columns {
        let dir = match dir {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        parts.push(format!("{} {dir}", quoted(dialect, name)?));
    }
    Ok(format!("ORDER BY {}", parts.join(", ")))
}

/// Renders a compiled statement to `(sql_text, positional_binds)`.
pub fn render(statement: &Statement, dialect: &dyn Dialect) -> Result<(String, Vec<FieldValue>), SqlError> {
    let mut binds = Vec::new();
    let sql = render_one(statement.tokens(), dialect, &mut binds)?;
    Ok((sql, binds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StatementBuilder;
    use crate::dialect::compile;
    use crate::dialect::mssql::MssqlDialect;
    use crate::dialect::sqlite::SqliteDialect;

    #[test]
    fn select_with_where_renders_positional_placeholder() {
        let stmt = StatementBuilder::new()
            .select()
            .columns(["id", "name"])
            .from("person")
            .where_eq("id", FieldValue::Int(1))
            .build();
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, binds) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id, name FROM person WHERE id = ?");
        assert_eq!(binds, vec![FieldValue::Int(1)]);
    }

    #[test]
    fn empty_in_predicate_compiles_to_constant_false() {
        let stmt = StatementBuilder::new()
            .select()
            .columns(["id"])
            .from("person")
            .where_cond(Condition::In { column: "id".to_string(), values: vec![] })
            .build();
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, binds) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id FROM person WHERE 0=1");
        assert!(binds.is_empty());
    }

    #[test]
    fn non_ascii_identifier_rejected_by_an_unquoting_dialect() {
        let stmt = StatementBuilder::new().select().columns(["id"]).from("2illegal-name").build();
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let err = render(&compiled, &dialect).unwrap_err();
        assert_eq!(err, SqlError::InvalidIdentifier("2illegal-name".to_string()));
    }

    #[test]
    fn non_ascii_identifier_accepted_by_a_bracket_quoting_dialect() {
        let stmt = StatementBuilder::new().select().columns(["id"]).from("2illegal-name").build();
        let mut dialect = MssqlDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id FROM [2illegal-name]");
    }
}
