//! A dialect matching SQL Server's surface: a leading `TOP n` spliced into
//! the select list, bracket-quoted identifiers, and `BIT`/`NVARCHAR` typing.

use crate::dialect::{Cursor, Dialect};
use crate::error::SqlError;
use crate::token::{SqlToken, SqlType};

/// T-SQL-flavored rendering. `Top` tokens are relocated from their default
/// trailing position to immediately after `SELECT`/`DISTINCT`, matching
/// `SELECT TOP n ...` rather than a trailing `LIMIT n`.
#[derive(Debug, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Creates an MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn visit_top(&mut self, cursor: &mut Cursor) -> Result<(), SqlError> {
        let n = match cursor.current() {
            SqlToken::Top(n) => *n,
            other => return Err(SqlError::Malformed(format!("visit_top saw {other:?}"))),
        };
        cursor.delete();
        let select_index = cursor
            .tokens()
            .iter()
            .position(|t| matches!(t, SqlToken::Select))
            .ok_or_else(|| SqlError::Malformed("TOP requires a preceding SELECT".to_string()))?;
        cursor.tokens_mut().insert(select_index + 1, SqlToken::Top(n));
        Ok(())
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        format!("[{identifier}]")
    }

    fn sql_type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean => "BIT".to_string(),
            SqlType::Varchar(n) => format!("NVARCHAR({n})"),
            SqlType::Text => "NVARCHAR(MAX)".to_string(),
            other => Dialect::sql_type_name(&PlainDefaults, other),
        }
    }

    fn autoincrement_clause(&self) -> &str {
        "IDENTITY(1,1)"
    }
}

/// Reuses [`Dialect`]'s default type-name mapping for the variants
/// [`MssqlDialect`] doesn't override.
struct PlainDefaults;
impl Dialect for PlainDefaults {
    fn name(&self) -> &str {
        "defaults"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StatementBuilder;
    use crate::dialect::compile;
    use crate::render::render;

    #[test]
    fn top_is_spliced_after_select() {
        let stmt = StatementBuilder::new().select().columns(["id"]).from("t").top(10).build();
        let mut dialect = MssqlDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT TOP 10 id FROM t");
    }
}
