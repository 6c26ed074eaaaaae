//! A dialect matching SQLite's SQL surface: trailing `LIMIT`, `?` bind
//! markers, unquoted identifiers, and `AUTOINCREMENT` on the identity
//! column.

use crate::dialect::Dialect;

/// SQLite-flavored rendering. Row caps stay as trailing `LIMIT n` (the
/// default `Top` behavior needs no override), so this dialect only
/// customizes naming and the identity column's autoincrement clause.
#[derive(Debug, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a SQLite dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn autoincrement_clause(&self) -> &str {
        "AUTOINCREMENT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StatementBuilder;
    use crate::dialect::compile;
    use crate::render::render;

    #[test]
    fn limit_stays_trailing() {
        let stmt = StatementBuilder::new().select().columns(["id"]).from("t").top(10).build();
        let mut dialect = SqliteDialect::new();
        let compiled = compile(stmt, &mut dialect).unwrap();
        let (sql, _) = render(&compiled, &dialect).unwrap();
        assert_eq!(sql, "SELECT id FROM t LIMIT 10");
    }
}
