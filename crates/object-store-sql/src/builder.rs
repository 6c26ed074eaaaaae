//! A fluent composer for [`Statement`]s, mirroring the shapes the statement
//! creator emits (`CREATE`/`SELECT`/`INSERT`/`UPDATE`/`DELETE`) but usable
//! directly for hand-built queries and tests.

use object_store_core::field::FieldValue;

use crate::token::{ColumnToken, Condition, SortDirection, SqlToken, Statement};

/// Builds a [`Statement`] token by token.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    tokens: Vec<SqlToken>,
}

impl StatementBuilder {
    /// Starts an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// `SELECT`
    pub fn select(mut self) -> Self {
        self.tokens.push(SqlToken::Select);
        self
    }

    /// `DISTINCT`
    pub fn distinct(mut self) -> Self {
        self.tokens.push(SqlToken::Distinct);
        self
    }

    /// A plain column list, e.g. for `SELECT col1, col2`.
    pub fn columns(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let cols = names.into_iter().map(|name| ColumnToken::Column { name: name.into() }).collect();
        self.tokens.push(SqlToken::Columns(cols));
        self
    }

    /// An arbitrary column-token list, e.g. for `CREATE TABLE`'s typed schema.
    pub fn column_tokens(mut self, columns: Vec<ColumnToken>) -> Self {
        self.tokens.push(SqlToken::Columns(columns));
        self
    }

    /// `FROM <table>`
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.tokens.push(SqlToken::From { table: table.into() });
        self
    }

    /// `WHERE <condition>`
    pub fn where_cond(mut self, condition: Condition) -> Self {
        self.tokens.push(SqlToken::Where);
        self.tokens.push(SqlToken::Condition(condition));
        self
    }

    /// `WHERE column = value`, the common case.
    pub fn where_eq(self, column: impl Into<String>, value: FieldValue) -> Self {
        self.where_cond(Condition::Compare {
            column: column.into(),
            op: crate::token::CompareOp::Eq,
            value,
        })
    }

    /// `ORDER BY`
    pub fn order_by(mut self, columns: Vec<(String, SortDirection)>) -> Self {
        self.tokens.push(SqlToken::OrderBy(columns));
        self
    }

    /// `GROUP BY`
    pub fn group_by(mut self, columns: Vec<String>) -> Self {
        self.tokens.push(SqlToken::GroupBy(columns));
        self
    }

    /// A row cap, placed at the tail; a dialect may splice it elsewhere
    /// during compilation.
    pub fn top(mut self, n: usize) -> Self {
        self.tokens.push(SqlToken::Top(n));
        self
    }

    /// `CREATE TABLE <table>`, followed by `column_tokens`'s typed schema.
    pub fn create(mut self, table: impl Into<String>) -> Self {
        self.tokens.push(SqlToken::Create { table: table.into() });
        self
    }

    /// `DROP TABLE <table>`
    pub fn drop_table(mut self, table: impl Into<String>) -> Self {
        self.tokens.push(SqlToken::Drop { table: table.into() });
        self
    }

    /// `INSERT INTO <table>`
    pub fn insert(mut self, table: impl Into<String>) -> Self {
        self.tokens.push(SqlToken::Insert { table: table.into() });
        self
    }

    /// `VALUES (…)`
    pub fn values(mut self, values: Vec<FieldValue>) -> Self {
        self.tokens.push(SqlToken::Values(values));
        self
    }

    /// `UPDATE <table>`
    pub fn update(mut self, table: impl Into<String>) -> Self {
        self.tokens.push(SqlToken::Update { table: table.into() });
        self
    }

    /// `SET`
    pub fn set(mut self) -> Self {
        self.tokens.push(SqlToken::Set);
        self
    }

    /// `DELETE FROM` (the `REMOVE` grammar token).
    pub fn remove(mut self) -> Self {
        self.tokens.push(SqlToken::Remove);
        self
    }

    /// Appends a raw token, for constructs the fluent surface doesn't cover.
    pub fn push(mut self, token: SqlToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Finishes the statement.
    pub fn build(self) -> Statement {
        Statement::new(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store_core::field::FieldValue;

    #[test]
    fn select_with_where_builds_expected_tokens() {
        let stmt = StatementBuilder::new()
            .select()
            .columns(["id", "name"])
            .from("person")
            .where_eq("id", FieldValue::Int(1))
            .build();

        assert_eq!(stmt.tokens().len(), 5);
        assert_eq!(stmt.tokens()[0], SqlToken::Select);
        assert!(matches!(stmt.tokens()[4], SqlToken::Condition(_)));
    }
}
