//! The dialect compiler: a visitor that rewrites a token list per backend,
//! then hands it to [`crate::render::render`] for literal text.
//!
//! A concrete dialect overrides only the `visit_*` leaves it cares about; the
//! default is a no-op, so a fresh dialect starts out passing every token
//! through unchanged.

use tracing::trace;

use crate::error::SqlError;
use crate::token::{SqlToken, SqlType, Statement};

pub mod mssql;
pub mod sqlite;

/// A positional view into the token list being compiled, handed to each
/// `visit_*` call. Supports the three edits a dialect needs: insert ahead of
/// the current token, replace it, or delete it. [`Cursor::tokens_mut`] gives
/// full access to the list for edits elsewhere (e.g. splicing a token near
/// the front while visiting one near the back).
pub struct Cursor<'a> {
    tokens: &'a mut Vec<SqlToken>,
    position: usize,
    deleted: bool,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a mut Vec<SqlToken>, position: usize) -> Self {
        Self { tokens, position, deleted: false }
    }

    /// The token currently being visited.
    pub fn current(&self) -> &SqlToken {
        &self.tokens[self.position]
    }

    /// Inserts `token` immediately before the current token, then keeps the
    /// cursor pointing at the (now shifted) current token.
    pub fn insert_before(&mut self, token: SqlToken) {
        self.tokens.insert(self.position, token);
        self.position += 1;
    }

    /// Replaces the current token in place.
    pub fn replace(&mut self, token: SqlToken) {
        self.tokens[self.position] = token;
    }

    /// Removes the current token. The token that slides into this position
    /// (if any) is visited next.
    pub fn delete(&mut self) {
        self.tokens.remove(self.position);
        self.deleted = true;
    }

    /// Read-only view of the full token list.
    pub fn tokens(&self) -> &[SqlToken] {
        self.tokens
    }

    /// Mutable view of the full token list, for edits away from the current
    /// position.
    pub fn tokens_mut(&mut self) -> &mut Vec<SqlToken> {
        self.tokens
    }

    /// The current position.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// A token-rewriting strategy specializing the neutral token stream for one
/// backend's SQL surface.
pub trait Dialect {
    /// A short name for diagnostics (`sqlite`, `mssql`, …).
    fn name(&self) -> &str;

    /// Called once before the first token is visited.
    fn on_compile_start(&mut self, _cursor_tokens: &mut Vec<SqlToken>) {}

    /// Called once after the last token is visited.
    fn on_compile_finish(&mut self, _cursor_tokens: &mut Vec<SqlToken>) {}

    /// Visit a `CREATE` token.
    fn visit_create(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `DROP` token.
    fn visit_drop(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `SELECT` token.
    fn visit_select(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `DISTINCT` token.
    fn visit_distinct(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit an `UPDATE` token.
    fn visit_update(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `SET` token.
    fn visit_set(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Columns` token.
    fn visit_columns(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `FROM` token.
    fn visit_from(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `WHERE` token.
    fn visit_where(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Condition` token.
    fn visit_condition(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit an `OrderBy` token.
    fn visit_order_by(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `GroupBy` token.
    fn visit_group_by(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit an `INSERT` token.
    fn visit_insert(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Values` token.
    fn visit_values(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Remove` token.
    fn visit_remove(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Top` token. The default leaves it in place, to be rendered
    /// as a trailing `LIMIT`; a dialect that prefers a leading `TOP n`
    /// overrides this to splice it near the `SELECT` token instead.
    fn visit_top(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit an `As` token.
    fn visit_as(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Begin` token.
    fn visit_begin(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Commit` token.
    fn visit_commit(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Rollback` token.
    fn visit_rollback(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }
    /// Visit a `Query` (sub-statement) token.
    fn visit_query(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
        Ok(())
    }

    /// The positional bind placeholder for the `index`-th (0-based) value
    /// token.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Quotes an identifier if the dialect requires it; unquoted identifiers
    /// must already satisfy `[A-Za-z_][A-Za-z0-9_]*`.
    fn quote_identifier(&self, identifier: &str) -> String {
        identifier.to_string()
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> String {
        if value {
            "1".to_string()
        } else {
            "0".to_string()
        }
    }

    /// The literal spelling of a [`SqlType`].
    fn sql_type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInteger => "BIGINT".to_string(),
            SqlType::Real => "REAL".to_string(),
            SqlType::Double => "REAL".to_string(),
            SqlType::Boolean => "INTEGER".to_string(),
            SqlType::Char(n) => format!("CHAR({n})"),
            SqlType::Varchar(n) => format!("VARCHAR({n})"),
            SqlType::Text => "TEXT".to_string(),
            SqlType::ForeignKey { .. } => "INTEGER".to_string(),
        }
    }

    /// The spelling used for an auto-incrementing identity column, appended
    /// after its `PRIMARY KEY NOT NULL` clause (empty string if the dialect
    /// has no such keyword).
    fn autoincrement_clause(&self) -> &str {
        ""
    }
}

/// Runs `dialect`'s compile pass over `statement`, returning the rewritten
/// token list.
pub fn compile(statement: Statement, dialect: &mut dyn Dialect) -> Result<Statement, SqlError> {
    let mut tokens = statement.0;
    dialect.on_compile_start(&mut tokens);

    let mut position = 0;
    while position < tokens.len() {
        let mut cursor = Cursor::new(&mut tokens, position);
        let kind = cursor.current().clone();
        trace!(dialect = dialect.name(), position, "visiting token");
        match kind {
            SqlToken::Create { .. } => dialect.visit_create(&mut cursor)?,
            SqlToken::Drop { .. } => dialect.visit_drop(&mut cursor)?,
            SqlToken::Select => dialect.visit_select(&mut cursor)?,
            SqlToken::Distinct => dialect.visit_distinct(&mut cursor)?,
            SqlToken::Update { .. } => dialect.visit_update(&mut cursor)?,
            SqlToken::Set => dialect.visit_set(&mut cursor)?,
            SqlToken::Columns(_) => dialect.visit_columns(&mut cursor)?,
            SqlToken::From { .. } => dialect.visit_from(&mut cursor)?,
            SqlToken::Where => dialect.visit_where(&mut cursor)?,
            SqlToken::Condition(_) => dialect.visit_condition(&mut cursor)?,
            SqlToken::OrderBy(_) => dialect.visit_order_by(&mut cursor)?,
            SqlToken::GroupBy(_) => dialect.visit_group_by(&mut cursor)?,
            SqlToken::Insert { .. } => dialect.visit_insert(&mut cursor)?,
            SqlToken::Values(_) => dialect.visit_values(&mut cursor)?,
            SqlToken::Remove => dialect.visit_remove(&mut cursor)?,
            SqlToken::Top(_) => dialect.visit_top(&mut cursor)?,
            SqlToken::As(_) => dialect.visit_as(&mut cursor)?,
            SqlToken::Begin => dialect.visit_begin(&mut cursor)?,
            SqlToken::Commit => dialect.visit_commit(&mut cursor)?,
            SqlToken::Rollback => dialect.visit_rollback(&mut cursor)?,
            SqlToken::Query(_) => dialect.visit_query(&mut cursor)?,
        }
        position = if cursor.deleted { cursor.position } else { cursor.position + 1 };
    }

    dialect.on_compile_finish(&mut tokens);
    Ok(Statement::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StatementBuilder;

    /// A dialect that rejects correlated subqueries outright, to exercise
    /// the `unsupported_token` failure mode a real backend (e.g. one
    /// targeting an engine with no subquery support) would hit.
    #[derive(Debug, Default)]
    struct NoSubqueryDialect;

    impl Dialect for NoSubqueryDialect {
        fn name(&self) -> &str {
            "no-subquery"
        }

        fn visit_query(&mut self, _cursor: &mut Cursor) -> Result<(), SqlError> {
            Err(SqlError::UnsupportedToken { dialect: self.name().to_string(), token: "QUERY".to_string() })
        }
    }

    #[test]
    fn dialect_rejecting_a_token_surfaces_unsupported_token() {
        let stmt = StatementBuilder::new()
            .select()
            .columns(["id"])
            .from("t")
            .where_cond(crate::token::Condition::Compare {
                column: "id".to_string(),
                op: crate::token::CompareOp::Eq,
                value: object_store_core::field::FieldValue::Int(1),
            })
            .build();
        // Wrap the condition's value in a sub-statement to produce a Query token.
        let mut tokens = stmt.0;
        tokens.push(SqlToken::Query(vec![SqlToken::Select]));
        let stmt = Statement::new(tokens);

        let mut dialect = NoSubqueryDialect;
        let err = compile(stmt, &mut dialect).unwrap_err();
        assert_eq!(
            err,
            SqlError::UnsupportedToken { dialect: "no-subquery".to_string(), token: "QUERY".to_string() }
        );
    }
}
