//! The neutral SQL token model: an ordered sequence of tagged variants that a
//! [`crate::dialect::Dialect`] rewrites and a [`crate::render::render`] pass
//! turns into literal text plus a positional bind list.

use object_store_core::field::FieldValue;

/// A portable SQL scalar type, mapped to its literal spelling per dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlType {
    /// `char`/`short`/`int`-class integers.
    Integer,
    /// `long`-class integers.
    BigInteger,
    /// `float`.
    Real,
    /// `double`.
    Double,
    /// `bool`, rendered `INTEGER` or a native boolean per dialect.
    Boolean,
    /// Fixed-width byte buffer, `CHAR(N)`.
    Char(usize),
    /// Bounded-length string, `VARCHAR(N)`.
    Varchar(usize),
    /// Unbounded string, `TEXT`.
    Text,
    /// Object pointer: a foreign key against `table`'s identity column.
    ForeignKey {
        /// The referenced table (prototype type name).
        table: String,
    },
}

/// One column-list entry. `Columns` tokens carry a list of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnToken {
    /// A bare column reference, e.g. in a `SELECT` list.
    Column {
        /// Column name.
        name: String,
    },
    /// A typed column in a `CREATE TABLE` definition.
    Typed {
        /// Column name.
        name: String,
        /// Declared SQL type.
        sql_type: SqlType,
    },
    /// The identity column: `PRIMARY KEY NOT NULL`.
    Identifier {
        /// Column name (`id` by convention).
        name: String,
        /// Declared SQL type of the identity itself.
        sql_type: SqlType,
    },
    /// A bounded-length string column in a `CREATE TABLE` definition.
    Varchar {
        /// Column name.
        name: String,
        /// Declared maximum length.
        max_len: usize,
    },
    /// A `column = value` assignment, used in `UPDATE ... SET` and in
    /// `INSERT`'s value list when paired positionally with its column.
    Value {
        /// Column name.
        name: String,
        /// Bound value.
        value: FieldValue,
    },
}

/// A comparison operator in a [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// The operator's literal spelling (dialect-invariant).
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A `WHERE` predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> ?`
    Compare {
        /// The compared column.
        column: String,
        /// The comparison operator.
        op: CompareOp,
        /// The bound comparison value.
        value: FieldValue,
    },
    /// `column IN (?, ?, …)`. An empty `values` list compiles to a
    /// constant-false predicate rather than invalid empty-paren SQL.
    In {
        /// The compared column.
        column: String,
        /// The bound membership set.
        values: Vec<FieldValue>,
    },
}

/// Ascending or descending sort order for an `ORDER BY` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

/// One tagged SQL token. A [`Statement`] is an ordered sequence of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlToken {
    /// `CREATE TABLE <table>`
    Create {
        /// Target table (prototype type name).
        table: String,
    },
    /// `DROP TABLE <table>`
    Drop {
        /// Target table.
        table: String,
    },
    /// `SELECT`
    Select,
    /// `DISTINCT`
    Distinct,
    /// `UPDATE <table>`
    Update {
        /// Target table.
        table: String,
    },
    /// `SET`
    Set,
    /// A column list: in `CREATE` the full typed schema, in `SELECT` the
    /// projected columns, in `INSERT`/`UPDATE` the assigned columns.
    Columns(Vec<ColumnToken>),
    /// `FROM <table>`
    From {
        /// Source table.
        table: String,
    },
    /// `WHERE`
    Where,
    /// A `WHERE` predicate.
    Condition(Condition),
    /// `ORDER BY <columns>`, each with its own sort direction.
    OrderBy(Vec<(String, SortDirection)>),
    /// `GROUP BY <columns>`
    GroupBy(Vec<String>),
    /// `INSERT INTO <table>`
    Insert {
        /// Target table.
        table: String,
    },
    /// `VALUES (…)`, paired positionally with the preceding `Columns` token.
    Values(Vec<FieldValue>),
    /// `DELETE FROM` (named `Remove` to match the token grammar's naming).
    Remove,
    /// A row cap. Rendered as a trailing `LIMIT n` unless a dialect splices
    /// it into a leading `TOP n` instead.
    Top(usize),
    /// `AS <alias>`
    As(String),
    /// `BEGIN TRANSACTION`
    Begin,
    /// `COMMIT TRANSACTION`
    Commit,
    /// `ROLLBACK TRANSACTION`
    Rollback,
    /// A parenthesized sub-statement, e.g. for a correlated subquery.
    Query(Vec<SqlToken>),
}

/// An ordered token list forming one statement, assembled by
/// [`crate::builder::StatementBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement(pub Vec<SqlToken>);

impl Statement {
    /// Wraps a pre-built token list.
    pub fn new(tokens: Vec<SqlToken>) -> Self {
        Self(tokens)
    }

    /// Borrows the token list.
    pub fn tokens(&self) -> &[SqlToken] {
        &self.0
    }
}
