//! A token-stream SQL builder, per-backend dialect compiler, and statement
//! creator that projects managed-entity shapes into CREATE/SELECT/INSERT/
//! UPDATE/DELETE.
//!
//! This crate has no knowledge of any concrete backend connection; it turns
//! a neutral [`token::Statement`] into literal SQL text plus a positional
//! bind list. `object-store-backend` is what actually executes the result.

pub mod builder;
pub mod creator;
pub mod dialect;
pub mod error;
pub mod render;
pub mod token;

/// Common imports for crates that build statements against this engine.
pub mod prelude {
    pub use crate::builder::StatementBuilder;
    pub use crate::dialect::{compile, Cursor, Dialect};
    pub use crate::dialect::mssql::MssqlDialect;
    pub use crate::dialect::sqlite::SqliteDialect;
    pub use crate::error::SqlError;
    pub use crate::render::render;
    pub use crate::token::{ColumnToken, CompareOp, Condition, SortDirection, SqlToken, SqlType, Statement};
}
