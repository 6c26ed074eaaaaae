#![forbid(unsafe_code)]

//! **object-store-session** – Glue: wires the transaction journal's commit
//! observer (`object-store-core`) to the statement creator and dialect
//! compiler (`object-store-sql`) and a concrete backend connection
//! (`object-store-backend`), and owns the session-level configuration.
//!
//! This crate has no opinions of its own about storage, SQL, or the wire
//! protocol — it only assembles the three lower crates into one
//! begin/insert/update/remove/commit/rollback façade.

pub mod config;
pub mod error;
pub mod observer;
pub mod schema;
pub mod session;

/// Common imports for a host embedding an `object-store-session`.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{ConfigError, SessionError};
    pub use crate::session::Session;
}
