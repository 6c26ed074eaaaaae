#![forbid(unsafe_code)]

//! **object-store-backend** – The abstract backend surface the transaction
//! journal executes against.
//!
//! This crate specifies the contract: open/close, execute a
//! non-parameterized statement, prepare/bind/step/finalize a parameterized
//! one, and vendor-specific transaction control. Concrete vendor drivers are
//! out of scope beyond the `test-support` fake used to exercise
//! the contract itself.

pub mod backend;
pub mod error;
pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

/// Common imports for crates that drive a backend.
pub mod prelude {
    pub use crate::backend::{Backend, CollectingSink, PreparedStatement, ResultSink, Step};
    pub use crate::error::DriverError;
    pub use crate::registry::{DriverFactory, DriverRegistry};
}
