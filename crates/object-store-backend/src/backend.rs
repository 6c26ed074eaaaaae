//! The abstract backend surface: the sole external
//! collaborator the transaction journal directly invokes.
//!
//! A backend is expected to be synchronous and single-threaded per
//! connection — there is no `async_trait` here, deliberately; the core
//! object store this crate backs is itself single-threaded.

use object_store_core::field::FieldValue;

use crate::error::DriverError;

/// Receives rows pushed by [`Backend::execute`], as ordered column values.
pub trait ResultSink {
    /// Appends one row of ordered column values.
    fn push_row(&mut self, row: Vec<String>);
}

/// A [`ResultSink`] that simply collects every row it is handed.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    /// Rows collected so far, in arrival order.
    pub rows: Vec<Vec<String>>,
}

impl ResultSink for CollectingSink {
    fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// The outcome of one [`PreparedStatement::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A row is available.
    Row(Vec<String>),
    /// The statement has no more rows to produce (for a non-`SELECT`
    /// statement, this is the only outcome `step` ever returns).
    Done,
}

/// A prepared statement: bind parameters positionally, step through
/// results, and finalize exactly once.
///
/// Scoped resource: a matching [`PreparedStatement::finalize`] must occur on
/// every exit path (success, failure, abandonment).
pub trait PreparedStatement {
    /// Binds a positional parameter (0-based).
    fn bind(&mut self, index: usize, value: &FieldValue) -> Result<(), DriverError>;

    /// Advances the statement, yielding the next row or [`Step::Done`].
    fn step(&mut self) -> Result<Step, DriverError>;

    /// Resets the statement so it can be stepped again with fresh binds,
    /// without re-preparing the SQL text.
    fn reset(&mut self) -> Result<(), DriverError>;

    /// Releases the statement. Consumes `self` so a finalized statement
    /// cannot be stepped or bound again.
    fn finalize(self: Box<Self>) -> Result<(), DriverError>;
}

/// The abstract connect/prepare/execute surface a concrete driver
/// implements.
pub trait Backend {
    /// Opens a connection to `uri`. Idempotent on double-open.
    fn open(&mut self, uri: &str) -> Result<(), DriverError>;

    /// Closes the connection. A no-op on double-close.
    fn close(&mut self) -> Result<(), DriverError>;

    /// Runs a non-parameterized statement, pushing rows into `sink`.
    fn execute(&mut self, sql: &str, sink: &mut dyn ResultSink) -> Result<(), DriverError>;

    /// Prepares `sql`, returning a handle bindable with positional
    /// parameters.
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn PreparedStatement>, DriverError>;

    /// Issues the vendor's `BEGIN TRANSACTION` equivalent.
    fn begin(&mut self) -> Result<(), DriverError>;

    /// Issues the vendor's `COMMIT TRANSACTION` equivalent.
    fn commit(&mut self) -> Result<(), DriverError>;

    /// Issues the vendor's `ROLLBACK TRANSACTION` equivalent.
    fn rollback(&mut self) -> Result<(), DriverError>;
}
