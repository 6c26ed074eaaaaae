//! The transaction journal: a reversible action log.

use chrono::{DateTime, Utc};
use object_store_types::{Identity, TransactionId};
use uuid::Uuid;

use crate::action::Action;

/// Lifecycle state of one [`Journal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalState {
    /// No transaction is open.
    Idle,
    /// A transaction is open and accepting actions.
    Active,
    /// The transaction committed; terminal.
    Committed,
    /// The transaction rolled back; terminal.
    RolledBack,
}

/// A single, flat (non-nestable) transaction: an append-only action log
/// plus the metadata needed to report it.
#[derive(Debug, Clone)]
pub struct Journal {
    id: TransactionId,
    begun_at: DateTime<Utc>,
    identity_high_water_mark: Identity,
    state: JournalState,
    actions: Vec<Action>,
}

impl Journal {
    /// Opens a new, active journal. `identity_high_water_mark` is the
    /// identity allocator's value at the moment of `begin`, recorded for
    /// diagnostics.
    pub fn begin(identity_high_water_mark: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            begun_at: Utc::now(),
            identity_high_water_mark,
            state: JournalState::Active,
            actions: Vec::new(),
        }
    }

    /// This transaction's id.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// The wall-clock time `begin` was called.
    pub fn begun_at(&self) -> DateTime<Utc> {
        self.begun_at
    }

    /// The identity allocator's high-water mark at `begin`.
    pub fn identity_high_water_mark(&self) -> Identity {
        self.identity_high_water_mark
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JournalState {
        self.state
    }

    /// Appends an action. Only valid while [`JournalState::Active`].
    pub fn record(&mut self, action: Action) {
        debug_assert_eq!(self.state, JournalState::Active, "actions are append-only while active");
        self.actions.push(action);
    }

    /// Actions recorded so far, in append order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Marks this journal committed (terminal).
    pub(crate) fn mark_committed(&mut self) {
        self.state = JournalState::Committed;
    }

    /// Marks this journal rolled back (terminal).
    pub(crate) fn mark_rolled_back(&mut self) {
        self.state = JournalState::RolledBack;
    }
}

/// Dispatch target for transaction lifecycle events.
///
/// `on_commit`'s default walks `actions` in append order and dispatches to
/// the three `visit_*` leaves, combining transaction-lifecycle and
/// per-action-kind dispatch into one trait. A concrete observer only needs
/// to override the leaves it cares about.
pub trait Observer {
    /// Called when a transaction begins.
    fn on_begin(&mut self) {}

    /// Called once per transaction, with the complete, ordered action list,
    /// when `commit` is requested. The default dispatches each action to
    /// `visit_insert`/`visit_update`/`visit_delete` in order, stopping at
    /// the first failure.
    fn on_commit(&mut self, actions: &[Action]) -> anyhow::Result<()> {
        for action in actions {
            match action {
                Action::Insert { .. } => self.visit_insert(action)?,
                Action::Update { .. } => self.visit_update(action)?,
                Action::Delete { .. } => self.visit_delete(action)?,
            }
        }
        Ok(())
    }

    /// Called once after a transaction is rolled back (either by explicit
    /// request or because `on_commit` failed).
    fn on_rollback(&mut self) {}

    /// Project one `Insert` action.
    fn visit_insert(&mut self, action: &Action) -> anyhow::Result<()> {
        let _ = action;
        Ok(())
    }

    /// Project one `Update` action.
    fn visit_update(&mut self, action: &Action) -> anyhow::Result<()> {
        let _ = action;
        Ok(())
    }

    /// Project one `Delete` action.
    fn visit_delete(&mut self, action: &Action) -> anyhow::Result<()> {
        let _ = action;
        Ok(())
    }
}

/// An observer that does nothing; useful where a store is mutated without a
/// backend binding (tests, scratch sessions).
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
