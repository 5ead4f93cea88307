//! The always-current, in-memory view of every stored expense.

use std::{
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::mpsc;

use crate::Expense;

/// An immutable list of every stored expense at one point in time, newest first.
///
/// Snapshots are cheap to clone and dereference to a slice of expenses, so
/// they can be passed straight to the functions in [query](crate::query).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    version: u64,
    expenses: Arc<[Expense]>,
}

impl Snapshot {
    fn new(version: u64, expenses: Vec<Expense>) -> Self {
        Self {
            version,
            expenses: expenses.into(),
        }
    }

    /// The number of snapshots published before this one.
    ///
    /// The snapshot loaded at startup has version 0.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The expenses in this snapshot.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }
}

impl Deref for Snapshot {
    type Target = [Expense];

    fn deref(&self) -> &Self::Target {
        &self.expenses
    }
}

/// Holds the latest snapshot of the store and pushes every new snapshot to
/// its subscribers.
///
/// Only committed writes are published, so the read model never shows a
/// write that is still pending or that failed.
#[derive(Debug)]
pub struct ReadModel {
    state: Mutex<ReadModelState>,
}

#[derive(Debug)]
struct ReadModelState {
    current: Snapshot,
    subscribers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl ReadModel {
    /// Create a read model whose first snapshot holds `initial`.
    pub(crate) fn new(initial: Vec<Expense>) -> Self {
        Self {
            state: Mutex::new(ReadModelState {
                current: Snapshot::new(0, initial),
                subscribers: Vec::new(),
            }),
        }
    }

    /// The latest snapshot.
    pub fn current(&self) -> Snapshot {
        self.lock().current.clone()
    }

    /// Subscribe to snapshots.
    ///
    /// The subscription yields the current snapshot immediately and then
    /// every later snapshot, in the order they were published.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.lock();

        // Cannot fail, the receiver is still in scope.
        let _ = sender.send(state.current.clone());
        state.subscribers.push(sender);

        Subscription { receiver }
    }

    /// The number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|sender| !sender.is_closed());
        state.subscribers.len()
    }

    /// Replace the current snapshot with `expenses` and send it to every subscriber.
    ///
    /// Returns the version of the new snapshot.
    pub(crate) fn publish(&self, expenses: Vec<Expense>) -> u64 {
        let mut state = self.lock();
        let snapshot = Snapshot::new(state.current.version + 1, expenses);

        state
            .subscribers
            .retain(|sender| sender.send(snapshot.clone()).is_ok());
        state.current = snapshot;

        tracing::debug!(
            "Published snapshot version {} to {} subscribers",
            state.current.version,
            state.subscribers.len()
        );

        state.current.version
    }

    fn lock(&self) -> MutexGuard<'_, ReadModelState> {
        // The state is replaced whole under the lock, so it is consistent even
        // if another thread panicked while holding it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A stream of snapshots from a [ReadModel].
///
/// Each subscription has its own queue, so a slow reader never misses a
/// snapshot and never holds up the writer.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the read model has been dropped and every queued
    /// snapshot has been received.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    /// Get the next snapshot if one is queued, without waiting.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }
}
