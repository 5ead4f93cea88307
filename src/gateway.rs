//! Applies writes to the expense store one at a time.
//!
//! All writes go through a single queue that is drained by one writer thread.
//! The writer owns the store, applies each write in the order it was
//! submitted, and publishes a new snapshot to the [ReadModel] after every
//! successful write. Two writes to the same expense therefore never overlap.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    Error, Expense, NewExpense, ValidatedDraft,
    database_id::ExpenseId,
    expense::{check_expense, truncate_to_millis},
    read_model::ReadModel,
    stores::ExpenseStore,
};

type Reply<T> = oneshot::Sender<Result<T, Error>>;

enum Command {
    Add {
        new_expense: NewExpense,
        reply: Reply<Expense>,
    },
    Update {
        id: ExpenseId,
        draft: ValidatedDraft,
        reply: Reply<Expense>,
    },
    Replace {
        expense: Expense,
        reply: Reply<Expense>,
    },
    Delete {
        id: ExpenseId,
        reply: Reply<()>,
    },
    Shutdown,
}

/// Submits writes to the expense store.
///
/// Cloned gateways share the same queue. Every method waits until the write
/// has been committed and the [ReadModel] shows it, or until it failed.
///
/// A write is queued the first time its future is polled, before the future
/// can be suspended, so dropping the future afterwards does not cancel it.
#[derive(Debug, Clone)]
pub struct MutationGateway {
    sender: mpsc::UnboundedSender<Command>,
}

impl MutationGateway {
    /// Start the writer for `store` on a blocking thread.
    pub(crate) fn spawn<S: ExpenseStore>(
        store: S,
        read_model: Arc<ReadModel>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::task::spawn_blocking(move || run_writer(store, read_model, receiver));

        (Self { sender }, writer)
    }

    /// Add a new expense, dated now unless the draft has an explicit date.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::Storage] if the store could not write the expense,
    /// - or [Error::GatewayClosed] if the tracker has shut down.
    pub async fn add(&self, draft: ValidatedDraft) -> Result<Expense, Error> {
        let new_expense = draft.into_new_expense(OffsetDateTime::now_utc());

        self.submit(|reply| Command::Add { new_expense, reply })
            .await
    }

    /// Change the title, amount and category of the expense `id`.
    ///
    /// The expense keeps its date unless the draft has an explicit date.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::UpdateMissingExpense] if there is no expense with the ID `id`,
    /// - [Error::Storage] if the store could not write the expense,
    /// - or [Error::GatewayClosed] if the tracker has shut down.
    pub async fn update(&self, id: ExpenseId, draft: ValidatedDraft) -> Result<Expense, Error> {
        self.submit(|reply| Command::Update { id, draft, reply })
            .await
    }

    /// Replace the stored expense that has the same ID as `expense`.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::Validation] if `expense` has a blank title or an amount that
    ///   is not greater than zero; the store is not touched,
    /// - [Error::UpdateMissingExpense] if there is no expense with that ID,
    /// - [Error::Storage] if the store could not write the expense,
    /// - or [Error::GatewayClosed] if the tracker has shut down.
    pub async fn update_expense(&self, expense: Expense) -> Result<Expense, Error> {
        check_expense(&expense)?;
        let expense = Expense {
            date: truncate_to_millis(expense.date),
            ..expense
        };

        self.submit(|reply| Command::Replace { expense, reply })
            .await
    }

    /// Delete the expense `id`. Deleting an expense that does not exist succeeds.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::Storage] if the store could not delete the expense,
    /// - or [Error::GatewayClosed] if the tracker has shut down.
    pub async fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        self.submit(|reply| Command::Delete { id, reply }).await
    }

    /// Stop accepting writes once every write queued so far has been applied.
    pub(crate) fn shutdown(&self) {
        if self.sender.send(Command::Shutdown).is_err() {
            tracing::debug!("Mutation queue was already closed");
        }
    }

    async fn submit<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T, Error> {
        let (reply, response) = oneshot::channel();

        // Queue without awaiting, so a caller that stops waiting cannot
        // withdraw the write.
        self.sender
            .send(command(reply))
            .map_err(|_| Error::GatewayClosed)?;

        response.await.map_err(|_| Error::GatewayClosed)?
    }
}

fn run_writer<S: ExpenseStore>(
    mut store: S,
    read_model: Arc<ReadModel>,
    mut receiver: mpsc::UnboundedReceiver<Command>,
) {
    tracing::debug!("Expense writer started");

    while let Some(command) = receiver.blocking_recv() {
        match command {
            Command::Add { new_expense, reply } => {
                let result = store.add(new_expense);
                if let Ok(expense) = &result {
                    tracing::debug!("Added expense {}", expense.id);
                }
                finish(&store, &read_model, result, reply);
            }
            Command::Update { id, draft, reply } => {
                let result = apply_update(&mut store, id, draft);
                finish(&store, &read_model, result, reply);
            }
            Command::Replace { expense, reply } => {
                let id = expense.id;
                let result = store.update(&expense).map(|()| expense);
                if result.is_ok() {
                    tracing::debug!("Replaced expense {id}");
                }
                finish(&store, &read_model, result, reply);
            }
            Command::Delete { id, reply } => {
                let result = store.delete(id);
                if result.is_ok() {
                    tracing::debug!("Deleted expense {id}");
                }
                finish(&store, &read_model, result, reply);
            }
            Command::Shutdown => {
                // Writes queued before the shutdown are still drained below.
                receiver.close();
            }
        }
    }

    tracing::debug!("Expense writer stopped");
}

fn apply_update<S: ExpenseStore>(
    store: &mut S,
    id: ExpenseId,
    draft: ValidatedDraft,
) -> Result<Expense, Error> {
    let existing = store.get(id).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingExpense(id),
        error => error,
    })?;

    let updated = draft.apply_to(&existing);
    store.update(&updated)?;
    tracing::debug!("Updated expense {id}");

    Ok(updated)
}

/// Publish the store's contents if the write succeeded, then reply to the caller.
fn finish<S: ExpenseStore, T>(
    store: &S,
    read_model: &ReadModel,
    result: Result<T, Error>,
    reply: Reply<T>,
) {
    match &result {
        Ok(_) => match store.get_all() {
            Ok(expenses) => {
                read_model.publish(expenses);
            }
            Err(error) => {
                tracing::error!("Could not refresh expenses after a write: {error}");
            }
        },
        Err(error) => tracing::error!("Could not apply write: {error}"),
    }

    if reply.send(result).is_err() {
        tracing::warn!("A write finished after its caller stopped waiting for it");
    }
}
