//! Expense tracker is the data engine behind a small personal expense tracking app.
//!
//! Expenses are persisted in a local SQLite database. Consumers read them
//! through a [ReadModel] that is republished after every committed write, and
//! change them through a [MutationGateway] that applies writes one at a time.
//! The pure functions in [query] derive filtered lists and totals from a
//! [Snapshot] of the read model, and [validate_draft] checks user input before
//! it is submitted.
//!
//! [ExpenseTracker] wires these pieces together:
//!
//! ```no_run
//! # async fn example() -> Result<(), expense_tracker::Error> {
//! use expense_tracker::{CategoryFilter, ExpenseDraft, ExpenseTracker, TrackerConfig, query, validate_draft};
//!
//! let tracker = ExpenseTracker::open("expenses.db", TrackerConfig::default())?;
//!
//! let draft = validate_draft(&ExpenseDraft::new("Coffee", "4.5", "Food"))?;
//! tracker.add(draft).await?;
//!
//! let snapshot = tracker.snapshot();
//! let food = query::filter_by(&snapshot, "", &CategoryFilter::named("Food"));
//! assert_eq!(food.len(), 1);
//!
//! tracker.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod database_id;
mod db;
pub mod display;
mod expense;
mod gateway;
pub mod logging;
mod read_model;
mod stores;
mod tracker;

pub use config::TrackerConfig;
pub use database_id::{DatabaseId, ExpenseId, UNASSIGNED_ID};
pub use db::initialize as initialize_db;
pub use expense::{
    ALL_CATEGORIES_LABEL, CategoryFilter, Expense, ExpenseDraft, NewExpense, SUGGESTED_CATEGORIES,
    ValidatedDraft, ValidationError, ValidationErrors, query, validate_draft,
};
pub use gateway::MutationGateway;
pub use read_model::{ReadModel, Snapshot, Subscription};
pub use stores::{ExpenseStore, SQLiteExpenseStore};
pub use tracker::ExpenseTracker;

/// The errors that may occur in the expense tracker.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The underlying storage medium failed.
    ///
    /// The write was not applied and the read model still shows the last
    /// committed state. Nothing is retried automatically.
    #[error("the expense store failed: {0}")]
    Storage(rusqlite::Error),

    /// The requested expense was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested expense could not be found")]
    NotFound,

    /// Tried to update an expense that does not exist.
    #[error("tried to update expense {0}, which is not in the store")]
    UpdateMissingExpense(ExpenseId),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The mutation gateway is no longer accepting writes, either because the
    /// tracker was shut down or because its writer stopped.
    #[error("the mutation gateway has shut down")]
    GatewayClosed,

    /// The tracker was started outside of a Tokio runtime, so its writer
    /// could not be spawned.
    #[error("the expense tracker must be started inside a Tokio runtime")]
    NoRuntime,

    /// The expense failed validation and was not submitted to the store.
    #[error("invalid expense: {0}")]
    Validation(ValidationErrors),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::Storage(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::Validation(value)
    }
}
