//! Defines the expense store trait.

use crate::{Error, Expense, NewExpense, database_id::ExpenseId};

/// Durably stores expenses and retrieves them.
///
/// Every write is atomic: either it is fully applied or it has no effect.
/// The store is owned by the [MutationGateway](crate::MutationGateway), which
/// calls it from a single writer thread, so implementations do not need to
/// handle concurrent writes themselves.
pub trait ExpenseStore: Send + 'static {
    /// Add a new expense to the store and return it with its assigned ID.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the expense could not be written.
    fn add(&mut self, new_expense: NewExpense) -> Result<Expense, Error>;

    /// Retrieve an expense from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no expense has the ID `id`.
    fn get(&self, id: ExpenseId) -> Result<Expense, Error>;

    /// Replace the stored expense that has the same ID as `expense`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingExpense] if no expense has that ID.
    fn update(&mut self, expense: &Expense) -> Result<(), Error>;

    /// Remove the expense with the ID `id`. Removing a missing expense succeeds.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the expense could not be removed.
    fn delete(&mut self, id: ExpenseId) -> Result<(), Error>;

    /// Retrieve every expense ordered by date, newest first, and then by the
    /// order they were added.
    fn get_all(&self) -> Result<Vec<Expense>, Error>;

    /// Get the number of stored expenses.
    fn count(&self) -> Result<usize, Error>;
}
