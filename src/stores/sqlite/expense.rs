//! Implements a SQLite backed expense store.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;

use crate::{
    Error, Expense, NewExpense,
    database_id::ExpenseId,
    db::initialize,
    expense::{
        count_expenses, create_expense, delete_expense, get_all_expenses, get_expense,
        update_expense,
    },
    stores::ExpenseStore,
};

/// Stores expenses in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The expense table must already exist, see [initialize_db](crate::initialize_db).
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Open the SQLite database at `path`, creating the file and the expense
    /// table if they do not exist.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        Self::from_connection(connection)
    }

    /// Create a store backed by a private in-memory database.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;

        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self::new(Arc::new(Mutex::new(connection))))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    fn add(&mut self, new_expense: NewExpense) -> Result<Expense, Error> {
        create_expense(new_expense, &*self.lock()?)
    }

    fn get(&self, id: ExpenseId) -> Result<Expense, Error> {
        get_expense(id, &*self.lock()?)
    }

    fn update(&mut self, expense: &Expense) -> Result<(), Error> {
        update_expense(expense, &*self.lock()?)
    }

    fn delete(&mut self, id: ExpenseId) -> Result<(), Error> {
        delete_expense(id, &*self.lock()?)
    }

    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        get_all_expenses(&*self.lock()?)
    }

    fn count(&self) -> Result<usize, Error> {
        count_expenses(&*self.lock()?)
    }
}
