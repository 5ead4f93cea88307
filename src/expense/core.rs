//! Defines the core data model and database queries for expenses.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::ExpenseId};

// ============================================================================
// MODELS
// ============================================================================

/// Money spent on something, e.g. a coffee or a train ticket.
///
/// Values of this type are snapshots: changing one does not change the
/// stored expense. Submit changes through the
/// [MutationGateway](crate::MutationGateway) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense, assigned by the store.
    pub id: ExpenseId,
    /// A short label for what the money was spent on.
    pub title: String,
    /// The amount of money spent. Always greater than zero for accepted expenses.
    pub amount: f64,
    /// A free-text category, e.g. "Groceries" or "Travel".
    pub category: String,
    /// When the expense happened, with millisecond precision.
    pub date: OffsetDateTime,
}

/// An expense that has passed validation but has not been stored yet.
///
/// Created with [ValidatedDraft::into_new_expense](crate::ValidatedDraft::into_new_expense).
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub(crate) title: String,
    pub(crate) amount: f64,
    pub(crate) category: String,
    pub(crate) date: OffsetDateTime,
}

impl NewExpense {
    /// The title of the expense.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The amount of money spent.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The category of the expense.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the expense happened.
    pub fn date(&self) -> OffsetDateTime {
        self.date
    }
}

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Convert `date` to the number of milliseconds since the Unix epoch.
///
/// Sub-millisecond precision is discarded, rounding towards negative infinity.
pub(crate) fn to_unix_millis(date: OffsetDateTime) -> i64 {
    date.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI) as i64
}

/// Convert milliseconds since the Unix epoch into a UTC date-time.
pub(crate) fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI)
}

/// Drop any precision finer than a millisecond, which the store cannot keep.
pub(crate) fn truncate_to_millis(date: OffsetDateTime) -> OffsetDateTime {
    date.replace_millisecond(date.millisecond()).unwrap_or(date)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, title, amount, category, date FROM expense";

/// Create a new expense in the database and return it with its generated ID.
///
/// # Errors
/// This function will return an [Error::Storage] if there is an SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (title, amount, category, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, title, amount, category, date",
        )?
        .query_row(
            (
                new_expense.title,
                new_expense.amount,
                new_expense.category,
                to_unix_millis(new_expense.date),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored expense,
/// - or [Error::Storage] if there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve every expense, newest first.
///
/// Expenses with the same date are returned in the order they were created,
/// which keeps the order stable when the list is read again.
///
/// # Errors
/// This function will return an [Error::Storage] if there is an SQL error.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id ASC"))?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace the stored expense that has the same ID as `expense`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if no expense has the ID of `expense`,
/// - or [Error::Storage] if there is some other SQL error.
pub fn update_expense(expense: &Expense, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET title = ?1, amount = ?2, category = ?3, date = ?4 WHERE id = ?5",
        (
            &expense.title,
            expense.amount,
            &expense.category,
            to_unix_millis(expense.date),
            expense.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense(expense.id));
    }

    Ok(())
}

/// Delete an expense by ID.
///
/// Deleting an expense that does not exist is not an error, so the same
/// delete can safely be repeated.
///
/// # Errors
/// This function will return an [Error::Storage] if there is an SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        tracing::debug!("Expense {id} was already deleted");
    }

    Ok(())
}

/// Get the total number of expenses in the database.
///
/// # Errors
/// This function will return an [Error::Storage] if there is an SQL error.
pub fn count_expenses(connection: &Connection) -> Result<usize, Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))?;

    Ok(count as usize)
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            date INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date_id ON expense(date DESC, id ASC);",
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let raw_date: i64 = row.get(4)?;
    let date = from_unix_millis(raw_date)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(error)))?;

    Ok(Expense {
        id,
        title,
        amount,
        category,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
