//! Sets up the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, expense::create_expense_table};

/// Create the tables for the domain models if they do not already exist.
///
/// The schema is created inside a single exclusive transaction, so a
/// half-initialized database is never left behind.
///
/// # Errors
/// Returns [Error::Storage] if the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("first initialization failed");
        let result = initialize(&conn);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn initialize_creates_expense_table() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'expense'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 1);
    }
}
