//! Contains the store trait and implementations for persisting [expenses](crate::Expense).

mod expense;

pub mod sqlite;

pub use expense::ExpenseStore;
pub use sqlite::SQLiteExpenseStore;
