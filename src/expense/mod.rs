//! Expense management for the tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the SQL functions for storing it
//! - Categories and the category filter
//! - Validation of user input
//! - Pure queries over a snapshot of expenses

mod category;
mod core;
pub mod query;
mod validation;

pub use category::{ALL_CATEGORIES_LABEL, CategoryFilter, SUGGESTED_CATEGORIES};
pub use core::{
    Expense, NewExpense, count_expenses, create_expense, create_expense_table, delete_expense,
    get_all_expenses, get_expense, update_expense,
};
pub use validation::{
    ExpenseDraft, ValidatedDraft, ValidationError, ValidationErrors, validate_draft,
};

pub(crate) use core::truncate_to_millis;
pub(crate) use validation::check_expense;
