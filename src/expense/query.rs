//! Pure functions that derive views from a snapshot of expenses.
//!
//! None of these functions modify or reorder their input, so the same
//! snapshot can be shared between any number of views.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};

use crate::{
    database_id::ExpenseId,
    expense::{Expense, category::CategoryFilter},
};

pub use crate::expense::category::category_options;

/// Get the expenses whose title contains `search_text` and whose category
/// passes `category`, in snapshot order.
///
/// The title match ignores case. An empty `search_text` matches every title.
pub fn filter_by(snapshot: &[Expense], search_text: &str, category: &CategoryFilter) -> Vec<Expense> {
    let needle = search_text.to_lowercase();

    snapshot
        .iter()
        .filter(|expense| needle.is_empty() || expense.title.to_lowercase().contains(&needle))
        .filter(|expense| category.matches(&expense.category))
        .cloned()
        .collect()
}

/// Sum the amounts of the expenses dated no earlier than `n` days before `now`.
///
/// Returns zero when no expense falls in the window. A window that reaches
/// back past the earliest representable date covers every expense.
pub fn sum_last_n_days(snapshot: &[Expense], n: u32, now: OffsetDateTime) -> f64 {
    let window_start = now.checked_sub(Duration::days(i64::from(n)));

    snapshot
        .iter()
        .filter(|expense| window_start.is_none_or(|start| expense.date >= start))
        .map(|expense| expense.amount)
        .sum()
}

/// Find the expense with `id` in the snapshot.
pub fn find_by_id(snapshot: &[Expense], id: ExpenseId) -> Option<&Expense> {
    snapshot.iter().find(|expense| expense.id == id)
}

/// Total the expenses in each category.
///
/// # Returns
/// Pairs of (category, total) ordered by decreasing total, then by category name.
pub fn total_by_category(snapshot: &[Expense]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for expense in snapshot {
        *totals.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
    }

    let mut totals: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_owned(), total))
        .collect();
    totals.sort_by(|(a_name, a_total), (b_name, b_total)| {
        b_total.total_cmp(a_total).then_with(|| a_name.cmp(b_name))
    });

    totals
}
