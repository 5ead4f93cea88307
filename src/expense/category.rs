//! Expense categories and the category filter used by list views.

use std::fmt::Display;

/// The label of the filter option that matches every category.
pub const ALL_CATEGORIES_LABEL: &str = "All";

/// Categories offered to the user. Any other free-text category is also allowed.
pub const SUGGESTED_CATEGORIES: [&str; 4] = ["Groceries", "Travel", "Food", "Other"];

/// The options for the category filter, in display order.
pub fn category_options() -> [&'static str; 5] {
    [
        ALL_CATEGORIES_LABEL,
        SUGGESTED_CATEGORIES[0],
        SUGGESTED_CATEGORIES[1],
        SUGGESTED_CATEGORIES[2],
        SUGGESTED_CATEGORIES[3],
    ]
}

/// Selects which expenses a list shows by category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Match every expense.
    #[default]
    All,
    /// Match expenses whose category is exactly this name.
    Named(String),
}

impl CategoryFilter {
    /// Create a filter that matches exactly the category `name`.
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_owned())
    }

    /// Whether an expense in `category` passes the filter.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    /// Interpret a selected filter label, where [ALL_CATEGORIES_LABEL] means no filter.
    fn from(label: &str) -> Self {
        if label == ALL_CATEGORIES_LABEL {
            Self::All
        } else {
            Self::named(label)
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_CATEGORIES_LABEL}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
