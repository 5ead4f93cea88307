//! This module defines the settings for an [ExpenseTracker](crate::ExpenseTracker).

/// The config for an [ExpenseTracker](crate::ExpenseTracker).
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// The number of days, counting back from now, that the recent spending
    /// total covers.
    pub summary_window_days: u32,
    /// The currency symbol used when formatting amounts for display.
    pub currency_symbol: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            summary_window_days: 7,
            currency_symbol: "₹".to_owned(),
        }
    }
}
