//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of an [Expense](crate::Expense), assigned by the store.
///
/// The value [UNASSIGNED_ID] marks an expense that has not been persisted yet.
pub type ExpenseId = DatabaseId;

/// The ID carried by an expense that the store has not assigned an ID to yet.
pub const UNASSIGNED_ID: ExpenseId = 0;
