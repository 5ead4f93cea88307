//! Validates user input for new and edited expenses.
//!
//! Validation runs before anything is submitted to the store, so an invalid
//! expense never reaches the database.

use std::fmt::Display;

use time::OffsetDateTime;

use crate::expense::core::{Expense, NewExpense, truncate_to_millis};

/// A reason why an [ExpenseDraft] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The title is empty or only whitespace.
    #[error("Title cannot be empty")]
    TitleRequired,
    /// The amount is missing, not a number, or not greater than zero.
    #[error("Amount must be greater than 0")]
    InvalidAmount,
}

/// Every field error found in a draft, in field order (title, then amount).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// The individual field errors.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether `error` is one of the field errors.
    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    /// The message to show next to the title field, if the title was rejected.
    pub fn title_message(&self) -> Option<String> {
        self.message_for(ValidationError::TitleRequired)
    }

    /// The message to show next to the amount field, if the amount was rejected.
    pub fn amount_message(&self) -> Option<String> {
        self.message_for(ValidationError::InvalidAmount)
    }

    fn message_for(&self, error: ValidationError) -> Option<String> {
        self.contains(error).then(|| error.to_string())
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// The raw values of the add/edit expense form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseDraft {
    /// The title as typed by the user.
    pub title: String,
    /// The amount as typed by the user.
    pub amount: String,
    /// The category as typed by the user.
    pub category: String,
    /// An explicit date for the expense.
    ///
    /// New expenses default to the time they are added. Edited expenses keep
    /// their original date unless this is set.
    pub date: Option<OffsetDateTime>,
}

impl ExpenseDraft {
    /// Create a draft from form text.
    pub fn new(title: &str, amount: &str, category: &str) -> Self {
        Self {
            title: title.to_owned(),
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: None,
        }
    }

    /// Create a draft pre-filled with the values of an existing expense.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            amount: expense.amount.to_string(),
            category: expense.category.clone(),
            date: None,
        }
    }

    /// Set an explicit date for the expense.
    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = Some(date);
        self
    }
}

/// A draft that passed [validate_draft], with normalized values.
///
/// This is the only way to get values into the
/// [MutationGateway](crate::MutationGateway), which guarantees that stored
/// expenses have a title and a positive amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    title: String,
    amount: f64,
    category: String,
    date: Option<OffsetDateTime>,
}

impl ValidatedDraft {
    /// The trimmed, non-empty title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The parsed amount, always greater than zero.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The trimmed category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The explicit date, if one was given.
    pub fn date(&self) -> Option<OffsetDateTime> {
        self.date
    }

    /// Turn the draft into an expense ready to be stored, dated `now` unless
    /// the draft has an explicit date.
    pub fn into_new_expense(self, now: OffsetDateTime) -> NewExpense {
        NewExpense {
            title: self.title,
            amount: self.amount,
            category: self.category,
            date: truncate_to_millis(self.date.unwrap_or(now)),
        }
    }

    /// Apply the draft to `existing`, keeping its ID and, unless the draft has
    /// an explicit date, its date.
    pub fn apply_to(self, existing: &Expense) -> Expense {
        Expense {
            id: existing.id,
            title: self.title,
            amount: self.amount,
            category: self.category,
            date: self.date.map(truncate_to_millis).unwrap_or(existing.date),
        }
    }
}

/// Check a draft and normalize its values.
///
/// Titles and categories are trimmed. The amount is parsed as a decimal number.
///
/// # Errors
///
/// Returns every field error found:
/// - [ValidationError::TitleRequired] if the title is blank,
/// - [ValidationError::InvalidAmount] if the amount is missing, not a finite
///   number, or not greater than zero.
pub fn validate_draft(draft: &ExpenseDraft) -> Result<ValidatedDraft, ValidationErrors> {
    let mut errors = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push(ValidationError::TitleRequired);
    }

    let amount = parse_amount(&draft.amount);
    if amount.is_none() {
        errors.push(ValidationError::InvalidAmount);
    }

    match amount {
        Some(amount) if errors.is_empty() => Ok(ValidatedDraft {
            title: title.to_owned(),
            amount,
            category: draft.category.trim().to_owned(),
            date: draft.date,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Check that an already-built expense could have come from a valid draft.
pub(crate) fn check_expense(expense: &Expense) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if expense.title.trim().is_empty() {
        errors.push(ValidationError::TitleRequired);
    }

    if !is_valid_amount(expense.amount) {
        errors.push(ValidationError::InvalidAmount);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| is_valid_amount(*amount))
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::Expense;

    use super::{ExpenseDraft, ValidationError, check_expense, validate_draft};

    #[test]
    fn blank_title_is_rejected() {
        let result = validate_draft(&ExpenseDraft::new("", "10", "Food"));

        let errors = result.unwrap_err();
        assert_eq!(errors.errors(), [ValidationError::TitleRequired]);
    }

    #[test]
    fn whitespace_title_is_rejected() {
        let result = validate_draft(&ExpenseDraft::new(" \t\n", "10", "Food"));

        assert!(result.unwrap_err().contains(ValidationError::TitleRequired));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let result = validate_draft(&ExpenseDraft::new("Coffee", "0", "Food"));

        let errors = result.unwrap_err();
        assert_eq!(errors.errors(), [ValidationError::InvalidAmount]);
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        for amount in ["", "  ", "abc", "-1", "-0.01", "NaN", "inf", "4.5.1"] {
            let result = validate_draft(&ExpenseDraft::new("Coffee", amount, "Food"));

            assert_eq!(
                result.map_err(|errors| errors.errors().to_vec()),
                Err(vec![ValidationError::InvalidAmount]),
                "want amount {amount:?} to be rejected"
            );
        }
    }

    #[test]
    fn reports_both_errors_in_field_order() {
        let result = validate_draft(&ExpenseDraft::new("", "zero", "Food"));

        let errors = result.unwrap_err();
        assert_eq!(
            errors.errors(),
            [ValidationError::TitleRequired, ValidationError::InvalidAmount]
        );
        assert_eq!(
            errors.to_string(),
            "Title cannot be empty, Amount must be greater than 0"
        );
    }

    #[test]
    fn valid_draft_is_normalized() {
        let draft = validate_draft(&ExpenseDraft::new("  Coffee ", " 4.5 ", " Food ")).unwrap();

        assert_eq!(draft.title(), "Coffee");
        assert_eq!(draft.amount(), 4.5);
        assert_eq!(draft.category(), "Food");
        assert_eq!(draft.date(), None);
    }

    #[test]
    fn empty_category_is_allowed() {
        let draft = validate_draft(&ExpenseDraft::new("Coffee", "4.5", "")).unwrap();

        assert_eq!(draft.category(), "");
    }

    #[test]
    fn field_messages() {
        let errors = validate_draft(&ExpenseDraft::new("", "4.5", "")).unwrap_err();

        assert_eq!(errors.title_message().as_deref(), Some("Title cannot be empty"));
        assert_eq!(errors.amount_message(), None);
    }

    #[test]
    fn new_expense_defaults_to_now() {
        let now = datetime!(2025-10-05 08:30:00.123456 UTC);
        let draft = validate_draft(&ExpenseDraft::new("Coffee", "4.5", "Food")).unwrap();

        let new_expense = draft.into_new_expense(now);

        assert_eq!(new_expense.date(), datetime!(2025-10-05 08:30:00.123 UTC));
        assert_eq!(new_expense.title(), "Coffee");
    }

    #[test]
    fn new_expense_uses_explicit_date() {
        let now = datetime!(2025-10-05 08:30:00 UTC);
        let date = datetime!(2025-09-01 12:00:00 UTC);
        let draft =
            validate_draft(&ExpenseDraft::new("Coffee", "4.5", "Food").date(date)).unwrap();

        let new_expense = draft.into_new_expense(now);

        assert_eq!(new_expense.date(), date);
    }

    #[test]
    fn apply_keeps_id_and_date() {
        let existing = Expense {
            id: 7,
            title: "Coffee".to_owned(),
            amount: 4.5,
            category: "Food".to_owned(),
            date: datetime!(2025-09-01 12:00:00 UTC),
        };
        let draft = validate_draft(&ExpenseDraft::new("Coffee", "6.0", "Food")).unwrap();

        let updated = draft.apply_to(&existing);

        assert_eq!(updated.id, 7);
        assert_eq!(updated.amount, 6.0);
        assert_eq!(updated.date, existing.date);
    }

    #[test]
    fn draft_from_expense_validates_to_same_values() {
        let existing = Expense {
            id: 7,
            title: "Train".to_owned(),
            amount: 12.25,
            category: "Travel".to_owned(),
            date: datetime!(2025-09-01 12:00:00 UTC),
        };

        let draft = validate_draft(&ExpenseDraft::from_expense(&existing)).unwrap();

        assert_eq!(draft.apply_to(&existing), existing);
    }

    #[test]
    fn check_expense_rejects_invalid_records() {
        let expense = Expense {
            id: 1,
            title: " ".to_owned(),
            amount: -2.0,
            category: "Food".to_owned(),
            date: datetime!(2025-09-01 12:00:00 UTC),
        };

        let errors = check_expense(&expense).unwrap_err();

        assert_eq!(
            errors.errors(),
            [ValidationError::TitleRequired, ValidationError::InvalidAmount]
        );
    }
}
