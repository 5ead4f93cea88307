//! The composition root that owns the store, the read model and the writer.

use std::{path::Path, sync::Arc};

use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::{
    CategoryFilter, Error, Expense, TrackerConfig, ValidatedDraft,
    database_id::ExpenseId,
    display::format_currency,
    expense::query,
    gateway::MutationGateway,
    read_model::{ReadModel, Snapshot, Subscription},
    stores::{ExpenseStore, SQLiteExpenseStore},
};

/// A running expense tracker.
///
/// Reads go through [ExpenseTracker::snapshot] and [ExpenseTracker::observe_all],
/// writes through the [MutationGateway]. Create one tracker per database and
/// share its gateway and read model with the parts of the program that need them.
#[derive(Debug)]
pub struct ExpenseTracker {
    config: TrackerConfig,
    read_model: Arc<ReadModel>,
    gateway: MutationGateway,
    writer: JoinHandle<()>,
}

impl ExpenseTracker {
    /// Start a tracker over `store`.
    ///
    /// The read model is loaded from the store before this returns, so the
    /// first snapshot already holds every stored expense.
    ///
    /// The tracker's writer must be the only thing that writes to `store`
    /// from now on. The read model is only refreshed after writes made through
    /// the [MutationGateway], so a write made through a clone of the store, or
    /// through another connection to the same database, is not shown until
    /// the next gateway write. Clones may still be used for reading.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::NoRuntime] if called outside of a Tokio runtime,
    /// - or [Error::Storage] if the expenses could not be loaded.
    pub fn new<S: ExpenseStore>(store: S, config: TrackerConfig) -> Result<Self, Error> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::NoRuntime);
        }

        let expenses = store.get_all()?;
        let expense_count = expenses.len();
        let read_model = Arc::new(ReadModel::new(expenses));
        let (gateway, writer) = MutationGateway::spawn(store, read_model.clone());

        tracing::info!("Expense tracker started with {expense_count} expenses");

        Ok(Self {
            config,
            read_model,
            gateway,
            writer,
        })
    }

    /// Start a tracker over the SQLite database at `path`, creating it if needed.
    ///
    /// # Errors
    /// See [ExpenseTracker::new] and [SQLiteExpenseStore::open].
    pub fn open(path: impl AsRef<Path>, config: TrackerConfig) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::info!("Opening expense database at {}", path.display());

        Self::new(SQLiteExpenseStore::open(path)?, config)
    }

    /// Start a tracker over a new in-memory database.
    ///
    /// # Errors
    /// See [ExpenseTracker::new].
    pub fn open_in_memory(config: TrackerConfig) -> Result<Self, Error> {
        Self::new(SQLiteExpenseStore::open_in_memory()?, config)
    }

    /// The settings this tracker was started with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The latest snapshot of every stored expense, newest first.
    pub fn snapshot(&self) -> Snapshot {
        self.read_model.current()
    }

    /// Subscribe to every snapshot, starting with the current one.
    pub fn observe_all(&self) -> Subscription {
        self.read_model.subscribe()
    }

    /// The read model, for consumers that outlive a borrow of the tracker.
    pub fn read_model(&self) -> Arc<ReadModel> {
        self.read_model.clone()
    }

    /// A handle for submitting writes.
    pub fn gateway(&self) -> MutationGateway {
        self.gateway.clone()
    }

    /// See [MutationGateway::add].
    pub async fn add(&self, draft: ValidatedDraft) -> Result<Expense, Error> {
        self.gateway.add(draft).await
    }

    /// See [MutationGateway::update].
    pub async fn update(&self, id: ExpenseId, draft: ValidatedDraft) -> Result<Expense, Error> {
        self.gateway.update(id, draft).await
    }

    /// See [MutationGateway::update_expense].
    pub async fn update_expense(&self, expense: Expense) -> Result<Expense, Error> {
        self.gateway.update_expense(expense).await
    }

    /// See [MutationGateway::delete].
    pub async fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        self.gateway.delete(id).await
    }

    /// The expenses in the current snapshot that match `search_text` and `category`.
    pub fn filter(&self, search_text: &str, category: &CategoryFilter) -> Vec<Expense> {
        query::filter_by(&self.snapshot(), search_text, category)
    }

    /// The total spent in the last [TrackerConfig::summary_window_days] days before `now`.
    pub fn recent_total(&self, now: OffsetDateTime) -> f64 {
        query::sum_last_n_days(&self.snapshot(), self.config.summary_window_days, now)
    }

    /// Format `amount` with the configured currency symbol.
    pub fn format_amount(&self, amount: f64) -> String {
        format_currency(amount, &self.config.currency_symbol)
    }

    /// Stop the writer after it has applied every write submitted so far.
    ///
    /// Gateways cloned from this tracker return [Error::GatewayClosed] afterwards.
    pub async fn shutdown(self) {
        self.gateway.shutdown();

        match self.writer.await {
            Ok(()) => tracing::info!("Expense tracker shut down"),
            Err(error) => tracing::error!("Expense writer did not stop cleanly: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::{Duration, OffsetDateTime};

    use crate::{
        CategoryFilter, Error, ExpenseDraft, TrackerConfig, ValidatedDraft,
        stores::{ExpenseStore, SQLiteExpenseStore},
        validate_draft,
    };

    use super::ExpenseTracker;

    fn draft(title: &str, amount: &str, category: &str) -> ValidatedDraft {
        validate_draft(&ExpenseDraft::new(title, amount, category)).unwrap()
    }

    fn dated_draft(title: &str, amount: &str, date: OffsetDateTime) -> ValidatedDraft {
        validate_draft(&ExpenseDraft::new(title, amount, "Other").date(date)).unwrap()
    }

    fn get_test_tracker() -> ExpenseTracker {
        ExpenseTracker::open_in_memory(TrackerConfig::default()).unwrap()
    }

    #[test]
    fn new_outside_runtime_fails() {
        let result = ExpenseTracker::open_in_memory(TrackerConfig::default());

        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[tokio::test]
    async fn starts_with_stored_expenses() {
        let mut store = SQLiteExpenseStore::open_in_memory().unwrap();
        store
            .add(draft("Coffee", "4.5", "Food").into_new_expense(OffsetDateTime::now_utc()))
            .unwrap();

        let tracker = ExpenseTracker::new(store.clone(), TrackerConfig::default()).unwrap();

        assert_eq!(tracker.snapshot().version(), 0);
        assert_eq!(tracker.snapshot().to_vec(), store.get_all().unwrap());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn reading_clone_agrees_with_read_model() {
        let store = SQLiteExpenseStore::open_in_memory().unwrap();
        let tracker = ExpenseTracker::new(store.clone(), TrackerConfig::default()).unwrap();

        let added = tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();
        tracker.add(draft("Train", "12", "Travel")).await.unwrap();
        tracker.delete(added.id).await.unwrap();

        assert_eq!(tracker.snapshot().to_vec(), store.get_all().unwrap());
        assert_eq!(store.count(), Ok(tracker.snapshot().len()));
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn add_edit_delete_coffee() {
        let tracker = get_test_tracker();
        let mut observer = tracker.observe_all();
        assert!(observer.next().await.unwrap().is_empty());

        let added = tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();
        let snapshot = observer.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].id > 0);
        assert_eq!(snapshot[0].title, "Coffee");
        assert_eq!(snapshot[0].amount, 4.5);
        assert_eq!(snapshot[0].category, "Food");

        let edit = validate_draft(&ExpenseDraft {
            amount: "6.0".to_owned(),
            ..ExpenseDraft::from_expense(&added)
        })
        .unwrap();
        tracker.update(added.id, edit).await.unwrap();
        let snapshot = observer.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, added.id);
        assert_eq!(snapshot[0].amount, 6.0);
        assert_eq!(snapshot[0].date, added.date);

        tracker.delete(added.id).await.unwrap();
        assert!(observer.next().await.unwrap().is_empty());

        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn recent_total_covers_configured_window() {
        let tracker = get_test_tracker();
        let now = OffsetDateTime::now_utc();
        tracker
            .add(dated_draft("Groceries", "100", now - Duration::days(1)))
            .await
            .unwrap();
        tracker
            .add(dated_draft("Flight", "50", now - Duration::days(10)))
            .await
            .unwrap();

        assert_eq!(tracker.recent_total(now), 100.0);
        assert_eq!(tracker.format_amount(tracker.recent_total(now)), "₹100.00");

        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn recent_total_uses_config_window() {
        let config = TrackerConfig {
            summary_window_days: 30,
            ..TrackerConfig::default()
        };
        let tracker = ExpenseTracker::open_in_memory(config).unwrap();
        let now = OffsetDateTime::now_utc();
        tracker
            .add(dated_draft("Groceries", "100", now - Duration::days(1)))
            .await
            .unwrap();
        tracker
            .add(dated_draft("Flight", "50", now - Duration::days(10)))
            .await
            .unwrap();

        assert_eq!(tracker.recent_total(now), 150.0);
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn filter_by_title_and_category() {
        let tracker = get_test_tracker();
        tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();
        tracker.add(draft("Train", "12", "Travel")).await.unwrap();
        tracker.add(draft("Iced coffee", "5", "Food")).await.unwrap();

        let coffee = tracker.filter("COFFEE", &CategoryFilter::All);
        let travel = tracker.filter("", &CategoryFilter::named("Travel"));
        let none = tracker.filter("coffee", &CategoryFilter::named("Travel"));

        assert_eq!(coffee.len(), 2);
        assert_eq!(travel.len(), 1);
        assert_eq!(travel[0].title, "Train");
        assert!(none.is_empty());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn delete_missing_expense_succeeds() {
        let tracker = get_test_tracker();
        let added = tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();

        assert_eq!(tracker.delete(added.id).await, Ok(()));
        assert_eq!(tracker.delete(added.id).await, Ok(()));
        assert!(tracker.snapshot().is_empty());
        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_applies_queued_writes() {
        let store = SQLiteExpenseStore::open_in_memory().unwrap();
        let tracker = ExpenseTracker::new(store.clone(), TrackerConfig::default()).unwrap();
        let gateway = tracker.gateway();

        let pending: Vec<_> = (1..=3)
            .map(|i| {
                let gateway = gateway.clone();
                tokio::spawn(async move { gateway.add(draft(&format!("#{i}"), "1", "Other")).await })
            })
            .collect();
        for task in pending {
            task.await.unwrap().unwrap();
        }
        tracker.shutdown().await;

        assert_eq!(store.count(), Ok(3));
        assert_eq!(
            gateway.add(draft("Late", "1", "Other")).await,
            Err(Error::GatewayClosed)
        );
    }

    #[tokio::test]
    async fn read_model_outlives_tracker() {
        let tracker = get_test_tracker();
        let read_model = tracker.read_model();
        tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();

        tracker.shutdown().await;

        assert_eq!(read_model.current().len(), 1);
        assert_eq!(Arc::strong_count(&read_model), 1);
    }

    #[tokio::test]
    async fn reopening_database_restores_expenses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");

        let tracker = ExpenseTracker::open(&path, TrackerConfig::default()).unwrap();
        let added = tracker.add(draft("Coffee", "4.5", "Food")).await.unwrap();
        tracker.shutdown().await;

        let reopened = ExpenseTracker::open(&path, TrackerConfig::default()).unwrap();

        assert_eq!(reopened.snapshot().to_vec(), vec![added]);
        reopened.shutdown().await;
    }
}
