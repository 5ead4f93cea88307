use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::filter::LevelFilter;

use expense_tracker::{
    ExpenseDraft, ExpenseTracker, SUGGESTED_CATEGORIES, TrackerConfig, logging::setup_logging,
    query, validate_draft,
};

const TITLES: [&str; 8] = [
    "Coffee",
    "Weekly shop",
    "Bus fare",
    "Lunch",
    "Train ticket",
    "Fruit",
    "Dinner out",
    "Stationery",
];

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of expenses to create, one per day counting back from today.
    #[arg(long, short, default_value_t = 20)]
    count: u32,
}

/// Create and populate a database for manual testing.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging(LevelFilter::INFO)?;

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let tracker = ExpenseTracker::open(output_path, TrackerConfig::default())?;

    println!("Creating {} test expenses...", args.count);
    let now = OffsetDateTime::now_utc();

    for day in 0..args.count {
        let index = day as usize;
        let title = TITLES[index % TITLES.len()];
        let category = SUGGESTED_CATEGORIES[index % SUGGESTED_CATEGORIES.len()];
        let amount = format!("{}.{:02}", 3 + (day * 7) % 120, (day * 37) % 100);

        let draft = ExpenseDraft::new(title, &amount, category)
            .date(now - Duration::days(i64::from(day)));
        tracker.add(validate_draft(&draft)?).await?;
    }

    let snapshot = tracker.snapshot();
    let config = tracker.config();
    println!(
        "Created {} expenses, {} in the last {} days.",
        snapshot.len(),
        tracker.format_amount(tracker.recent_total(now)),
        config.summary_window_days
    );

    for (category, total) in query::total_by_category(&snapshot) {
        println!("  {category}: {}", tracker.format_amount(total));
    }

    tracker.shutdown().await;

    println!("Success!");

    Ok(())
}
