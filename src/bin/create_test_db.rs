use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use spendwise::{
    Amount, CategoryClassifier, Expense, PasswordHash, UserID, ValidatedPassword, create_budget,
    create_expense, create_user, initialize_db,
};

/// A utility for creating a test database for the Spendwise server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Expenses as (description, amount in cents, days after the start of the month, notes).
const LAST_MONTH: [(&str, i64, i64, Option<&str>); 5] = [
    ("Rent", 1_500_000, 0, None),
    ("Electricity bill", 230_000, 4, None),
    ("Big Bazaar grocery run", 412_050, 6, Some("Monthly stock up")),
    ("Uber to airport", 85_000, 12, None),
    ("Netflix", 64_900, 20, None),
];

const THIS_MONTH: [(&str, i64, i64, Option<&str>); 6] = [
    ("Rent", 1_500_000, 0, None),
    ("Pizza night", 120_000, 1, Some("With flatmates")),
    ("Amazon order", 349_900, 2, None),
    ("Train tickets", 56_000, 3, None),
    ("Grocery delivery", 215_075, 4, None),
    ("Stationery", 12_000, 5, None),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
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
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'demo' with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("demo", "demo@example.com", password_hash, &conn)?;

    let today = OffsetDateTime::now_utc().date();
    let this_month = today.replace_day(1)?;
    let last_month = (this_month - Duration::days(1)).replace_day(1)?;
    let classifier = CategoryClassifier::default();

    println!("Creating expenses...");

    let months = [(last_month, &LAST_MONTH[..]), (this_month, &THIS_MONTH[..])];
    for (month_start, expenses) in months {
        for &(description, cents, day_offset, notes) in expenses {
            let date = (month_start + Duration::days(day_offset)).min(today);
            insert_expense(&conn, &classifier, user.id, description, cents, date, notes)?;
        }
    }

    println!("Creating budget for this month...");

    create_budget(user.id, this_month, Amount::from_cents(2_500_000), &conn)?;

    println!("Success!");

    Ok(())
}

fn insert_expense(
    conn: &Connection,
    classifier: &CategoryClassifier,
    user_id: UserID,
    description: &str,
    cents: i64,
    date: Date,
    notes: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let amount = Amount::new(Decimal::new(cents, 2))?;
    let builder =
        Expense::build(description, amount, classifier.classify(description), date).notes(notes);

    create_expense(user_id, builder, conn)?;

    Ok(())
}
