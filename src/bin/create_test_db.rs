use std::{error::Error, path::Path, process::exit, str::FromStr};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use finance_tracker::{
    Amount, Category, EntryType, NewTransaction, NewUser, PasswordHash, ValidatedPassword,
    create_default_categories, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the finance tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The email and password of the demo user.
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo123";

/// Sample transactions as (description, cents, category name, days ago).
const SAMPLE_TRANSACTIONS: [(&str, i64, &str, i64); 6] = [
    ("Monthly salary", 420_000, "Salary", 20),
    ("Logo design", 35_000, "Freelance", 12),
    ("Groceries", 8_645, "Food", 3),
    ("Lunch", 1_250, "Food", 1),
    ("Bus pass", 5_500, "Transport", 7),
    ("Rent", 180_000, "Housing", 19),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL} with password {DEMO_PASSWORD}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;

    let transaction = conn.transaction()?;

    let user = create_user(
        NewUser {
            name: "Demo".to_owned(),
            email: EmailAddress::from_str(DEMO_EMAIL)?,
            password_hash,
        },
        &transaction,
    )?;
    let categories = create_default_categories(user.id, &transaction)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();

    for (description, cents, category_name, days_ago) in SAMPLE_TRANSACTIONS {
        let category = find_category(&categories, category_name)?;

        create_transaction(
            user.id,
            NewTransaction {
                description: description.to_owned(),
                amount: Amount::from_cents(cents)?,
                entry_type: category.entry_type,
                date: today - Duration::days(days_ago),
                receipt_url: None,
                category_id: category.id,
            },
            &transaction,
        )?;
    }

    transaction.commit()?;

    let expense_count = SAMPLE_TRANSACTIONS
        .iter()
        .filter(|(_, _, category_name, _)| {
            categories.iter().any(|category| {
                category.name.as_ref() == *category_name
                    && category.entry_type == EntryType::Expense
            })
        })
        .count();
    println!(
        "Created {} transactions ({expense_count} expenses).",
        SAMPLE_TRANSACTIONS.len()
    );
    println!("Success!");

    Ok(())
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> Result<&'a Category, String> {
    categories
        .iter()
        .find(|category| category.name.as_ref() == name)
        .ok_or_else(|| format!("Missing default category {name}"))
}
