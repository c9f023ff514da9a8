use std::{error::Error, io, path::Path, process::exit, str::FromStr};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use finance_tracker::{
    PasswordHash, User, ValidatedPassword, get_user_by_email, update_password_hash,
};

/// A utility for changing the password of a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address the user logs in with.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let email = match EmailAddress::from_str(args.email.trim()) {
        Ok(email) => email,
        Err(error) => {
            print_error(format!("Invalid email address: {error}"));
            exit(1);
        }
    };

    let mut conn = Connection::open(db_path)?;
    let user = match get_user_by_email(&email, &conn) {
        Ok(user) => user,
        Err(finance_tracker::Error::NotFound) => {
            print_error(format!("No user is registered with the email {email}"));
            exit(1);
        }
        Err(error) => return Err(error.into()),
    };
    println!("Resetting password for {} <{}>", user.name, user.email);

    let Some(password_hash) = get_new_password_hash() else {
        return Ok(());
    };
    update_password(&mut conn, &user, &password_hash)?;

    println!("Password updated successfully!");

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        print_error("Database path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if !db_path.is_file() {
        print_error(format!("File does not exist at {db_path:#?}!"));
        exit(1);
    }
}

/// Prompt until the user enters the same valid password twice.
///
/// Returns `None` if stdin is closed or cannot be read.
fn get_new_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = prompt("Enter a new password: ")?;

        if let Err(error) = ValidatedPassword::new(&first_password) {
            print_error(error);
            continue;
        }

        let second_password = prompt("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&first_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
            }
        }
    }
}

fn prompt(message: &str) -> Option<String> {
    match rpassword::prompt_password(message) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn update_password(
    conn: &mut Connection,
    user: &User,
    password_hash: &PasswordHash,
) -> Result<(), Box<dyn Error>> {
    let transaction = conn.transaction()?;

    update_password_hash(user.id, password_hash, &transaction)?;

    transaction.commit()?;

    Ok(())
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    first.to_uppercase().chain(chars).collect()
}
