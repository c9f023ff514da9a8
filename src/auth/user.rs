//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidationErrors,
    validation::{InvalidValue, trimmed_with_length},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user goes by.
    pub name: String,
    /// The address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

impl User {
    /// The parts of the user that are safe to send to a client.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.to_string(),
        }
    }
}

/// The public view of a user, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID.
    pub id: UserID,
    /// The name the user goes by.
    pub name: String,
    /// The address the user logs in with.
    pub email: String,
}

/// The data needed to insert a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The name the user goes by, 2 to 100 characters.
    pub name: String,
    /// The address the user logs in with.
    pub email: EmailAddress,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

/// Trim and check the length of a user's display name.
pub fn validate_user_name(raw_name: &str) -> Result<String, InvalidValue> {
    trimmed_with_length("name", raw_name, 2, 100)
}

/// Parse an email address sent by a client.
pub fn parse_email(raw_email: &str) -> Result<EmailAddress, InvalidValue> {
    EmailAddress::from_str(raw_email.trim())
        .map_err(|_| InvalidValue::new("email must be a valid email address"))
}

/// Create the user table.
///
/// Emails are compared case-insensitively so that "Ana@x.io" and "ana@x.io"
/// cannot both be registered.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::Validation] on the "email" field if the email is already registered,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let result = connection.execute(
        "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3)",
        (
            &new_user.name,
            new_user.email.as_str(),
            new_user.password_hash.as_ref(),
        ),
    );

    match result {
        Ok(_) => {}
        // Code 2067 occurs when a UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(error, Some(_))) if error.extended_code == 2067 => {
            return Err(ValidationErrors::single(
                "email",
                "email is already registered",
            ));
        }
        Err(error) => return Err(error.into()),
    }

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`, ignoring case.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_str())], map_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password_hash(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{
        NewUser, UserID, create_user, create_user_table, get_user_by_email,
        get_user_by_id, parse_email, update_password_hash, validate_user_name,
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_owned(),
            email: EmailAddress::from_str(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("ana@x.io"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, "Ana");
        assert_eq!(inserted_user.email.as_str(), "ana@x.io");
    }

    #[test]
    fn insert_duplicate_email_fails_on_email_field() {
        let db_connection = get_db_connection();
        create_user(new_user("ana@x.io"), &db_connection).unwrap();

        let result = create_user(new_user("ANA@x.io"), &db_connection);

        match result {
            Err(Error::Validation(errors)) => assert!(errors.contains("email")),
            other => panic!("want validation error on email, got {other:?}"),
        }
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("ana@x.io"), &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_ignores_case() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("ana@x.io"), &db_connection).unwrap();

        let retrieved_user =
            get_user_by_email(&EmailAddress::from_str("Ana@X.io").unwrap(), &db_connection)
                .unwrap();

        assert_eq!(retrieved_user.id, test_user.id);
    }

    #[test]
    fn update_password_hash_replaces_hash() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("ana@x.io"), &db_connection).unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password_hash(test_user.id, &new_hash, &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();
        assert_eq!(retrieved_user.password_hash, new_hash);
    }

    #[test]
    fn update_password_hash_fails_for_missing_user() {
        let db_connection = get_db_connection();

        let result = update_password_hash(
            UserID::new(42),
            &PasswordHash::new_unchecked("hunter3"),
            &db_connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn validates_name_and_email() {
        assert_eq!(validate_user_name("  Ana  "), Ok("Ana".to_owned()));
        assert!(validate_user_name("A").is_err());
        assert!(parse_email("not-an-email").is_err());
        assert!(parse_email("ana@x.io").is_ok());
    }
}
