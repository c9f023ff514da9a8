#![allow(missing_docs)]

//! Helpers shared by the unit and endpoint tests.

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    AppState, NewUser, PasswordHash, User, UserID,
    auth::{COOKIE_TOKEN, create_user, parse_email},
    build_router,
    category::Category,
    db::initialize,
    endpoints,
    pagination::PaginationConfig,
    transaction::{Amount, NewTransaction, Transaction, create_transaction},
};

/// The password used by [register_test_user].
pub(crate) const TEST_PASSWORD: &str = "secret1";

/// App state with an in-memory database and a cheap password hash.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(connection, "foobar", PaginationConfig::default())
        .expect("Could not create app state.")
        .with_password_hash_cost(4)
}

pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_state())).expect("Could not create test server.")
}

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// Insert a user directly, without the default categories.
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            name: "Test".to_owned(),
            email: parse_email(email).expect("Invalid test email."),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user.")
}

/// Insert a transaction for today with the same type as `category`.
pub(crate) fn insert_test_transaction(
    connection: &Connection,
    user_id: UserID,
    category: &Category,
    cents: i64,
) -> Transaction {
    create_transaction(
        user_id,
        NewTransaction {
            description: "Test transaction".to_owned(),
            amount: Amount::new_unchecked(cents),
            entry_type: category.entry_type,
            date: OffsetDateTime::now_utc().date(),
            receipt_url: None,
            category_id: category.id,
        },
        connection,
    )
    .expect("Could not create test transaction.")
}

/// Register "Ana" with `email` through the API and return the session cookie.
pub(crate) async fn register_test_user(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::REGISTER)
        .json(&json!({ "name": "Ana", "email": email, "password": TEST_PASSWORD }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.cookie(COOKIE_TOKEN)
}

pub(crate) async fn create_test_category(
    server: &TestServer,
    cookie: &Cookie<'static>,
    name: &str,
    entry_type: &str,
) -> Category {
    let response = server
        .post(endpoints::CATEGORIES)
        .add_cookie(cookie.clone())
        .json(&json!({ "name": name, "type": entry_type }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Category>()
}

/// The names of the rejected fields in a validation error body, in order.
pub(crate) fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("Response has no validation errors.")
        .iter()
        .filter_map(|error| error["field"].as_str().map(str::to_owned))
        .collect()
}
