//! A personal finance tracker.
//!
//! Users register, log in, and record income and expense transactions against
//! their own categories. This library provides a JSON REST API backed by
//! SQLite. Every category and transaction belongs to exactly one user and is
//! only ever visible to that user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod date_format;
mod db;
mod endpoints;
mod entry_type;
mod extract;
mod health;
mod logging;
mod pagination;
mod rate_limit;
mod routing;
mod transaction;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    NewUser, PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    update_password_hash,
};
pub use category::{Category, CategoryForm, create_category, create_default_categories};
pub use db::{close as close_db, initialize as initialize_db};
pub use entry_type::EntryType;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use rate_limit::{RateLimitConfig, RateLimiter, rate_limit_middleware};
pub use routing::{build_router, cors_layer};
pub use transaction::{Amount, NewTransaction, Transaction, TransactionForm, create_transaction};
pub use validation::{FieldError, ValidationErrors};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields in the request were missing or invalid.
    ///
    /// Every violated field is listed so that the client can fix them all at once.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The email and password did not match a registered user.
    ///
    /// The same error is used for an unknown email and a wrong password so
    /// that clients cannot find out which emails are registered.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired session cookie.
    #[error("no valid session in the request")]
    Unauthenticated,

    /// The session cookie could not be created or read.
    #[error("could not handle the session cookie: {0}")]
    CookieError(String),

    /// A date time could not be formatted.
    #[error("could not format date time: {0}")]
    DateFormatError(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are reported with this error too, so
    /// the client cannot tell whether the resource exists at all.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a category that transactions still refer to.
    #[error("cannot delete category with associated transactions")]
    CategoryInUse,

    /// Tried to change the type of a category that transactions still refer to.
    #[error("cannot change the type of a category with associated transactions")]
    CategoryTypeInUse,

    /// The client has made too many requests recently.
    #[error("too many requests")]
    TooManyRequests,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Validation failed",
                    "errors": errors,
                }),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "The requested resource could not be found." }),
            ),
            Error::CategoryInUse => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Cannot delete category with associated transactions." }),
            ),
            Error::CategoryTypeInUse => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Cannot change the type of a category with associated transactions."
                }),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid email or password." }),
            ),
            Error::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "You must be logged in to access this resource." }),
            ),
            Error::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Too many requests, please try again later." }),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
