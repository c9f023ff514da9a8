//! The endpoint for logging in with an email and password.

use axum::{Json, extract::State};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error, ValidationErrors,
    auth::{
        SessionState, get_user_by_email, parse_email, set_auth_cookie, user::UserProfile,
    },
    db::lock_connection,
    extract::JsonBody,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The body of a log-in request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    /// The email the user registered with.
    pub email: Option<String>,
    /// The plaintext password.
    pub password: Option<String>,
    /// Keep the session alive for a week instead of the configured duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests via the POST method.
///
/// On success the session cookie is set and the user's profile is returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing.
/// - The email is not registered or the password is not correct. Both cases
///   give the same [Error::InvalidCredentials].
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<LogInData>,
) -> Result<(PrivateCookieJar, Json<UserProfile>), Error> {
    let (Some(raw_email), Some(password)) = (user_data.email, user_data.password) else {
        let mut errors = ValidationErrors::new();
        errors.add("email", "email and password are required");
        errors.add("password", "email and password are required");
        return Err(Error::Validation(errors));
    };

    let email = parse_email(&raw_email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if user_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;

    Ok((jar, Json(user.profile())))
}
