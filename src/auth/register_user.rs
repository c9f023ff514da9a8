//! The endpoint for creating a new account.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword, ValidationErrors,
    auth::{
        NewUser, SessionState, create_user, parse_email, set_auth_cookie, validate_user_name,
        user::UserProfile,
    },
    category::create_default_categories,
    db::lock_connection,
    extract::JsonBody,
    validation::required,
};

/// The body of a registration request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name the user goes by.
    pub name: Option<String>,
    /// The address to log in with.
    pub email: Option<String>,
    /// The plaintext password.
    pub password: Option<String>,
}

/// Create a user, give them the default categories and log them in.
///
/// Responds with 201 and the new user's profile. Every invalid field is
/// reported at once, and an email that is already registered is reported as
/// an invalid "email" field.
pub async fn register_user(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<(StatusCode, PrivateCookieJar, Json<UserProfile>), Error> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(
        "name",
        form.name
            .as_deref()
            .ok_or_else(|| required("name"))
            .and_then(validate_user_name),
    );
    let email = errors.check(
        "email",
        form.email
            .as_deref()
            .ok_or_else(|| required("email"))
            .and_then(parse_email),
    );
    let password = errors.check(
        "password",
        form.password
            .as_deref()
            .ok_or_else(|| required("password"))
            .and_then(ValidatedPassword::new),
    );

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(Error::Validation(errors));
    };

    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        let transaction = connection.unchecked_transaction()?;

        let user = create_user(
            NewUser {
                name,
                email,
                password_hash,
            },
            &transaction,
        )?;
        create_default_categories(user.id, &transaction)?;

        transaction.commit()?;
        user
    };

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(user.profile())))
}
