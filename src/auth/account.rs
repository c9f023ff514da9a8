//! Endpoints for the logged in user's own account.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Error, PasswordHash, ValidatedPassword, ValidationErrors,
    auth::{SessionState, UserID, get_user_by_id, update_password_hash, user::UserProfile},
    db::lock_connection,
    extract::JsonBody,
    validation::required,
};

/// Get the profile of the logged in user.
pub async fn get_current_user(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserProfile>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(user.profile())),
        // A valid cookie for a user that no longer exists, e.g. after the database was replaced.
        Err(Error::NotFound) => Err(Error::Unauthenticated),
        Err(error) => Err(error),
    }
}

/// The body of a change password request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    /// The password the user currently logs in with.
    pub current_password: Option<String>,
    /// The password to replace it with.
    pub new_password: Option<String>,
}

/// Replace the logged in user's password after checking their current one.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the current password is wrong,
/// or an [Error::Validation] if a field is missing or the new password is invalid.
pub async fn change_password(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<ChangePasswordForm>,
) -> Result<Json<Value>, Error> {
    let mut errors = ValidationErrors::new();

    let current_password = errors.check(
        "currentPassword",
        form.current_password.ok_or_else(|| required("currentPassword")),
    );
    let new_password = errors.check(
        "newPassword",
        form.new_password
            .as_deref()
            .ok_or_else(|| required("newPassword"))
            .and_then(ValidatedPassword::new),
    );

    let (Some(current_password), Some(new_password)) = (current_password, new_password) else {
        return Err(Error::Validation(errors));
    };

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_id(user_id, &connection)?
    };

    let is_password_valid = user
        .password_hash
        .verify(&current_password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let password_hash = PasswordHash::new(new_password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    update_password_hash(user_id, &password_hash, &connection)?;

    tracing::info!("User {user_id} changed their password");

    Ok(Json(json!({ "message": "Password updated." })))
}

#[cfg(test)]
mod account_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::user::UserProfile,
        endpoints,
        test_utils::{error_fields, get_test_server, register_test_user},
    };

    #[tokio::test]
    async fn get_current_user_returns_profile() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;

        let response = server.get(endpoints::ME).add_cookie(cookie).await;

        response.assert_status_ok();
        assert_eq!(response.json::<UserProfile>().email, "ana@x.io");
    }

    #[tokio::test]
    async fn get_current_user_requires_session() {
        let server = get_test_server();

        server.get(endpoints::ME).await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn change_password_then_log_in_with_new_password() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;

        server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({ "currentPassword": "secret1", "newPassword": "secret2" }))
            .await
            .assert_status_ok();

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "ana@x.io", "password": "secret1" }))
            .await
            .assert_status_unauthorized();
        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "ana@x.io", "password": "secret2" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn change_password_rejects_wrong_current_password() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;

        server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({ "currentPassword": "nope!!", "newPassword": "secret2" }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn change_password_validates_new_password() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;

        let response = server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({ "currentPassword": "secret1", "newPassword": "123" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_fields(&response.json::<Value>()), ["newPassword"]);
    }
}
