//! Category creation endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    Error, UserID,
    category::{Category, CategoryForm, CategoryState, Color, create_category},
    db::lock_connection,
    extract::JsonBody,
};

/// Create a category owned by the logged in user.
///
/// Responds with 201 and the new category. The colour defaults to black.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let new_category = form.validate(Color::default())?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(user_id, new_category, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}
