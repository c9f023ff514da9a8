//! Category update endpoint.

use axum::{Extension, Json, extract::State};

use crate::{
    Error, UserID,
    category::{Category, CategoryForm, CategoryState, get_category, update_category},
    db::lock_connection,
    extract::{JsonBody, ResourceId},
};

/// Replace the name, type and colour of one of the logged in user's categories.
///
/// An omitted colour keeps the current colour. Categories owned by other
/// users are reported as not found, even when the body is malformed.
pub async fn update_category_endpoint(
    ResourceId(category_id): ResourceId,
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    body: Result<JsonBody<CategoryForm>, Error>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_category(category_id, user_id, &connection)?;
    let JsonBody(form) = body?;

    update_category(category_id, user_id, form, &connection).map(Json)
}
