//! Endpoints for reading categories.

use axum::{Extension, Json, extract::State};

use crate::{
    Error, UserID,
    category::{Category, CategoryState, get_categories, get_category},
    db::lock_connection,
    extract::ResourceId,
};

/// List the logged in user's categories, ordered by type then name.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_categories(user_id, &connection).map(Json)
}

/// Get one of the logged in user's categories.
pub async fn get_category_endpoint(
    ResourceId(category_id): ResourceId,
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, user_id, &connection).map(Json)
}
