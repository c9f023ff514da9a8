//! Transaction deletion endpoint.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::{
    Error, UserID,
    db::lock_connection,
    extract::ResourceId,
    transaction::{TransactionState, delete_transaction},
};

/// Delete one of the logged in user's transactions.
pub async fn delete_transaction_endpoint(
    ResourceId(transaction_id): ResourceId,
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, user_id, &connection)?;

    tracing::info!("User {user_id} deleted transaction {transaction_id}");

    Ok(Json(json!({ "message": "Transaction deleted successfully." })))
}
