//! Transaction creation endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    db::lock_connection,
    extract::JsonBody,
    transaction::{Transaction, TransactionForm, TransactionState, create_transaction},
};

/// Record a transaction for the logged in user.
///
/// Field errors are reported together. The category is checked afterwards,
/// so a request with bad fields and a bad category only reports the fields.
/// The date defaults to today (UTC).
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let today = OffsetDateTime::now_utc().date();
    let new_transaction = form.validate(today)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(user_id, new_transaction, &connection)?;

    tracing::debug!(
        "User {user_id} created transaction {} for {} cents",
        transaction.id,
        transaction.amount.cents()
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
