//! Transaction update endpoint.

use axum::{Extension, Json, extract::State};

use crate::{
    Error, UserID,
    db::lock_connection,
    extract::{JsonBody, ResourceId},
    transaction::{
        Transaction, TransactionState, TransactionUpdate, get_transaction, update_transaction,
    },
};

/// Change some of the fields of one of the logged in user's transactions.
///
/// Omitted fields keep their value and `"receiptUrl": null` removes the
/// receipt. Transactions owned by other users are reported as not found,
/// even when the body is malformed.
pub async fn update_transaction_endpoint(
    ResourceId(transaction_id): ResourceId,
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    body: Result<JsonBody<TransactionUpdate>, Error>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    get_transaction(transaction_id, user_id, &connection)?;
    let JsonBody(update) = body?;

    update_transaction(transaction_id, user_id, update, &connection).map(Json)
}
