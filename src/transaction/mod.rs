//! Transactions record money coming in (income) or going out (expense).
//!
//! This module contains:
//! - The `Transaction` model with its cents-based `Amount`
//! - Database functions for storing, querying, and summarising transactions
//! - The JSON endpoints for transactions

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, pagination::PaginationConfig};

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod summary;

pub use create::create_transaction_endpoint;
pub use db::{
    TransactionFilter, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, find_transaction, get_transaction, query_transactions, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{
    Amount, NewTransaction, Transaction, TransactionForm, TransactionUpdate,
    TransactionWithCategory, parse_amount, parse_category_id, serialize_cents,
};
pub use edit::update_transaction_endpoint;
pub use list::{TransactionPage, get_transaction_endpoint, list_transactions_endpoint};
pub use summary::{CategoryTotal, Summary, get_summary, get_summary_endpoint};

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
