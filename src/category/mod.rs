//! Categories group a user's transactions, e.g. 'Food' or 'Salary'.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    count_category_transactions, create_category, create_category_table,
    create_default_categories, delete_category, find_category, get_categories, get_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryForm, CategoryName, CategorySummary, Color, NewCategory};
pub use edit::update_category_endpoint;
pub use list::{get_category_endpoint, list_categories_endpoint};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
