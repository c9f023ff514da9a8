//! Opening and closing the application database.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, category::create_category_table,
    transaction::create_transaction_table,
};

/// Create the tables for users, categories and transactions if they do not
/// exist yet and enable foreign key enforcement.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Close the shared database connection once the server no longer needs it.
///
/// If other handles to the connection are still alive, the connection is left
/// to close when the last handle is dropped.
///
/// # Errors
/// Returns an [Error::SqlError] if SQLite reports an error while closing, or
/// [Error::DatabaseLockError] if the lock was poisoned.
pub fn close(db_connection: Arc<Mutex<Connection>>) -> Result<(), Error> {
    let mutex = match Arc::try_unwrap(db_connection) {
        Ok(mutex) => mutex,
        Err(shared) => {
            tracing::warn!(
                "Database connection is still shared by {} other handle(s), it will close when they are dropped.",
                Arc::strong_count(&shared) - 1
            );
            return Ok(());
        }
    };

    let connection = mutex.into_inner().map_err(|error| {
        tracing::error!("Database lock was poisoned: {error}");
        Error::DatabaseLockError
    })?;

    connection
        .close()
        .map_err(|(_, error)| Error::SqlError(error))?;

    tracing::info!("Database connection closed.");

    Ok(())
}

/// Acquire the lock on the shared connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock was poisoned by a panic in
/// another request.
pub(crate) fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
