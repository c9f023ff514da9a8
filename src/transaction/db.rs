//! Database operations for transactions.
//!
//! Like categories, every function is scoped to the user acting on the
//! transaction and treats other users' transactions as missing.

use rusqlite::{Connection, OptionalExtension, Row, named_params};
use time::Date;

use crate::{
    Error, UserID, ValidationErrors,
    category::{CategoryName, CategorySummary, Color, find_category},
    database_id::{CategoryId, TransactionId},
    entry_type::EntryType,
    pagination::Page,
    transaction::{Amount, NewTransaction, Transaction, TransactionUpdate, TransactionWithCategory},
};

/// Optional conditions for listing a user's transactions. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub entry_type: Option<EntryType>,
    pub category_id: Option<CategoryId>,
    /// Inclusive start date.
    pub from: Option<Date>,
    /// Inclusive end date.
    pub to: Option<Date>,
}

const FILTER_CLAUSE: &str = "\"transaction\".user_id = :user_id
    AND (:type IS NULL OR \"transaction\".type = :type)
    AND (:category_id IS NULL OR \"transaction\".category_id = :category_id)
    AND (:from IS NULL OR \"transaction\".date >= :from)
    AND (:to IS NULL OR \"transaction\".date <= :to)";

/// Check that `category_id` names a category owned by `user_id` with the same type as the transaction.
///
/// # Errors
///
/// Returns an [Error::Validation] on `categoryId` otherwise.
fn check_category(
    category_id: CategoryId,
    entry_type: EntryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category) = find_category(category_id, user_id, connection)? else {
        return Err(ValidationErrors::single(
            "categoryId",
            "category does not exist",
        ));
    };

    if category.entry_type != entry_type {
        return Err(ValidationErrors::single(
            "categoryId",
            format!(
                "category is for {} but the transaction is {}",
                category.entry_type, entry_type
            ),
        ));
    }

    Ok(())
}

/// Create a transaction owned by `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::Validation] if the category does not belong to `user_id`
/// or its type differs from the transaction's type.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_category(
        transaction.category_id,
        transaction.entry_type,
        user_id,
        connection,
    )?;

    connection.execute(
        "INSERT INTO \"transaction\" (description, amount, type, date, receipt_url, category_id, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &transaction.description,
            transaction.amount.cents(),
            transaction.entry_type,
            transaction.date,
            &transaction.receipt_url,
            transaction.category_id,
            user_id.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        description: transaction.description,
        amount: transaction.amount,
        entry_type: transaction.entry_type,
        date: transaction.date,
        receipt_url: transaction.receipt_url,
        category_id: transaction.category_id,
        user_id,
    })
}

/// Look up a transaction owned by `user_id`.
pub fn find_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, type, date, receipt_url, category_id, user_id
            FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a single transaction owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    find_transaction(transaction_id, user_id, connection)?.ok_or(Error::NotFound)
}

/// Retrieve one page of the transactions owned by `user_id` that match `filter`,
/// newest first, each with its category embedded.
pub fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    page: Page,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    let query = format!(
        "SELECT \"transaction\".id, description, amount, \"transaction\".type, date, receipt_url,
            category_id, \"transaction\".user_id, category.name, category.type, category.color
        FROM \"transaction\"
        INNER JOIN category ON category.id = \"transaction\".category_id
        WHERE {FILTER_CLAUSE}
        ORDER BY date DESC, \"transaction\".id DESC
        LIMIT :limit OFFSET :offset"
    );
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    connection
        .prepare(&query)?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":type": filter.entry_type,
                ":category_id": filter.category_id,
                ":from": filter.from,
                ":to": filter.to,
                ":limit": limit,
                ":offset": offset,
            },
            |row| {
                let transaction = map_transaction_row(row)?;
                let raw_name: String = row.get(8)?;
                let raw_color: String = row.get(10)?;
                let category = CategorySummary {
                    id: transaction.category_id,
                    name: CategoryName::new_unchecked(&raw_name),
                    entry_type: row.get(9)?,
                    color: Color::new_unchecked(&raw_color),
                };

                Ok(TransactionWithCategory {
                    transaction,
                    category,
                })
            },
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Count the transactions owned by `user_id` that match `filter`, ignoring paging.
pub fn count_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<i64, Error> {
    let query = format!("SELECT COUNT(id) FROM \"transaction\" WHERE {FILTER_CLAUSE}");

    connection
        .query_row(
            &query,
            named_params! {
                ":user_id": user_id.as_i64(),
                ":type": filter.entry_type,
                ":category_id": filter.category_id,
                ":from": filter.from,
                ":to": filter.to,
            },
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Merge `update` into a transaction owned by `user_id` and save the result.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the transaction does not exist or belongs to another
///   user, before any field is validated.
/// - [Error::Validation] if any field is invalid, or the resulting category
///   does not belong to `user_id` or has a different type.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let current = get_transaction(transaction_id, user_id, connection)?;
    let changes = update.apply(&current)?;

    check_category(
        changes.category_id,
        changes.entry_type,
        user_id,
        connection,
    )?;

    connection.execute(
        "UPDATE \"transaction\"
        SET description = ?1, amount = ?2, type = ?3, date = ?4, receipt_url = ?5, category_id = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            &changes.description,
            changes.amount.cents(),
            changes.entry_type,
            changes.date,
            &changes.receipt_url,
            changes.category_id,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Transaction {
        id: current.id,
        description: changes.description,
        amount: changes.amount,
        entry_type: changes.entry_type,
        date: changes.date,
        receipt_url: changes.receipt_url,
        category_id: changes.category_id,
        user_id,
    })
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_transaction(transaction_id, user_id, connection)?;

    connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Initialize the transaction table and indexes.
///
/// Must run after the user and category tables have been created.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            date TEXT NOT NULL,
            receipt_url TEXT,
            category_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Map a row whose first eight columns are the transaction columns in table order.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: Amount::new_unchecked(row.get(2)?),
        entry_type: row.get(3)?,
        date: row.get(4)?,
        receipt_url: row.get(5)?,
        category_id: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
    })
}

#[cfg(test)]
mod transaction_query_tests {
    use time::{Date, Duration, macros::date};

    use crate::{
        Error,
        category::{Category, create_default_categories},
        entry_type::EntryType,
        pagination::Page,
        test_utils::{get_test_connection, insert_test_transaction, insert_test_user},
        transaction::{Amount, NewTransaction, TransactionUpdate},
    };

    use super::{
        TransactionFilter, count_transactions, create_transaction, delete_transaction,
        get_transaction, query_transactions, update_transaction,
    };

    fn category_named(categories: &[Category], name: &str) -> Category {
        categories
            .iter()
            .find(|category| category.name.as_ref() == name)
            .cloned()
            .unwrap()
    }

    fn new_transaction(category: &Category, cents: i64, date: Date) -> NewTransaction {
        NewTransaction {
            description: "Lunch".to_owned(),
            amount: Amount::new_unchecked(cents),
            entry_type: category.entry_type,
            date,
            receipt_url: None,
            category_id: category.id,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let food = category_named(&create_default_categories(user.id, &conn).unwrap(), "Food");

        let created = create_transaction(
            user.id,
            new_transaction(&food, 1250, date!(2025 - 01 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(get_transaction(created.id, user.id, &conn), Ok(created));
    }

    #[test]
    fn create_rejects_foreign_category() {
        let conn = get_test_connection();
        let ana = insert_test_user(&conn, "ana@x.io");
        let bob = insert_test_user(&conn, "bob@x.io");
        let anas_food = category_named(&create_default_categories(ana.id, &conn).unwrap(), "Food");

        let result = create_transaction(
            bob.id,
            new_transaction(&anas_food, 100, date!(2025 - 01 - 05)),
            &conn,
        );

        let Err(Error::Validation(errors)) = result else {
            panic!("want validation error, got {result:?}");
        };
        assert!(errors.contains("categoryId"));
    }

    #[test]
    fn create_rejects_category_of_other_type() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let salary = category_named(&create_default_categories(user.id, &conn).unwrap(), "Salary");
        let mut transaction = new_transaction(&salary, 100, date!(2025 - 01 - 05));
        transaction.entry_type = EntryType::Expense;

        let result = create_transaction(user.id, transaction, &conn);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn get_foreign_transaction_is_not_found() {
        let conn = get_test_connection();
        let ana = insert_test_user(&conn, "ana@x.io");
        let bob = insert_test_user(&conn, "bob@x.io");
        let food = category_named(&create_default_categories(ana.id, &conn).unwrap(), "Food");
        let transaction = insert_test_transaction(&conn, ana.id, &food, 500);

        assert_eq!(
            get_transaction(transaction.id, bob.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn query_orders_newest_first_and_pages() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let food = category_named(&create_default_categories(user.id, &conn).unwrap(), "Food");
        for day in 1..=5 {
            let date = date!(2025 - 01 - 01) + Duration::days(day - 1);
            create_transaction(user.id, new_transaction(&food, day * 100, date), &conn).unwrap();
        }
        let filter = TransactionFilter::default();

        let first_page =
            query_transactions(user.id, &filter, Page { number: 1, limit: 2 }, &conn).unwrap();
        let last_page =
            query_transactions(user.id, &filter, Page { number: 3, limit: 2 }, &conn).unwrap();

        let first_dates: Vec<_> = first_page
            .iter()
            .map(|row| row.transaction.date)
            .collect();
        assert_eq!(first_dates, [date!(2025 - 01 - 05), date!(2025 - 01 - 04)]);
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].transaction.date, date!(2025 - 01 - 01));
        assert_eq!(first_page[0].category, food.summary());
        assert_eq!(count_transactions(user.id, &filter, &conn), Ok(5));
    }

    #[test]
    fn query_applies_filters() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let categories = create_default_categories(user.id, &conn).unwrap();
        let food = category_named(&categories, "Food");
        let salary = category_named(&categories, "Salary");
        create_transaction(user.id, new_transaction(&food, 100, date!(2025 - 01 - 05)), &conn)
            .unwrap();
        create_transaction(user.id, new_transaction(&food, 200, date!(2025 - 02 - 05)), &conn)
            .unwrap();
        create_transaction(
            user.id,
            new_transaction(&salary, 300, date!(2025 - 02 - 10)),
            &conn,
        )
        .unwrap();

        let expenses = TransactionFilter {
            entry_type: Some(EntryType::Expense),
            ..Default::default()
        };
        let february = TransactionFilter {
            from: Some(date!(2025 - 02 - 01)),
            to: Some(date!(2025 - 02 - 28)),
            ..Default::default()
        };
        let by_category = TransactionFilter {
            category_id: Some(salary.id),
            ..Default::default()
        };

        assert_eq!(count_transactions(user.id, &expenses, &conn), Ok(2));
        assert_eq!(count_transactions(user.id, &february, &conn), Ok(2));
        assert_eq!(count_transactions(user.id, &by_category, &conn), Ok(1));
    }

    #[test]
    fn query_excludes_other_users() {
        let conn = get_test_connection();
        let ana = insert_test_user(&conn, "ana@x.io");
        let bob = insert_test_user(&conn, "bob@x.io");
        let food = category_named(&create_default_categories(ana.id, &conn).unwrap(), "Food");
        insert_test_transaction(&conn, ana.id, &food, 500);

        let got = query_transactions(
            bob.id,
            &TransactionFilter::default(),
            Page { number: 1, limit: 50 },
            &conn,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn update_changes_only_given_fields() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let food = category_named(&create_default_categories(user.id, &conn).unwrap(), "Food");
        let transaction = insert_test_transaction(&conn, user.id, &food, 500);
        let update = TransactionUpdate {
            description: Some("Dinner".to_owned()),
            ..Default::default()
        };

        let updated = update_transaction(transaction.id, user.id, update, &conn).unwrap();

        assert_eq!(updated.description, "Dinner");
        assert_eq!(updated.amount, transaction.amount);
        assert_eq!(get_transaction(transaction.id, user.id, &conn), Ok(updated));
    }

    #[test]
    fn update_foreign_transaction_is_not_found() {
        let conn = get_test_connection();
        let ana = insert_test_user(&conn, "ana@x.io");
        let bob = insert_test_user(&conn, "bob@x.io");
        let food = category_named(&create_default_categories(ana.id, &conn).unwrap(), "Food");
        let transaction = insert_test_transaction(&conn, ana.id, &food, 500);

        let result = update_transaction(
            transaction.id,
            bob.id,
            TransactionUpdate::default(),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_only_own_transaction() {
        let conn = get_test_connection();
        let ana = insert_test_user(&conn, "ana@x.io");
        let bob = insert_test_user(&conn, "bob@x.io");
        let food = category_named(&create_default_categories(ana.id, &conn).unwrap(), "Food");
        let transaction = insert_test_transaction(&conn, ana.id, &food, 500);

        assert_eq!(
            delete_transaction(transaction.id, bob.id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(delete_transaction(transaction.id, ana.id, &conn), Ok(()));
        assert_eq!(
            get_transaction(transaction.id, ana.id, &conn),
            Err(Error::NotFound)
        );
    }
}
