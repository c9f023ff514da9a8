//! Income and expense totals for a date range.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID, ValidationErrors,
    category::{CategoryName, CategorySummary, Color},
    date_format::parse_date,
    db::lock_connection,
    entry_type::EntryType,
    transaction::{TransactionState, serialize_cents},
};

/// The query parameters of the summary endpoint. Both dates are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// The total amount and number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: CategorySummary,
    #[serde(serialize_with = "serialize_cents")]
    pub total: i64,
    pub transaction_count: i64,
}

/// Totals over a user's transactions. Amounts are serialized in dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(serialize_with = "serialize_cents")]
    pub income: i64,
    #[serde(serialize_with = "serialize_cents")]
    pub expense: i64,
    /// Income minus expense, negative when more went out than came in.
    #[serde(serialize_with = "serialize_cents")]
    pub balance: i64,
    pub transaction_count: i64,
    /// Ordered by type then category name.
    pub categories: Vec<CategoryTotal>,
}

impl Summary {
    fn from_totals(categories: Vec<CategoryTotal>) -> Self {
        let mut income = 0;
        let mut expense = 0;
        let mut transaction_count = 0;

        for category_total in &categories {
            match category_total.category.entry_type {
                EntryType::Income => income += category_total.total,
                EntryType::Expense => expense += category_total.total,
            }

            transaction_count += category_total.transaction_count;
        }

        Self {
            income,
            expense,
            balance: income - expense,
            transaction_count,
            categories,
        }
    }
}

/// Summarise the logged in user's transactions, optionally limited to `from..=to`.
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, Error> {
    let mut errors = ValidationErrors::new();
    let from = match non_blank(params.from.as_deref()) {
        None => Some(None),
        Some(raw) => errors.check("from", parse_date("from", raw).map(Some)),
    };
    let to = match non_blank(params.to.as_deref()) {
        None => Some(None),
        Some(raw) => errors.check("to", parse_date("to", raw).map(Some)),
    };

    let (Some(from), Some(to)) = (from, to) else {
        return Err(Error::Validation(errors));
    };

    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            errors.add("to", "to must not be before from");
        }
    }

    errors.into_result()?;

    let connection = lock_connection(&state.db_connection)?;

    get_summary(user_id, from, to, &connection).map(Json)
}

pub(super) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Total the transactions owned by `user_id` dated within `from..=to`.
pub fn get_summary(
    user_id: UserID,
    from: Option<Date>,
    to: Option<Date>,
    connection: &Connection,
) -> Result<Summary, Error> {
    let categories = connection
        .prepare(
            "SELECT category.id, category.name, category.type, category.color,
                SUM(\"transaction\".amount), COUNT(\"transaction\".id)
            FROM \"transaction\"
            INNER JOIN category ON category.id = \"transaction\".category_id
            WHERE \"transaction\".user_id = :user_id
                AND (:from IS NULL OR \"transaction\".date >= :from)
                AND (:to IS NULL OR \"transaction\".date <= :to)
            GROUP BY category.id
            ORDER BY category.type ASC, category.name ASC, category.id ASC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":from": from,
                ":to": to,
            },
            |row| {
                let raw_name: String = row.get(1)?;
                let raw_color: String = row.get(3)?;

                Ok(CategoryTotal {
                    category: CategorySummary {
                        id: row.get(0)?,
                        name: CategoryName::new_unchecked(&raw_name),
                        entry_type: row.get(2)?,
                        color: Color::new_unchecked(&raw_color),
                    },
                    total: row.get(4)?,
                    transaction_count: row.get(5)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok(Summary::from_totals(categories))
}

#[cfg(test)]
mod summary_tests {
    use time::macros::date;

    use crate::{
        category::{Category, create_default_categories},
        test_utils::{get_test_connection, insert_test_transaction, insert_test_user},
    };

    use super::get_summary;

    fn category_named(categories: &[Category], name: &str) -> Category {
        categories
            .iter()
            .find(|category| category.name.as_ref() == name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn totals_income_and_expense() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let categories = create_default_categories(user.id, &conn).unwrap();
        let food = category_named(&categories, "Food");
        let salary = category_named(&categories, "Salary");
        insert_test_transaction(&conn, user.id, &food, 1250);
        insert_test_transaction(&conn, user.id, &food, 750);
        insert_test_transaction(&conn, user.id, &salary, 300_000);

        let summary = get_summary(user.id, None, None, &conn).unwrap();

        assert_eq!(summary.income, 300_000);
        assert_eq!(summary.expense, 2000);
        assert_eq!(summary.balance, 298_000);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, food.summary());
        assert_eq!(summary.categories[0].total, 2000);
        assert_eq!(summary.categories[0].transaction_count, 2);
        assert_eq!(summary.categories[1].category, salary.summary());
    }

    #[test]
    fn empty_summary_is_zero() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");

        let summary = get_summary(user.id, None, None, &conn).unwrap();

        assert_eq!(summary.balance, 0);
        assert_eq!(summary.transaction_count, 0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn excludes_transactions_outside_range() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn, "ana@x.io");
        let food = category_named(&create_default_categories(user.id, &conn).unwrap(), "Food");
        insert_test_transaction(&conn, user.id, &food, 1250);

        let summary = get_summary(
            user.id,
            Some(date!(1990 - 01 - 01)),
            Some(date!(1990 - 12 - 31)),
            &conn,
        )
        .unwrap();

        assert_eq!(summary.transaction_count, 0);
    }
}
