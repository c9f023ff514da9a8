//! Endpoints for reading transactions.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error, UserID, ValidationErrors,
    date_format::parse_date,
    db::lock_connection,
    entry_type::EntryType,
    extract::ResourceId,
    pagination::{Page, PaginationConfig},
    transaction::{
        Transaction, TransactionFilter, TransactionState, TransactionWithCategory,
        count_transactions, get_transaction, parse_category_id, query_transactions,
        summary::non_blank,
    },
};

/// The raw query parameters of the transaction listing. Blank values are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub category_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ListParams {
    fn validate(self, config: &PaginationConfig) -> Result<(TransactionFilter, Page), Error> {
        let mut errors = ValidationErrors::new();

        let number = errors.check("page", config.parse_page(non_blank(self.page.as_deref())));
        let limit = errors.check(
            "limit",
            config.parse_limit(non_blank(self.limit.as_deref())),
        );
        let entry_type = errors.check(
            "type",
            non_blank(self.entry_type.as_deref())
                .map(str::parse::<EntryType>)
                .transpose(),
        );
        let category_id = errors.check(
            "categoryId",
            non_blank(self.category_id.as_deref())
                .map(|raw| parse_category_id(&Value::from(raw)))
                .transpose(),
        );
        let from = errors.check(
            "from",
            non_blank(self.from.as_deref())
                .map(|raw| parse_date("from", raw))
                .transpose(),
        );
        let to = errors.check(
            "to",
            non_blank(self.to.as_deref())
                .map(|raw| parse_date("to", raw))
                .transpose(),
        );

        if let (Some(Some(from)), Some(Some(to))) = (from, to) {
            if to < from {
                errors.add("to", "to must not be before from");
            }
        }

        match (number, limit, entry_type, category_id, from, to) {
            (Some(number), Some(limit), Some(entry_type), Some(category_id), Some(from), Some(to))
                if errors.is_empty() =>
            {
                Ok((
                    TransactionFilter {
                        entry_type,
                        category_id,
                        from,
                        to,
                    },
                    Page { number, limit },
                ))
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// One page of a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionWithCategory>,
    /// The number of matching transactions across all pages.
    pub total: i64,
    pub page: u64,
    pub limit: u64,
}

/// List the logged in user's transactions, newest first.
///
/// Supports `page`, `limit`, `type`, `categoryId`, `from` and `to` query parameters.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<ListParams>,
) -> Result<Json<TransactionPage>, Error> {
    let (filter, page) = params.validate(&state.pagination_config)?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = query_transactions(user_id, &filter, page, &connection)?;
    let total = count_transactions(user_id, &filter, &connection)?;

    Ok(Json(TransactionPage {
        transactions,
        total,
        page: page.number,
        limit: page.limit,
    }))
}

/// Get one of the logged in user's transactions.
pub async fn get_transaction_endpoint(
    ResourceId(transaction_id): ResourceId,
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}

#[cfg(test)]
mod list_params_tests {
    use time::macros::date;

    use crate::{
        Error, entry_type::EntryType, pagination::PaginationConfig,
        transaction::TransactionFilter,
    };

    use super::ListParams;

    #[test]
    fn defaults_to_first_page_without_filters() {
        let (filter, page) = ListParams::default()
            .validate(&PaginationConfig::default())
            .unwrap();

        assert_eq!(filter, TransactionFilter::default());
        assert_eq!(page.number, 1);
        assert_eq!(page.limit, 50);
    }

    #[test]
    fn parses_filters() {
        let params = ListParams {
            page: Some("2".to_owned()),
            limit: Some("10".to_owned()),
            entry_type: Some("income".to_owned()),
            category_id: Some("7".to_owned()),
            from: Some("2025-01-01".to_owned()),
            to: Some("2025-01-31".to_owned()),
        };

        let (filter, page) = params.validate(&PaginationConfig::default()).unwrap();

        assert_eq!(filter.entry_type, Some(EntryType::Income));
        assert_eq!(filter.category_id, Some(7));
        assert_eq!(filter.from, Some(date!(2025 - 01 - 01)));
        assert_eq!(filter.to, Some(date!(2025 - 01 - 31)));
        assert_eq!(page.number, 2);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn rejects_bad_values() {
        let params = ListParams {
            page: Some("0".to_owned()),
            limit: Some("501".to_owned()),
            entry_type: Some("gift".to_owned()),
            category_id: Some("food".to_owned()),
            from: Some("2025-02-01".to_owned()),
            to: Some("2025-01-01".to_owned()),
        };

        let Err(Error::Validation(errors)) = params.validate(&PaginationConfig::default()) else {
            panic!("want validation error");
        };

        for field in ["page", "limit", "type", "categoryId", "to"] {
            assert!(errors.contains(field), "want error on {field}");
        }
    }
}
