//! Category deletion endpoint.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::{
    Error, UserID,
    category::{CategoryState, delete_category},
    db::lock_connection,
    extract::ResourceId,
};

/// Delete one of the logged in user's categories.
///
/// Refused while any transaction still uses the category.
pub async fn delete_category_endpoint(
    ResourceId(category_id): ResourceId,
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, user_id, &connection)?;

    tracing::info!("User {user_id} deleted category {category_id}");

    Ok(Json(json!({ "message": "Category deleted successfully." })))
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        category::Category,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_category, get_test_server, register_test_user},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn delete_unused_category_succeeds() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;
        let category = create_test_category(&server, &cookie, "Pets", "expense").await;

        server
            .delete(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        server
            .get(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(cookie)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_used_category_is_refused() {
        let server = get_test_server();
        let cookie = register_test_user(&server, "ana@x.io").await;
        let category = create_test_category(&server, &cookie, "Pets", "expense").await;
        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "description": "Cat food",
                "amount": 20,
                "type": "expense",
                "categoryId": category.id,
            }))
            .await
            .json::<Transaction>();

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(cookie.clone())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Cannot delete category with associated transactions."
        );
        let unchanged_category = server
            .get(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(cookie.clone())
            .await
            .json::<Category>();
        assert_eq!(unchanged_category, category);

        let unchanged_transaction = server
            .get(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_cookie(cookie)
            .await
            .json::<Transaction>();
        assert_eq!(unchanged_transaction, transaction);
        assert_eq!(unchanged_transaction.category_id, category.id);
    }

    #[tokio::test]
    async fn delete_foreign_category_is_not_found() {
        let server = get_test_server();
        let ana = register_test_user(&server, "ana@x.io").await;
        let bob = register_test_user(&server, "bob@x.io").await;
        let category = create_test_category(&server, &ana, "Pets", "expense").await;

        server
            .delete(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(bob)
            .await
            .assert_status_not_found();

        server
            .get(&format_endpoint(endpoints::CATEGORY, category.id))
            .add_cookie(ana)
            .await
            .assert_status_ok();
    }
}
