//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error,
    auth::{
        auth_guard, change_password, get_current_user, post_log_in, post_log_out, register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_category_endpoint,
        list_categories_endpoint, update_category_endpoint,
    },
    endpoints,
    health::get_health,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_summary_endpoint,
        get_transaction_endpoint, list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    // The summary route is static so it takes priority over `{transaction_id}`.
    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_current_user))
        .route(endpoints::PASSWORD, put(change_password))
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Allow a browser client served from `allowed_origin` to call the API with its session cookie.
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Unknown routes get the same JSON error as missing resources.
async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
