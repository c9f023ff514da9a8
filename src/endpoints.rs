//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use [format_endpoint].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";

/// The route for creating a new account.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/log_out";
/// The route for reading the logged in user.
pub const ME: &str = "/api/auth/me";
/// The route for changing the logged in user's password.
pub const PASSWORD: &str = "/api/auth/password";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to get, update and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for income and expense totals.
pub const TRANSACTION_SUMMARY: &str = "/api/transactions/summary";
/// The route to get, update and delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{category_id}' in '/api/categories/{category_id}'.
/// Only the first parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::HEALTH,
            endpoints::REGISTER,
            endpoints::LOG_IN,
            endpoints::LOG_OUT,
            endpoints::ME,
            endpoints::PASSWORD,
            endpoints::CATEGORIES,
            endpoints::CATEGORY,
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTION_SUMMARY,
            endpoints::TRANSACTION,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn replaces_parameter() {
        let formatted_path = format_endpoint(endpoints::CATEGORY, 42);

        assert_eq!(formatted_path, "/api/categories/42");
        assert_endpoint_is_valid_uri(&formatted_path);
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint("/hello/world", 1), "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert_endpoint_is_valid_uri(&formatted_path);
    }

    #[test]
    fn unclosed_parameter_runs_to_end() {
        assert_eq!(format_endpoint("/hello/{world", 7), "/hello/7");
    }
}
