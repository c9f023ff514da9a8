//! Users, credentials and the session cookie.

mod account;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod session_state;
mod token;
mod user;

pub use account::{change_password, get_current_user};
pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::{invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use session_state::SessionState;
pub(super) use token::Token;
pub use user::{
    NewUser, User, UserID, UserProfile, create_user, create_user_table, get_user_by_email,
    get_user_by_id, parse_email, update_password_hash, validate_user_name,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
