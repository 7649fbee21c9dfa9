//! Accounts, sessions and the middleware that protects routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use sign_up::{get_sign_up_page, sign_up};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username};
