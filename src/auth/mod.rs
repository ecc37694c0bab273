//! Session handling for the client.
//!
//! The remote API issues a bearer token pair at log-in; this module stores it
//! in an encrypted private cookie and guards the protected routes.

mod cookie;
mod middleware;
mod redirect;
mod session;

pub use cookie::{
    DEFAULT_SESSION_DURATION, get_session_from_cookies, invalidate_session_cookie,
    set_session_cookie,
};
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use redirect::normalize_redirect_url;
pub use session::Session;

pub(crate) use redirect::build_log_in_redirect_url;

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
