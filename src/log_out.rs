//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_session_cookie, endpoints};

/// Invalidate the session cookie and redirect the client to the log-in page.
///
/// This route is also the landing spot whenever the remote API rejects the
/// bearer token: clearing the cookie here is what makes a 401/403 from the
/// API behave as a client-side log-out.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
