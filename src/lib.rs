//! Spendwise is a web client for tracking personal income and expenses.
//!
//! All durable state lives in a remote REST backend; this crate renders HTML
//! pages over that API, keeping the bearer token for the current session in
//! an encrypted cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod register_user;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use api::ApiClient;
pub use app_state::AppState;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{alert::Alert, internal_server_error::render_internal_server_error, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided a username and password the API did not accept.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The stored session has expired, or the API rejected the bearer token
    /// with a 401 or 403.
    ///
    /// The client responds by logging the user out and redirecting to the
    /// log-in page.
    #[error("the session is no longer valid")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The API could not be reached at all (connection refused, DNS failure,
    /// timeout).
    #[error("could not reach the finance API: {0}")]
    ApiUnreachable(String),

    /// The underlying HTTP client could not be constructed.
    #[error("could not build the API client: {0}")]
    ApiClientBuild(String),

    /// The API answered with 400 and a reason.
    ///
    /// The string is the `detail` field of the response body when present,
    /// otherwise the raw body text.
    #[error("the API rejected the request: {0}")]
    Rejected(String),

    /// The API answered with a status the client does not handle.
    #[error("the API returned an unexpected status code {0}")]
    UnexpectedStatus(u16),

    /// The API response body could not be decoded as the expected JSON shape.
    #[error("could not decode the API response: {0}")]
    InvalidResponse(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A zero, negative, or non-finite amount was submitted.
    #[error("the amount must be a positive number")]
    InvalidAmount,

    /// A budget already exists for the submitted calendar month.
    #[error("a budget for {0} already exists")]
    DuplicateBudgetMonth(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The session could not be serialized into, or parsed out of, the
    /// session cookie.
    #[error("could not read or write the session cookie: {0}")]
    CookieFormat(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Error::InvalidResponse(value.to_string());
        }

        // Strip the URL so log lines do not repeat the full query string.
        Error::ApiUnreachable(value.without_url().to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Route through log-out so the stale cookie is cleared before the
            // user lands on the log-in page.
            Error::Unauthorized | Error::CookieMissing => {
                Redirect::to(endpoints::LOG_OUT).into_response()
            }
            Error::ApiUnreachable(reason) => {
                tracing::error!("The finance API could not be reached: {reason}");
                render_internal_server_error(
                    "Service Unavailable",
                    "The finance API could not be reached. Try again shortly.",
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::Unauthorized | Error::CookieMissing => (
                HxRedirect(endpoints::LOG_OUT.to_owned()),
                StatusCode::UNAUTHORIZED,
            )
                .into_response(),
            Error::NotFound => Alert::error(
                "Not found",
                "The record could not be found. \
                Try refreshing the page to see if it has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::FutureDate(date) => Alert::error(
                "Invalid transaction date",
                &format!("{date} is a date in the future, which is not allowed."),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            Error::InvalidAmount => {
                Alert::error("Invalid amount", "The amount must be a positive number.")
                    .into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::EmptyCategoryName => {
                Alert::error("Invalid category name", "Category names cannot be empty.")
                    .into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::DuplicateBudgetMonth(month) => Alert::error(
                "Duplicate budget",
                &format!(
                    "A budget for {month} already exists. \
                    Edit or delete the existing budget instead."
                ),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            Error::Rejected(detail) => Alert::error("The API rejected the request", &detail)
                .into_response_with(StatusCode::BAD_REQUEST),
            Error::ApiUnreachable(reason) => {
                tracing::error!("The finance API could not be reached: {reason}");
                Alert::error(
                    "Service unavailable",
                    "The finance API could not be reached. Try again shortly.",
                )
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
