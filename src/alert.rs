//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as htmx out-of-band swaps targeting the
//! `#alert-container` element that [crate::html::base] places on every page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A message swapped into the alert container of the current page.
#[derive(Debug, Clone)]
pub enum Alert {
    /// A green alert for a completed action.
    Success {
        /// The headline of the alert.
        message: String,
        /// Optional supporting text below the headline.
        details: String,
    },
    /// A red alert for a failed action.
    Error {
        /// The headline of the alert.
        message: String,
        /// Optional supporting text below the headline.
        details: String,
    },
}

impl Alert {
    /// Create a success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a success alert without details.
    pub fn success_simple(message: &str) -> Self {
        Self::success(message, "")
    }

    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    fn into_markup(self) -> Markup {
        let (color_style, message, details) = match self {
            Alert::Success { message, details } => (
                "text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
                message,
                details,
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="outerHTML"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class={ "p-4 mb-4 text-sm rounded-lg shadow " (color_style) }
                    role="alert"
                {
                    span class="font-medium" { (message) }

                    @if !details.is_empty() {
                        " " (details)
                    }
                }
            }
        }
    }

    /// Render this alert with a specific response status.
    pub fn into_response_with(self, status_code: StatusCode) -> Response {
        (status_code, self.into_markup()).into_response()
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::http::StatusCode;

    use super::Alert;

    #[test]
    fn success_alert_targets_alert_container() {
        let markup = Alert::success_simple("Transaction deleted successfully").into_markup();
        let html = markup.into_string();

        assert!(html.contains("id=\"alert-container\""));
        assert!(html.contains("hx-swap-oob"));
        assert!(html.contains("Transaction deleted successfully"));
    }

    #[test]
    fn error_alert_includes_details() {
        let response = Alert::error("Could not delete budget", "The budget could not be found.")
            .into_response_with(StatusCode::NOT_FOUND);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
