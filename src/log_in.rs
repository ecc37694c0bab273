//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level cookie and redirect logic.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum::http::StatusCode;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    api::{self, ApiClient},
    auth::{Session, invalidate_session_cookie, normalize_redirect_url, set_session_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, log_in_register},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

/// How long the session cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_SESSION_DURATION: Duration = Duration::days(7);

/// The token pair issued by the remote API on a successful log-in.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The bearer token for subsequent API requests.
    pub access: String,
    /// The long-lived token for obtaining a new access token.
    pub refresh: String,
    /// The ID of the authenticated user.
    pub user_id: i64,
}

/// Request a token pair from the remote API.
///
/// # Errors
/// Returns [Error::Unauthorized] if the API does not accept the credentials.
pub async fn obtain_token(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<TokenResponse, Error> {
    #[derive(Serialize)]
    struct Credentials<'a> {
        username: &'a str,
        password: &'a str,
    }

    api.post_json(api::TOKEN, &Credentials { username, password }, None)
        .await
}

fn log_in_form_view(username: &str, redirect_url: Option<&str>, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="username"
                    class=(FORM_LABEL_STYLE)
                {
                    "Username"
                }

                input
                    id="username"
                    type="text"
                    name="username"
                    placeholder="Enter your username"
                    value=(username)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="password"
                    class=(FORM_LABEL_STYLE)
                {
                    "Password"
                }

                input
                    id="password"
                    type="password"
                    name="password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-2"
            {
                input
                    id="remember-me"
                    type="checkbox"
                    name="remember_me"
                    class="h-4 w-4 rounded border-gray-300";

                label
                    for="remember-me"
                    class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Remember me"
                }
            }

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            @if !error_message.is_empty() {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log In" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "

                a
                    href=(endpoints::SIGN_UP_VIEW)
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                    "Sign up"
                }
            }
        }
    }
}

fn log_in_view(username: &str, redirect_url: Option<&str>, error_message: &str) -> Markup {
    let form = log_in_form_view(username, redirect_url, error_message);
    let content = log_in_register("Sign in to your account", &form);

    base("Log In", &[], &content)
}

/// The query parameters accepted by the log-in page.
#[derive(Debug, Deserialize)]
pub struct LogInQuery {
    /// Where to send the user after a successful log-in.
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    log_in_view("", redirect_url.as_deref(), "").into_response()
}

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which the session cookie is valid.
    pub cookie_duration: Duration,
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The username and password are sent to the remote API as-is; the API is the
/// authority on whether they match a registered user.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,
    /// Where to send the user after a successful log-in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client is
/// redirected to the dashboard page (or the page they were trying to reach).
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = user_data
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    let token = match obtain_token(&state.api, &user_data.username, &user_data.password).await {
        Ok(token) => token,
        Err(Error::Unauthorized) => {
            return log_in_form_view(
                &user_data.username,
                redirect_url.as_deref(),
                INVALID_CREDENTIALS_ERROR_MSG,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while obtaining a token: {error}");
            return log_in_form_view(
                &user_data.username,
                redirect_url.as_deref(),
                "An internal error occurred. Please try again later.",
            )
            .into_response();
        }
    };

    let session = Session {
        access_token: token.access,
        refresh_token: token.refresh,
        user_id: token.user_id,
        // Overwritten by set_session_cookie.
        expires_at: OffsetDateTime::now_utc(),
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_SESSION_DURATION
    } else {
        state.cookie_duration
    };

    let destination = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    set_session_cookie(jar.clone(), session, cookie_duration)
        .map(|updated_jar| (StatusCode::SEE_OTHER, HxRedirect(destination), updated_jar))
        .map_err(|err| {
            tracing::error!("Error setting session cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
        })
        .into_response()
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::extract::Query;
    use scraper::{Html, Selector};

    use crate::{endpoints, log_in::LogInQuery};

    use super::get_log_in_page;

    async fn get_page_document(redirect_url: Option<String>) -> Html {
        let response = get_log_in_page(Query(LogInQuery { redirect_url })).await;

        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let document = get_page_document(None).await;

        let form_selector = Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();

        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));

        for (tag, element_type) in [
            ("input", "text"),
            ("input", "password"),
            ("input", "checkbox"),
            ("button", "submit"),
        ] {
            let selector_string = format!("{tag}[type={element_type}]");
            let input_selector = Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 {element_type} {tag}, got {}",
                inputs.len()
            );
        }

        let link_selector = Selector::parse("a[href]").unwrap();
        let links = form.select(&link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(
            links[0].value().attr("href"),
            Some(endpoints::SIGN_UP_VIEW)
        );
    }

    #[tokio::test]
    async fn log_in_page_keeps_safe_redirect_url() {
        let document = get_page_document(Some("/transactions?page=2".to_owned())).await;

        let hidden_selector = Selector::parse("input[name=redirect_url]").unwrap();
        let hidden = document.select(&hidden_selector).collect::<Vec<_>>();

        assert_eq!(hidden.len(), 1);
        assert_eq!(hidden[0].value().attr("value"), Some("/transactions?page=2"));
    }

    #[tokio::test]
    async fn log_in_page_drops_unsafe_redirect_url() {
        let document = get_page_document(Some("https://evil.example/".to_owned())).await;

        let hidden_selector = Selector::parse("input[name=redirect_url]").unwrap();

        assert_eq!(document.select(&hidden_selector).count(), 0);
    }
}
