//! The sign-up page for creating an account with the remote API.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::{
    AppState, Error,
    api::{self, ApiClient},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_register,
    },
};

/// The minimum number of characters the password should have to be considered valid on the client side (the remote API validates on top of this).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

/// Check a candidate password before it is sent to the API.
///
/// # Errors
///
/// Returns [Error::TooWeak] with an explanation and suggestions when the
/// password is too easy to guess.
fn validate_password_strength(raw_password: &str) -> Result<(), Error> {
    let password_analysis = zxcvbn(raw_password, &[]);

    match password_analysis.score() {
        Score::Three | Score::Four => Ok(()),
        _ => Err(Error::TooWeak(
            password_analysis
                .feedback()
                .unwrap_or(&Feedback::default())
                .to_string(),
        )),
    }
}

/// Register a user with the remote API.
///
/// The API answers 201 with a confirmation message on success; the message is
/// discarded.
pub async fn sign_up(api: &ApiClient, username: &str, password: &str) -> Result<(), Error> {
    #[derive(Serialize)]
    struct SignUpRequest<'a> {
        username: &'a str,
        password: &'a str,
    }

    let _: serde_json::Value = api
        .post_json(api::SIGNUP, &SignUpRequest { username, password }, None)
        .await?;

    Ok(())
}

/// The error messages to render inside the sign-up form, one per field.
#[derive(Default)]
struct SignUpFormErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn field_error(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(error_message) = error_message {
            p class="text-red-500 text-base" { (error_message) }
        }
    }
}

fn sign_up_form_view(username: &str, errors: &SignUpFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
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

                (field_error(errors.username))
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
                    minlength=(PASSWORD_INPUT_MIN_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.password))
            }

            div
            {
                label
                    for="confirm-password"
                    class=(FORM_LABEL_STYLE)
                {
                    "Confirm Password"
                }

                input
                    id="confirm-password"
                    type="password"
                    name="confirm_password"
                    placeholder="••••••••"
                    required
                    minlength=(PASSWORD_INPUT_MIN_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.confirm_password))
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign Up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form_view("", &SignUpFormErrors::default());
    let content = log_in_register("Create a new account", &form);

    base("Sign Up", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct SignUpState {
    /// The client for the remote finance API.
    pub api: ApiClient,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// The raw data entered by the user in the sign-up form.
#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    /// The username for the new account.
    pub username: String,
    /// The password for the new account.
    pub password: String,
    /// The password entered a second time.
    pub confirm_password: String,
}

/// Handler for sign-up requests via the POST method.
///
/// On success the client is redirected to the log-in page. Otherwise, the form
/// is returned with an error message against the offending field.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let username = user_data.username.trim();

    if username.is_empty() {
        return sign_up_form_view(
            username,
            &SignUpFormErrors {
                username: Some("Username cannot be empty"),
                ..Default::default()
            },
        )
        .into_response();
    }

    if let Err(error) = validate_password_strength(&user_data.password) {
        let message = error.to_string();

        return sign_up_form_view(
            username,
            &SignUpFormErrors {
                password: Some(&message),
                ..Default::default()
            },
        )
        .into_response();
    }

    if user_data.password != user_data.confirm_password {
        return sign_up_form_view(
            username,
            &SignUpFormErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    match sign_up(&state.api, username, &user_data.password).await {
        Ok(()) => (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::Rejected(detail)) => sign_up_form_view(
            username,
            &SignUpFormErrors {
                username: Some(&detail),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while signing up: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod sign_up_tests {
    use axum::{Form, extract::State, http::StatusCode};
    use axum_htmx::HX_REDIRECT;

    use crate::{
        endpoints,
        test_utils::{StubApi, TEST_USERNAME},
    };

    use super::{SignUpForm, SignUpState, post_sign_up, validate_password_strength};

    const STRONG_PASSWORD: &str = "kT9#vmQ2&wXz7!pL";

    fn sign_up_form(username: &str, password: &str, confirm_password: &str) -> SignUpForm {
        SignUpForm {
            username: username.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn response_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8_lossy(&body).to_string()
    }

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(validate_password_strength("password1").is_err());
        assert!(validate_password_strength(STRONG_PASSWORD).is_ok());
    }

    #[tokio::test]
    async fn sign_up_succeeds_and_redirects_to_log_in() {
        let stub = StubApi::spawn().await;
        let state = SignUpState {
            api: stub.client(),
        };

        let response = post_sign_up(
            State(state),
            Form(sign_up_form("newuser", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }

    #[tokio::test]
    async fn sign_up_rejects_mismatched_passwords() {
        let stub = StubApi::spawn().await;
        let state = SignUpState {
            api: stub.client(),
        };

        let response = post_sign_up(
            State(state),
            Form(sign_up_form("newuser", STRONG_PASSWORD, "something else")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let text = response_text(response).await;
        assert!(text.contains("Passwords do not match"));
    }

    #[tokio::test]
    async fn sign_up_rejects_empty_username() {
        let stub = StubApi::spawn().await;
        let state = SignUpState {
            api: stub.client(),
        };

        let response = post_sign_up(
            State(state),
            Form(sign_up_form("   ", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let text = response_text(response).await;
        assert!(text.contains("Username cannot be empty"));
    }

    #[tokio::test]
    async fn sign_up_surfaces_api_rejection() {
        let stub = StubApi::spawn().await;
        let state = SignUpState {
            api: stub.client(),
        };

        // The stub API rejects usernames that already exist.
        let response = post_sign_up(
            State(state),
            Form(sign_up_form(
                TEST_USERNAME,
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let text = response_text(response).await;
        assert!(
            text.contains("already exists"),
            "form should echo the API rejection, got {text}"
        );
    }
}
