//! The HTTP client for the remote finance API.
//!
//! Every durable record (transactions, categories, budgets, users) lives in
//! the backend. This module owns the reqwest client and the mapping from HTTP
//! statuses to [Error]; the resource modules ([crate::transaction],
//! [crate::category], [crate::budget]) define the typed calls on top of it,
//! the same way route handlers elsewhere receive a database connection.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, auth::Session};

/// The transactions collection, relative to the API base URL.
pub const TRANSACTIONS: &str = "transactions/";
/// The categories collection, relative to the API base URL.
pub const CATEGORIES: &str = "categories/";
/// The budgets collection, relative to the API base URL.
pub const BUDGETS: &str = "budgets/";
/// The token-pair endpoint used to log in.
pub const TOKEN: &str = "token/";
/// The user registration endpoint.
pub const SIGNUP: &str = "signup/";

/// How long to wait for a response before giving up on a request.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long to wait when establishing a connection to the API.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A pooled HTTP client bound to the base URL of the finance API.
///
/// Cloning is cheap: the underlying reqwest client is reference counted, so
/// per-handler state structs can each hold their own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url`, e.g. "http://localhost:8000/api".
    ///
    /// A trailing slash on `base_url` is ignored.
    ///
    /// # Errors
    /// Returns [Error::ApiClientBuild] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|error| Error::ApiClientBuild(error.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The path of a single record within `resource`, e.g. "transactions/42/".
    ///
    /// The backend addresses records with a trailing slash, so one is appended.
    pub fn item(resource: &str, id: i64) -> String {
        format!("{resource}{id}/")
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON response body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
    ) -> Result<T, Error> {
        let response = with_bearer(self.http.get(self.url(path)), Some(session))
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response body.
    ///
    /// `session` is `None` only for the unauthenticated `token/` and
    /// `signup/` endpoints.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<T, Error> {
        let response = with_bearer(self.http.post(self.url(path)), session)
            .json(body)
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    /// PUT `body` as JSON to `path` and decode the JSON response body.
    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: &Session,
    ) -> Result<T, Error> {
        let response = with_bearer(self.http.put(self.url(path)), Some(session))
            .json(body)
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    /// DELETE the record at `path`. The 204 response body is discarded.
    pub(crate) async fn delete(&self, path: &str, session: &Session) -> Result<(), Error> {
        let response = with_bearer(self.http.delete(self.url(path)), Some(session))
            .send()
            .await?;

        check_status(response).await?;

        Ok(())
    }
}

fn with_bearer(builder: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
    match session {
        Some(session) => builder.bearer_auth(&session.access_token),
        None => builder,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    response.json().await.map_err(Error::from)
}

/// Map an error status to the crate error type, passing successes through.
///
/// 401 and 403 both become [Error::Unauthorized]: the backend answers 401 for
/// a missing or expired token and 403 for a token it refuses, and the client
/// reacts to both by logging the user out.
async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized),
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        StatusCode::BAD_REQUEST => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Rejected(error_detail(&body)))
        }
        status => Err(Error::UnexpectedStatus(status.as_u16())),
    }
}

/// The longest rejection reason worth echoing back into a form.
const ERROR_DETAIL_LIMIT: usize = 200;

/// Pull a human-readable reason out of a 400 response body.
///
/// The backend answers either `{"detail": "..."}` or a field-error object
/// such as `{"month": ["This field is required."]}`. Anything else is
/// returned as the raw body, truncated.
fn error_detail(body: &str) -> String {
    let fallback = || {
        let body = body.trim();
        if body.is_empty() {
            return "The request was invalid.".to_owned();
        }

        body.chars().take(ERROR_DETAIL_LIMIT).collect()
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };

    if let Some(detail) = value.get("detail").and_then(|detail| detail.as_str()) {
        return detail.to_owned();
    }

    let Some(fields) = value.as_object() else {
        return fallback();
    };

    let mut messages = Vec::new();

    for (field, errors) in fields {
        match errors {
            serde_json::Value::String(message) => messages.push(format!("{field}: {message}")),
            serde_json::Value::Array(items) => {
                for item in items {
                    if let Some(message) = item.as_str() {
                        messages.push(format!("{field}: {message}"));
                    }
                }
            }
            _ => {}
        }
    }

    if messages.is_empty() {
        fallback()
    } else {
        messages.join(" ")
    }
}
