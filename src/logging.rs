//! Middleware for logging requests and responses.

use axum::{
    body::Body, extract::Request, http::header::CONTENT_TYPE, middleware::Next,
    response::Response,
};

/// How much of a request or response body is logged at the `info` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body logged at the `debug` level instead.
///
/// Password fields in form submissions are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = read_body_text(body).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap());

    if is_form_post {
        let display_text = redact_form_field(&body_text, "password");
        let display_text = redact_form_field(&display_text, "confirm_password");
        log_body(&format!("Received request: {parts:#?}"), &display_text);
    } else {
        log_body(&format!("Received request: {parts:#?}"), &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = read_body_text(body).await;
    log_body(&format!("Sending response: {parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body) -> String {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    String::from_utf8_lossy(&body_bytes).to_string()
}

/// Replace the value of `field_name` in a URL-encoded form body with asterisks.
fn redact_form_field(form_text: &str, field_name: &str) -> String {
    let needle = format!("{field_name}=");

    let start = match form_text.find(&needle) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());

    let field = &form_text[start..end];

    form_text.replace(field, &format!("{field_name}=********"))
}

fn log_body(header_text: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{header_text}\nbody: {}...", &body[..LOG_BODY_LENGTH_LIMIT]);
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{header_text}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use super::redact_form_field;

    #[test]
    fn redacts_password_in_middle_of_form() {
        let form = "username=alice&password=hunter2&remember_me=on";

        let got = redact_form_field(form, "password");

        assert_eq!(got, "username=alice&password=********&remember_me=on");
    }

    #[test]
    fn redacts_password_at_end_of_form() {
        let form = "username=alice&password=hunter2";

        let got = redact_form_field(form, "password");

        assert_eq!(got, "username=alice&password=********");
    }

    #[test]
    fn leaves_forms_without_the_field_unchanged() {
        let form = "username=alice";

        let got = redact_form_field(form, "password");

        assert_eq!(got, form);
    }
}
