//! Middleware for logging requests and responses.

use std::borrow::Cow;

use axum::{
    body::Bytes,
    extract::Request,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in submitted forms are replaced with asterisks.
/// Bodies are passed on unchanged; bodies that are not UTF-8 text are logged by size only.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/x-www-form-urlencoded"));

    let body_text = body_for_log(&body_bytes);
    if parts.method == Method::POST && is_form {
        log_request(&parts, &redact_password(&body_text, "password"));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_bytes.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_for_log(&body_bytes));

    Response::from_parts(parts, body_bytes.into())
}

fn body_for_log(bytes: &Bytes) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(format!("<{} bytes of binary data>", bytes.len())),
    }
}

fn redact_password(form_text: &str, field_name: &str) -> String {
    let key = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&key) {
                format!("{key}********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The longest prefix of `body` that is at most [LOG_BODY_LENGTH_LIMIT] bytes and ends on a
/// character boundary.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Form, Router,
        body::Bytes,
        http::header::CONTENT_TYPE,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;

    use crate::auth::Credentials;

    use super::{
        LOG_BODY_LENGTH_LIMIT, body_for_log, logging_middleware, redact_password, truncate_body,
    };

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn redacts_password_in_middle_of_form() {
        let got = redact_password("email=a%40b.c&password=hunter2&x=1", "password");

        assert_eq!(got, "email=a%40b.c&password=********&x=1");
    }

    #[test]
    fn redacts_password_at_end_of_form() {
        let got = redact_password("email=a%40b.c&password=hunter2", "password");

        assert_eq!(got, "email=a%40b.c&password=********");
    }

    #[test]
    fn leaves_form_without_password_unchanged() {
        let got = redact_password("email=a%40b.c", "password");

        assert_eq!(got, "email=a%40b.c");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate_body(&body);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(body.starts_with(truncated));
    }

    async fn echo_email(Form(credentials): Form<Credentials>) -> String {
        credentials.email
    }

    #[tokio::test]
    async fn middleware_passes_body_through() {
        let app = Router::new()
            .route("/echo", post(echo_email))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server
            .post("/echo")
            .form(&[("email", "jane@example.com"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        response.assert_text("jane@example.com");
    }

    async fn png() -> ([(axum::http::HeaderName, &'static str); 1], Bytes) {
        (
            [(CONTENT_TYPE, "image/png")],
            Bytes::from_static(&PNG_HEADER),
        )
    }

    #[tokio::test]
    async fn middleware_passes_binary_body_through_unchanged() {
        let app = Router::new()
            .route("/favicon.png", get(png))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app);

        let response = server.get("/favicon.png").await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes().as_ref(), PNG_HEADER.as_slice());
    }

    #[test]
    fn binary_body_is_logged_by_size() {
        let body = Bytes::from_static(&PNG_HEADER);
        let got = body_for_log(&body);

        assert_eq!(got, "<8 bytes of binary data>");
    }
}
