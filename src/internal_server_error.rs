//! Defines the templates and route handlers for the page to display for an internal server error.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl InternalServerError<'_> {
    pub fn into_html(self) -> Html<String> {
        Html(error_view("Internal Server Error", "500", self.description, self.fix).into_string())
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{InternalServerError, get_internal_server_error_page};

    #[tokio::test]
    async fn error_page_has_500_status_and_fix() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Sorry, something went wrong."));
        assert!(text.contains("Try again later or check the server logs"));
    }

    #[tokio::test]
    async fn custom_description_is_rendered() {
        let response = InternalServerError {
            description: "Invalid Timezone Settings",
            fix: "Set a valid timezone",
        }
        .into_response();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Invalid Timezone Settings"));
        assert!(text.contains("Set a valid timezone"));
    }
}
