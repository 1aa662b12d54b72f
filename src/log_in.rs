//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level credential and session logic.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    auth::{AuthenticateOptions, Authenticator, Credentials},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, log_in_register, password_input},
};

/// The message shown under the password field when the credentials are rejected.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid credentials";

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (email_input(email))

            (password_input(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }
        }
    }
}

fn log_in_page(email: &str, error_message: Option<&str>) -> Markup {
    let form = log_in_form(email, error_message);
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &[], &content)
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// Checks credentials and writes the session cookie.
    pub authenticator: Arc<Authenticator>,
    /// The name of the credential strategy the form submits to.
    pub log_in_strategy: String,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            authenticator: state.authenticator.clone(),
            log_in_strategy: state.log_in_strategy.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.authenticator.cookie_key().clone()
    }
}

/// Display the log-in page, or redirect to the dashboard if the client already has a session.
pub async fn get_log_in_page(State(state): State<LoginState>, jar: PrivateCookieJar) -> Response {
    if state.authenticator.is_authenticated(&jar).is_some() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    log_in_page("", None).into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client is redirected to the
/// dashboard page. If the credentials are rejected, the form is returned with an error message
/// and the email filled in. Any other error renders the error page.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    let result = state.authenticator.authenticate(
        &state.log_in_strategy,
        jar,
        &credentials,
        AuthenticateOptions {
            success_redirect: endpoints::DASHBOARD_VIEW,
            failure_redirect: None,
        },
    );

    match result {
        Ok(response) => response,
        Err(Error::InvalidCredentials) => {
            log_in_page(&credentials.email, Some(INVALID_CREDENTIALS_ERROR_MSG)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::State,
        http::{StatusCode, header::CONTENT_TYPE},
    };
    use axum_extra::extract::PrivateCookieJar;

    use crate::{
        auth::set_session_cookie,
        endpoints,
        test_utils::{
            assert_form_action, assert_form_input, assert_form_submit_button_with_text,
            assert_redirect, assert_valid_html, get_test_state, must_get_form,
            parse_html_document,
        },
        user::{User, UserID},
    };

    use super::{LoginState, get_log_in_page};

    fn get_login_state() -> LoginState {
        let state = get_test_state();

        LoginState {
            authenticator: state.authenticator.clone(),
            log_in_strategy: state.log_in_strategy.clone(),
        }
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let state = get_login_state();
        let jar = PrivateCookieJar::new(state.authenticator.cookie_key().clone());

        let response = get_log_in_page(State(state), jar).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_action(&form, endpoints::LOG_IN_VIEW);
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button_with_text(&form, "Log in");
    }

    #[tokio::test]
    async fn log_in_page_redirects_when_already_logged_in() {
        let state = get_login_state();
        let user = User {
            id: UserID::new(1),
            email: "jane@example.com".to_owned(),
            name: "Jane".to_owned(),
        };
        let jar = set_session_cookie(
            PrivateCookieJar::new(state.authenticator.cookie_key().clone()),
            &user,
            state.authenticator.session_duration(),
        )
        .unwrap();

        let response = get_log_in_page(State(state), jar).await;

        assert_redirect(&response, endpoints::DASHBOARD_VIEW);
    }
}
