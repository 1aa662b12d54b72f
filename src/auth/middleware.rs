//! Authentication middleware that validates the session cookie, extends sessions, and handles redirects.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::{HxRedirect, HxRequest};

use crate::{
    AppState,
    auth::{Authenticator, session::extend_session_if_needed},
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Checks and extends sessions.
    pub authenticator: Arc<Authenticator>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            authenticator: state.authenticator.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.authenticator.cookie_key().clone()
    }
}

fn get_log_in_redirect(is_htmx: bool) -> Response {
    if is_htmx {
        (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::OK,
        )
            .into_response()
    } else {
        Redirect::to(endpoints::LOG_IN_VIEW).into_response()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// If the session is valid, the [User](crate::User) is placed into the request and the request
/// is executed normally. Afterwards the session is extended so that it lasts at least the
/// configured session duration from now. Otherwise a redirect to the log-in page is returned,
/// as an HTMX redirect if the request came from HTMX.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to
/// receive the user.
pub async fn auth_guard(
    State(state): State<AuthState>,
    HxRequest(is_htmx): HxRequest,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user) = state.authenticator.is_authenticated(&jar) else {
        return get_log_in_redirect(is_htmx);
    };

    request.extensions_mut().insert(user);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session_if_needed(jar.clone(), state.authenticator.session_duration())
    {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending session: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}
