//! Log-out route handler that invalidates the session cookie and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::AuthState, endpoints};

/// Invalidate the session cookie and redirect the client to the log-in page.
pub async fn get_log_out(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    let jar = state.authenticator.log_out(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
