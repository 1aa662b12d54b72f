//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::State,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::PrivateCookieJar;
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{AuthState, auth_guard},
    budget::get_budget_page,
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    transaction::get_transactions_page,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::BUDGET_VIEW, get(get_budget_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' sends clients with a session to the dashboard and everyone else to the
/// log-in page.
async fn get_index_page(State(state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    match state.authenticator.is_authenticated(&jar) {
        Some(_) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        None => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
    }
}
