//! Fintrack is a web app for keeping an eye on your personal finances.
//!
//! This library provides a REST API that directly serves HTML pages: a dashboard,
//! monthly budgets and a transaction history, all behind a cookie-based session.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod charts;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthenticateOptions, Authenticator, CredentialStrategy, Credentials, FormStrategy,
    PasswordHash, PasswordStrategy, SessionConfig,
};
pub use budget::{Budget, BudgetPeriod, NewBudget, create_budget};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::{first_day_of_month, get_local_offset};
pub use transaction::{NewTransaction, Transaction, TransactionType, create_transaction};
pub use user::{StoredUser, User, UserID, create_user};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The credential strategy rejected the submitted email and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No credential strategy has been registered under the given name.
    #[error("no credential strategy named \"{0}\"")]
    UnknownStrategy(String),

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    SessionMissing,

    /// The session cookie was present, but its expiry time has passed.
    #[error("the session has expired")]
    SessionExpired,

    /// The session cookie could not be decoded or the new session could not be encoded.
    ///
    /// Callers should pass in the original error as a string.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A transaction type stored in the database was neither "income" nor "expense".
    #[error("invalid transaction type \"{0}\"")]
    InvalidTransactionType(String),

    /// A budget period stored in the database was not a known period.
    #[error("invalid budget period \"{0}\"")]
    InvalidBudgetPeriod(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
