//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;

use crate::{
    Error,
    auth::{Authenticator, FormStrategy, PasswordStrategy, SessionConfig},
    db::initialize,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Checks credentials and manages the session cookie.
    pub authenticator: Arc<Authenticator>,

    /// The name of the credential strategy the log-in form uses.
    pub log_in_strategy: String,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Both the [FormStrategy] and the [PasswordStrategy] are registered, and the log-in form
    /// uses the one named `log_in_strategy`.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or if `log_in_strategy` does not
    /// name a registered strategy.
    pub fn new(
        db_connection: Connection,
        session: SessionConfig,
        local_timezone: &str,
        log_in_strategy: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let authenticator = Authenticator::new(session)
            .with_strategy(FormStrategy::NAME, FormStrategy)
            .with_strategy(
                PasswordStrategy::NAME,
                PasswordStrategy::new(connection.clone()),
            );

        if !authenticator.has_strategy(log_in_strategy) {
            return Err(Error::UnknownStrategy(log_in_strategy.to_owned()));
        }

        Ok(Self {
            authenticator: Arc::new(authenticator),
            log_in_strategy: log_in_strategy.to_owned(),
            local_timezone: local_timezone.to_owned(),
            db_connection: connection,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.cookie_key().clone()
    }
}
