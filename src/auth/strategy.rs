//! Credential strategies turn a submitted email and password into a [User].

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    user::{User, UserID, get_user_by_email},
};

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Email entered during log-in.
    #[serde(default)]
    pub email: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}

/// A way of checking credentials.
///
/// Strategies are registered with the [Authenticator](crate::Authenticator) under a name and
/// picked by that name at log-in.
pub trait CredentialStrategy: Send + Sync {
    /// Check `credentials` and return the identity they belong to.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the credentials are rejected. Other errors
    /// indicate the strategy could not check the credentials at all.
    fn verify(&self, credentials: &Credentials) -> Result<User, Error>;
}

/// Accepts any non-empty email and password and returns a fixed identity.
///
/// **Warning**: this strategy performs no verification. It must be replaced, e.g. with
/// [PasswordStrategy], before the app is exposed to anyone you do not trust.
#[derive(Debug, Clone, Default)]
pub struct FormStrategy;

impl FormStrategy {
    /// The name the stub strategy is registered under.
    pub const NAME: &'static str = "user-pass";
    /// The ID of the fixed identity returned by the stub strategy.
    pub const USER_ID: i64 = 1;
    /// The display name of the fixed identity returned by the stub strategy.
    pub const USER_NAME: &'static str = "John Doe";
}

impl CredentialStrategy for FormStrategy {
    fn verify(&self, credentials: &Credentials) -> Result<User, Error> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        Ok(User {
            id: UserID::new(Self::USER_ID),
            email: credentials.email.clone(),
            name: Self::USER_NAME.to_owned(),
        })
    }
}

/// Verifies the email and password against the bcrypt hashes in the user table.
#[derive(Debug, Clone)]
pub struct PasswordStrategy {
    db_connection: Arc<Mutex<Connection>>,
}

impl PasswordStrategy {
    /// The name the password strategy is registered under.
    pub const NAME: &'static str = "password";

    /// Create a strategy that looks users up in `db_connection`.
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }
}

impl CredentialStrategy for PasswordStrategy {
    fn verify(&self, credentials: &Credentials) -> Result<User, Error> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        let stored_user = {
            let connection = self
                .db_connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            match get_user_by_email(&credentials.email, &connection) {
                Ok(user) => user,
                Err(Error::NotFound) => return Err(Error::InvalidCredentials),
                Err(error) => return Err(error),
            }
        };

        let is_password_valid = stored_user
            .password_hash
            .verify(&credentials.password)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        if !is_password_valid {
            return Err(Error::InvalidCredentials);
        }

        Ok(stored_user.into())
    }
}

#[cfg(test)]
mod form_strategy_tests {
    use crate::{
        Error,
        user::{User, UserID},
    };

    use super::{CredentialStrategy, Credentials, FormStrategy};

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn rejects_empty_email() {
        let result = FormStrategy.verify(&credentials("", "hunter2"));

        assert_eq!(result, Err(Error::InvalidCredentials));
    }

    #[test]
    fn rejects_empty_password() {
        let result = FormStrategy.verify(&credentials("jane@example.com", ""));

        assert_eq!(result, Err(Error::InvalidCredentials));
    }

    #[test]
    fn accepts_any_non_empty_pair() {
        let result = FormStrategy.verify(&credentials("jane@example.com", "not-checked"));

        assert_eq!(
            result,
            Ok(User {
                id: UserID::new(1),
                email: "jane@example.com".to_owned(),
                name: "John Doe".to_owned(),
            })
        );
    }

    #[test]
    fn form_deserialises_with_missing_fields() {
        let form: Credentials = serde_html_form::from_str("email=jane%40example.com").unwrap();

        assert_eq!(form.email, "jane@example.com");
        assert_eq!(form.password, "");
    }
}
