//! The authenticator owns the session settings and the registered credential strategies.

use std::{collections::HashMap, fmt::Debug};

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{
        session::{
            DEFAULT_SESSION_DURATION, get_session, invalidate_session_cookie, set_session_cookie,
        },
        strategy::{CredentialStrategy, Credentials},
    },
    user::User,
};

/// How sessions are signed, encrypted and how long they last.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which a session is valid after log-in or after the last request.
    pub duration: Duration,
}

impl SessionConfig {
    /// Create the cookie key from a secret string and use the default session duration.
    pub fn new(cookie_secret: &str) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            duration: DEFAULT_SESSION_DURATION,
        }
    }

    /// Set how long sessions last.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

/// Where to send the client after [Authenticator::authenticate].
#[derive(Debug, Clone, Copy)]
pub struct AuthenticateOptions<'a> {
    /// Redirect target once the session has been written.
    pub success_redirect: &'a str,
    /// Redirect target when the credentials are rejected.
    ///
    /// If `None`, the error is returned to the caller instead, e.g. so a form can show a message.
    pub failure_redirect: Option<&'a str>,
}

/// Checks sessions and runs credential strategies.
///
/// Created once at start-up and shared through the app state.
pub struct Authenticator {
    session: SessionConfig,
    strategies: HashMap<String, Box<dyn CredentialStrategy>>,
}

impl Authenticator {
    /// Create an authenticator with no strategies.
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            strategies: HashMap::new(),
        }
    }

    /// Register `strategy` under `name`, replacing any strategy with the same name.
    pub fn with_strategy(
        mut self,
        name: &str,
        strategy: impl CredentialStrategy + 'static,
    ) -> Self {
        self.strategies.insert(name.to_owned(), Box::new(strategy));
        self
    }

    /// Whether a strategy is registered under `name`.
    pub fn has_strategy(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// The key used to sign and encrypt the session cookie.
    pub fn cookie_key(&self) -> &Key {
        &self.session.cookie_key
    }

    /// How long a session lasts after log-in or after the last request.
    pub fn session_duration(&self) -> Duration {
        self.session.duration
    }

    /// Get the user of the session in `jar`, if there is a valid, unexpired session.
    pub fn is_authenticated(&self, jar: &PrivateCookieJar) -> Option<User> {
        match get_session(jar) {
            Ok(session) => Some(session.user),
            Err(Error::SessionMissing) => None,
            Err(error) => {
                tracing::warn!("Rejected session: {error}");
                None
            }
        }
    }

    /// Check `credentials` with the strategy registered under `strategy_name`.
    ///
    /// On success, the user is written into the session cookie and the client is redirected to
    /// `options.success_redirect`. On failure, the client is redirected to
    /// `options.failure_redirect` if it is set.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::UnknownStrategy] if no strategy is registered under `strategy_name`,
    /// - the strategy's error if the credentials are rejected and there is no failure redirect,
    /// - [Error::InvalidSession] if the session could not be written.
    pub fn authenticate(
        &self,
        strategy_name: &str,
        jar: PrivateCookieJar,
        credentials: &Credentials,
        options: AuthenticateOptions<'_>,
    ) -> Result<Response, Error> {
        let strategy = self
            .strategies
            .get(strategy_name)
            .ok_or_else(|| Error::UnknownStrategy(strategy_name.to_owned()))?;

        let user = match strategy.verify(credentials) {
            Ok(user) => user,
            Err(error) => {
                if !matches!(error, Error::InvalidCredentials) {
                    tracing::error!("Could not verify credentials: {error}");
                }

                return match options.failure_redirect {
                    Some(failure_redirect) => Ok(Redirect::to(failure_redirect).into_response()),
                    None => Err(error),
                };
            }
        };

        let jar = set_session_cookie(jar, &user, self.session.duration)?;
        tracing::info!("User {} logged in", user.id);

        Ok((jar, Redirect::to(options.success_redirect)).into_response())
    }

    /// Expire the session cookie.
    pub fn log_out(&self, jar: PrivateCookieJar) -> PrivateCookieJar {
        invalidate_session_cookie(jar)
    }
}

impl Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut strategy_names: Vec<_> = self.strategies.keys().collect();
        strategy_names.sort();

        f.debug_struct("Authenticator")
            .field("session", &self.session)
            .field("strategies", &strategy_names)
            .finish()
    }
}

#[cfg(test)]
mod authenticator_tests {
    use axum::{
        body::Body,
        http::{
            HeaderMap, HeaderValue, Response, StatusCode,
            header::{COOKIE, SET_COOKIE},
        },
        response::IntoResponse,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};

    use crate::{
        Error,
        auth::{
            session::{COOKIE_SESSION, set_session_cookie},
            strategy::{Credentials, FormStrategy},
        },
        user::{User, UserID},
    };

    use super::{AuthenticateOptions, Authenticator, SessionConfig};

    const OPTIONS: AuthenticateOptions<'static> = AuthenticateOptions {
        success_redirect: "/dashboard",
        failure_redirect: None,
    };

    fn get_authenticator() -> Authenticator {
        Authenticator::new(SessionConfig::new("foobar"))
            .with_strategy(FormStrategy::NAME, FormStrategy)
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), want_location);
    }

    #[test]
    fn authenticate_sets_session_and_redirects() {
        let authenticator = get_authenticator();
        let jar = PrivateCookieJar::new(authenticator.cookie_key().clone());

        let response = authenticator
            .authenticate(
                FormStrategy::NAME,
                jar,
                &credentials("jane@example.com", "hunter2"),
                OPTIONS,
            )
            .unwrap();

        assert_redirect(&response, "/dashboard");
        let session_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_SESSION);
        assert!(session_cookie.is_some(), "want session cookie to be set");
    }

    #[test]
    fn authenticate_returns_error_without_failure_redirect() {
        let authenticator = get_authenticator();
        let jar = PrivateCookieJar::new(authenticator.cookie_key().clone());

        let result = authenticator.authenticate(
            FormStrategy::NAME,
            jar,
            &credentials("", "hunter2"),
            OPTIONS,
        );

        assert_eq!(result.unwrap_err(), Error::InvalidCredentials);
    }

    #[test]
    fn authenticate_redirects_on_failure_with_failure_redirect() {
        let authenticator = get_authenticator();
        let jar = PrivateCookieJar::new(authenticator.cookie_key().clone());

        let response = authenticator
            .authenticate(
                FormStrategy::NAME,
                jar,
                &credentials("jane@example.com", ""),
                AuthenticateOptions {
                    success_redirect: "/dashboard",
                    failure_redirect: Some("/login"),
                },
            )
            .unwrap();

        assert_redirect(&response, "/login");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn authenticate_fails_with_unknown_strategy() {
        let authenticator = get_authenticator();
        let jar = PrivateCookieJar::new(authenticator.cookie_key().clone());

        let result = authenticator.authenticate(
            "github",
            jar,
            &credentials("jane@example.com", "hunter2"),
            OPTIONS,
        );

        assert_eq!(
            result.unwrap_err(),
            Error::UnknownStrategy("github".to_owned())
        );
    }

    #[test]
    fn is_authenticated_returns_session_user() {
        let authenticator = get_authenticator();
        let user = User {
            id: UserID::new(7),
            email: "jane@example.com".to_owned(),
            name: "Jane".to_owned(),
        };
        let jar = set_session_cookie(
            PrivateCookieJar::new(authenticator.cookie_key().clone()),
            &user,
            authenticator.session_duration(),
        )
        .unwrap();

        assert_eq!(authenticator.is_authenticated(&jar), Some(user));
    }

    #[test]
    fn is_authenticated_returns_none_without_session() {
        let authenticator = get_authenticator();
        let jar = PrivateCookieJar::new(authenticator.cookie_key().clone());

        assert_eq!(authenticator.is_authenticated(&jar), None);
    }

    #[test]
    fn session_from_other_key_is_not_accepted() {
        let authenticator = get_authenticator();
        let other = Authenticator::new(SessionConfig::new("a different secret"));
        let user = User {
            id: UserID::new(7),
            email: "jane@example.com".to_owned(),
            name: "Jane".to_owned(),
        };
        let foreign_jar = set_session_cookie(
            PrivateCookieJar::new(other.cookie_key().clone()),
            &user,
            other.session_duration(),
        )
        .unwrap();
        let request_headers = as_request_headers(foreign_jar);

        let jar =
            PrivateCookieJar::from_headers(&request_headers, authenticator.cookie_key().clone());

        assert_eq!(authenticator.is_authenticated(&jar), None);
    }

    /// Turn the encrypted cookies a jar would send to the client into a request `Cookie` header.
    fn as_request_headers(jar: PrivateCookieJar) -> HeaderMap {
        let response = jar.into_response();
        let cookie_header = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| {
                let cookie = Cookie::parse(header.to_str().unwrap().to_owned()).unwrap();
                format!("{}={}", cookie.name(), cookie.value())
            })
            .collect::<Vec<_>>()
            .join("; ");

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&cookie_header).unwrap());
        headers
    }
}
