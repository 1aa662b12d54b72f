//! Authentication: credential strategies, the session cookie and the auth guard middleware.

mod authenticator;
mod middleware;
mod password;
mod session;
mod strategy;

pub use authenticator::{AuthenticateOptions, Authenticator, SessionConfig};
pub use middleware::{AuthState, auth_guard};
pub use password::PasswordHash;
pub use strategy::{CredentialStrategy, Credentials, FormStrategy, PasswordStrategy};

#[cfg(test)]
pub(crate) use session::{COOKIE_SESSION, set_session_cookie};
