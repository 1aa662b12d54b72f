use rusqlite::Connection;

use crate::{
    AppState,
    auth::{FormStrategy, PasswordHash, PasswordStrategy, SessionConfig},
    user::{User, create_user},
};

pub(crate) const TEST_EMAIL: &str = "test@example.com";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// App state with an empty in-memory database, using the stub log-in strategy.
pub(crate) fn get_test_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        SessionConfig::new("42"),
        "Etc/UTC",
        FormStrategy::NAME,
    )
    .expect("Could not create app state.")
}

/// App state using the password strategy, with one registered user.
pub(crate) fn get_test_state_with_user() -> (AppState, User) {
    let state = AppState::new(
        Connection::open_in_memory().expect("Could not open database in memory."),
        SessionConfig::new("42"),
        "Etc/UTC",
        PasswordStrategy::NAME,
    )
    .expect("Could not create app state.");

    let user = {
        let connection = state.db_connection.lock().unwrap();
        create_user(
            TEST_EMAIL,
            "Jane",
            PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
            &connection,
        )
        .expect("Could not create test user.")
    };

    (state, user.into())
}
