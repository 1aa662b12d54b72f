//! Code for the user identity carried in the session and the user table used for password checks.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The identity of an authenticated user.
///
/// This is what a credential strategy produces and what the session cookie stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID. Transactions and budgets are scoped to this ID.
    pub id: UserID,
    /// The email address the user logged in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
}

/// A user row in the application database, including the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUser {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's email address, unique across users.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

impl From<StoredUser> for User {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred, e.g. the email is already taken.
pub fn create_user(
    email: &str,
    name: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<StoredUser, Error> {
    connection
        .prepare(
            "INSERT INTO user (email, name, password) VALUES (?1, ?2, ?3)
             RETURNING id, email, name, password",
        )?
        .query_row((email, name, password_hash.as_ref()), map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database whose email is equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<StoredUser, Error> {
    connection
        .prepare("SELECT id, email, name, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email)], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<StoredUser, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(StoredUser {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
