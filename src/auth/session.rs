//! The session store: a private cookie holding the authenticated user and the session expiry.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::User};

/// The name of the private cookie that stores the [Session].
pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which sessions are valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::minutes(5);

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The contents of the session cookie.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    /// The user that logged in.
    pub user: User,

    /// When the session stops being accepted.
    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

/// Add a session cookie for `user` to the cookie jar.
///
/// The session expires `duration` from the current time.
///
/// # Errors
///
/// Returns an [Error::InvalidSession] if the session cannot be serialized.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    user: &User,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let session = Session {
        user: user.clone(),
        expires_at: OffsetDateTime::now_utc() + duration,
    };

    write_session(jar, &session)
}

fn write_session(jar: PrivateCookieJar, session: &Session) -> Result<PrivateCookieJar, Error> {
    let session_json =
        serde_json::to_string(session).map_err(|error| Error::InvalidSession(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, session_json))
            .expires(session.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Read the session from the cookie jar.
///
/// # Errors
///
/// Returns:
/// - [Error::SessionMissing] if there is no session cookie,
/// - [Error::InvalidSession] if the cookie does not hold a valid session,
/// - [Error::SessionExpired] if the session expiry is in the past.
pub(crate) fn get_session(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::SessionMissing)?;
    let session: Session = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidSession(error.to_string()))?;

    if session.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::SessionExpired);
    }

    Ok(session)
}

/// Set the session expiry to the latest of UTC now plus `duration` and the current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. The errors are the same as
/// [get_session], plus [Error::InvalidSession] if the new expiry would overflow.
pub(crate) fn extend_session_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let mut session = get_session(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::InvalidSession("session expiry overflowed".to_owned()))?;
    session.expires_at = max(session.expires_at, new_expiry);

    write_session(jar, &session)
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}
