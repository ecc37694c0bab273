//! Defines functions for storing the session in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Session};

pub(crate) const COOKIE_SESSION: &str = "session";

/// The default duration for which the session cookie is valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(12);

/// Add the session cookie to the cookie jar, indicating that a user is logged
/// in and authenticated.
///
/// The cookie and the session inside it both expire `duration` from the
/// current time. You can use [DEFAULT_SESSION_DURATION] for the default
/// duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
/// Returns [Error::CookieFormat] if the session cannot be serialized as JSON.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    mut session: Session,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    session.expires_at = expiry;

    let session_string =
        serde_json::to_string(&session).map_err(|error| Error::CookieFormat(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, session_string))
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Retrieve the session stored in `jar`.
///
/// # Errors
/// Returns:
/// - [Error::CookieMissing] if there is no session cookie.
/// - [Error::CookieFormat] if the cookie value is not a valid session.
/// - [Error::Unauthorized] if the stored session has expired.
pub fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::CookieMissing)?;

    let session: Session = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::CookieFormat(error.to_string()))?;

    if session.is_expired() {
        return Err(Error::Unauthorized);
    }

    Ok(session)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{Session, cookie::COOKIE_SESSION},
    };

    use super::{
        DEFAULT_SESSION_DURATION, get_session_from_cookies, invalidate_session_cookie,
        set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn test_session() -> Session {
        Session {
            access_token: "access-token".to_owned(),
            refresh_token: "refresh-token".to_owned(),
            user_id: 1,
            expires_at: OffsetDateTime::now_utc(),
        }
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = get_jar();

        let jar = set_session_cookie(jar, test_session(), DEFAULT_SESSION_DURATION).unwrap();
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_date_time_close!(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_SESSION_DURATION
        );
    }

    #[test]
    fn get_session_from_cookies_succeeds() {
        let jar =
            set_session_cookie(get_jar(), test_session(), DEFAULT_SESSION_DURATION).unwrap();

        let session = get_session_from_cookies(&jar).unwrap();

        assert_eq!(session.access_token, "access-token");
        assert_eq!(session.user_id, 1);
        assert_date_time_close!(
            session.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_SESSION_DURATION
        );
    }

    #[test]
    fn get_session_fails_on_empty_jar() {
        let jar = get_jar();

        assert_eq!(get_session_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn get_session_fails_on_expired_session() {
        let jar =
            set_session_cookie(get_jar(), test_session(), Duration::seconds(-10)).unwrap();

        assert_eq!(get_session_from_cookies(&jar), Err(Error::Unauthorized));
    }

    #[test]
    fn invalidate_session_cookie_succeeds() {
        let jar =
            set_session_cookie(get_jar(), test_session(), DEFAULT_SESSION_DURATION).unwrap();

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        assert!(get_session_from_cookies(&jar).is_err());
    }
}
