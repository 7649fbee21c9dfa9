//! Reading and writing the private auth cookie that holds the session [Token].

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID, auth::token::Token};

/// The name of the cookie holding the serialized [Token].
pub const COOKIE_TOKEN: &str = "auth_token";
/// How long a session lasts without activity when "remember me" is not ticked.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_token_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .path("/")
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

fn add_token(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(build_token_cookie(value, token.expires_at)))
}

/// Add an auth cookie for `user_id` to the cookie jar that expires `duration` from now.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if the expiry overflows, or
/// [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(user_id, duration).ok_or_else(|| {
        Error::InvalidDateFormat(format!("cookie duration {duration} is out of range"))
    })?;

    add_token(jar, token)
}

/// Overwrite the auth cookie with an expired, empty cookie so that the client deletes it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = build_token_cookie(String::new(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// Read and validate the session token from the auth cookie.
///
/// # Errors
/// Returns [Error::CookieMissing] if there is no auth cookie and
/// [Error::InvalidCredentials] if the cookie cannot be read or the token has expired.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed()).map_err(|error| {
        tracing::debug!("could not parse auth token: {error}");
        Error::InvalidCredentials
    })?;

    if token.is_expired() {
        return Err(Error::InvalidCredentials);
    }

    Ok(token)
}

/// Push the auth cookie's expiry out to at least `duration` from now.
///
/// The expiry is never shortened, so a long "remember me" session is left as is.
///
/// # Errors
/// The cookie jar is not modified if an error is returned. Returns the same
/// errors as [get_token_from_cookies] and [set_auth_cookie].
pub fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let Some(extended) = Token::new(token.user_id, duration) else {
        return Err(Error::InvalidDateFormat(format!(
            "cookie duration {duration} is out of range"
        )));
    };

    if extended.expires_at <= token.expires_at {
        return Ok(jar);
    }

    add_token(jar, extended)
}
