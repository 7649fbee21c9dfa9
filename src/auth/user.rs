//! User accounts: the user table and lookups by ID and username.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// Keeps user IDs from being mixed up with expense or budget IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    /// Unique, case-insensitive name used to log in.
    pub username: String,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
}

/// Create and insert a new user into the database.
///
/// Leading and trailing whitespace is removed from `username` and `email`.
///
/// # Errors
/// Returns:
/// - [Error::EmptyUsername] if `username` is blank,
/// - [Error::InvalidEmail] if `email` is not an email address,
/// - [Error::DuplicateUsername] if another user has the same username, ignoring case,
/// - [Error::SqlError] for any other SQL error.
pub fn create_user(
    username: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    let email = EmailAddress::from_str(email.trim())
        .map_err(|_| Error::InvalidEmail(email.trim().to_owned()))?;

    connection
        .execute(
            "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
            (username, email.as_str(), password_hash.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateUsername(username.to_owned())
            }
            error => error.into(),
        })?;

    Ok(User {
        id: UserID::new(connection.last_insert_rowid()),
        username: username.to_owned(),
        email,
        password_hash,
    })
}

/// Get the user with `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, username, email, password FROM user WHERE id = ?1",
            (user_id.as_i64(),),
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user called `username`, ignoring case.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, username, email, password FROM user WHERE username = ?1",
            (username.trim(),),
            map_user_row,
        )
        .map_err(Error::from)
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID::new(row.get(0)?),
        username: row.get(1)?,
        email: EmailAddress::new_unchecked(row.get::<_, String>(2)?),
        password_hash: PasswordHash::new_unchecked(&row.get::<_, String>(3)?),
    })
}
