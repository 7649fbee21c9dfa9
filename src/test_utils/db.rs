use rusqlite::Connection;

use crate::{PasswordHash, UserID, auth::create_user};

/// Insert a user with a fixed, pre-hashed password and return their ID.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, username: &str) -> UserID {
    let password_hash = PasswordHash::new_unchecked("hunter2");

    create_user(
        username,
        &format!("{username}@example.com"),
        password_hash,
        connection,
    )
    .expect("Could not create test user")
    .id
}

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory");
    crate::db::initialize(&connection).expect("Could not initialize database");
    connection
}
