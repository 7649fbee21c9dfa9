//! Database operations for user-defined categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryName, UserCategory},
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category called `name`.
pub fn create_user_category(
    user_id: UserID,
    name: CategoryName,
    connection: &Connection,
) -> Result<UserCategory, Error> {
    connection
        .execute(
            "INSERT INTO user_category (user_id, name) VALUES (?1, ?2);",
            (user_id.as_i64(), name.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateCategoryName(name.to_string())
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(UserCategory { id, name })
}

/// Retrieve the categories created by `user_id`, ordered by name.
pub fn get_user_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<UserCategory>, Error> {
    connection
        .prepare("SELECT id, name FROM user_category WHERE user_id = ?1 ORDER BY name ASC;")?
        .query_map([user_id.as_i64()], map_user_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize the user category table.
pub fn create_user_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_user_category_row(row: &Row) -> Result<UserCategory, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(UserCategory {
        id,
        name: CategoryName::new_unchecked(&raw_name),
    })
}
