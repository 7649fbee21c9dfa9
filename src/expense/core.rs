//! Defines the expense model and the database queries for a single expense.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    database_id::ExpenseId,
    money::Amount,
};

// ============================================================================
// MODELS
// ============================================================================

/// Money spent by a user on a given day.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    /// The user who recorded the expense.
    pub user_id: UserID,
    /// What the money was spent on.
    pub description: String,
    pub amount: Amount,
    pub category: CategoryName,
    /// The day the money was spent.
    pub date: Date,
    pub notes: Option<String>,
    /// When the expense was recorded, used to order expenses on the same day.
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// Start building a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(
        description: &str,
        amount: Amount,
        category: CategoryName,
        date: Date,
    ) -> ExpenseBuilder {
        ExpenseBuilder {
            description: description.to_owned(),
            amount,
            category,
            date,
            notes: None,
        }
    }
}

/// The user supplied fields of an expense.
///
/// The description is validated when the expense is written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub description: String,
    pub amount: Amount,
    pub category: CategoryName,
    pub date: Date,
    /// Free text notes. Blank notes are stored as `None`.
    pub notes: Option<String>,
}

impl ExpenseBuilder {
    /// Set the notes for the expense.
    pub fn notes(mut self, notes: Option<&str>) -> Self {
        self.notes = notes
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_owned);
        self
    }

    fn validated_description(&self) -> Result<&str, Error> {
        let description = self.description.trim();

        if description.is_empty() {
            Err(Error::EmptyDescription)
        } else {
            Ok(description)
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDescription] if the description is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    user_id: UserID,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<Expense, Error> {
    let description = builder.validated_description()?;

    let expense = connection
        .prepare(
            "INSERT INTO expense (user_id, description, amount, category, date, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, description, amount, category, date, notes, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                description,
                builder.amount,
                builder.category.as_ref(),
                builder.date,
                builder.notes.as_deref(),
                OffsetDateTime::now_utc(),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve the expense `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, user_id, description, amount, category, date, notes, created_at
             FROM expense WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Overwrite the user supplied fields of the expense `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyDescription] if the description is blank,
/// - [Error::UpdateMissingExpense] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    user_id: UserID,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let description = builder.validated_description()?;

    let rows_affected = connection.execute(
        "UPDATE expense
         SET description = ?1, amount = ?2, category = ?3, date = ?4, notes = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            description,
            builder.amount,
            builder.category.as_ref(),
            builder.date,
            builder.notes.as_deref(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete the expense `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `id` does not refer to an expense owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )
}

/// Map a database row to an Expense.
///
/// Expects the columns id, user_id, description, amount, category, date, notes
/// and created_at in that order.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(4)?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: row.get(3)?,
        category: CategoryName::new_unchecked(&raw_category),
        date: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
