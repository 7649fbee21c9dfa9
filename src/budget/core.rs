//! The budget model and its database queries.

use rusqlite::{Connection, OptionalExtension, Row};
use time::Date;

use crate::{
    Error, auth::UserID, database_id::BudgetId, date_range::first_day_of_month, money::Amount,
};

/// The most a user plans to spend in a calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    /// The first day of the month the budget applies to.
    pub month: Date,
    pub amount: Amount,
}

/// Create a budget for the month containing `month`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the user already has a budget for that month,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    month: Date,
    amount: Amount,
    connection: &Connection,
) -> Result<Budget, Error> {
    let month = first_day_of_month(month);

    connection
        .prepare(
            "INSERT INTO budget (user_id, month, amount) VALUES (?1, ?2, ?3)
             RETURNING id, user_id, month, amount",
        )?
        .query_row((user_id.as_i64(), month, amount), map_budget_row)
        .map_err(|error| map_unique_violation(error, month))
}

/// Retrieve the budget `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such budget for the user.
pub fn get_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .query_row(
            "SELECT id, user_id, month, amount FROM budget WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// The budgets of `user_id`, most recent month first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, month, amount FROM budget WHERE user_id = ?1 ORDER BY month DESC",
        )?
        .query_map([user_id.as_i64()], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// The budget for the month containing `date`, if the user has set one.
pub fn get_budget_for_month(
    user_id: UserID,
    date: Date,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    connection
        .query_row(
            "SELECT id, user_id, month, amount FROM budget WHERE user_id = ?1 AND month = ?2",
            (user_id.as_i64(), first_day_of_month(date)),
            map_budget_row,
        )
        .optional()
        .map_err(Error::from)
}

/// Change the month and amount of the budget `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - [Error::DuplicateBudget] if another of the user's budgets covers the new month,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    user_id: UserID,
    month: Date,
    amount: Amount,
    connection: &Connection,
) -> Result<(), Error> {
    let month = first_day_of_month(month);

    let rows_affected = connection
        .execute(
            "UPDATE budget SET month = ?1, amount = ?2 WHERE id = ?3 AND user_id = ?4",
            (month, amount, id, user_id.as_i64()),
        )
        .map_err(|error| map_unique_violation(error, month))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

fn map_unique_violation(error: rusqlite::Error, month: Date) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::DuplicateBudget(month)
        }
        error => error.into(),
    }
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, month),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        month: row.get(2)?,
        amount: row.get(3)?,
    })
}

#[cfg(test)]
mod budget_query_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        budget::{create_budget, get_budget, get_budget_for_month, get_budgets, update_budget},
        money::Amount,
        test_utils::{get_test_connection, insert_test_user},
    };

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn create_normalizes_month() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");

        let budget =
            create_budget(user_id, date!(2025 - 02 - 17), amount(dec!(20000)), &conn).unwrap();

        assert_eq!(budget.month, date!(2025 - 02 - 01));
        assert_eq!(get_budget(budget.id, user_id, &conn), Ok(budget));
    }

    #[test]
    fn create_fails_on_duplicate_month() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");
        create_budget(user_id, date!(2025 - 02 - 01), amount(dec!(20000)), &conn).unwrap();

        let result = create_budget(user_id, date!(2025 - 02 - 28), amount(dec!(100)), &conn);

        assert_eq!(result, Err(Error::DuplicateBudget(date!(2025 - 02 - 01))));
    }

    #[test]
    fn different_users_can_budget_same_month() {
        let conn = get_test_connection();
        let first = insert_test_user(&conn, "priya");
        let second = insert_test_user(&conn, "arjun");
        create_budget(first, date!(2025 - 02 - 01), amount(dec!(20000)), &conn).unwrap();

        let result = create_budget(second, date!(2025 - 02 - 01), amount(dec!(100)), &conn);

        assert!(result.is_ok(), "got {result:?}");
    }

    #[test]
    fn lists_most_recent_month_first() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");
        for month in [date!(2025 - 01 - 01), date!(2025 - 03 - 01), date!(2024 - 12 - 01)] {
            create_budget(user_id, month, amount(dec!(1000)), &conn).unwrap();
        }

        let months = get_budgets(user_id, &conn)
            .unwrap()
            .into_iter()
            .map(|budget| budget.month)
            .collect::<Vec<_>>();

        assert_eq!(
            months,
            [date!(2025 - 03 - 01), date!(2025 - 01 - 01), date!(2024 - 12 - 01)]
        );
    }

    #[test]
    fn finds_budget_for_any_day_of_month() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");
        let budget =
            create_budget(user_id, date!(2025 - 03 - 01), amount(dec!(1000)), &conn).unwrap();

        assert_eq!(
            get_budget_for_month(user_id, date!(2025 - 03 - 31), &conn),
            Ok(Some(budget))
        );
        assert_eq!(
            get_budget_for_month(user_id, date!(2025 - 04 - 01), &conn),
            Ok(None)
        );
    }

    #[test]
    fn update_changes_month_and_amount() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");
        let budget =
            create_budget(user_id, date!(2025 - 03 - 01), amount(dec!(1000)), &conn).unwrap();

        update_budget(
            budget.id,
            user_id,
            date!(2025 - 04 - 15),
            amount(dec!(1500)),
            &conn,
        )
        .unwrap();

        let got = get_budget(budget.id, user_id, &conn).unwrap();
        assert_eq!(got.month, date!(2025 - 04 - 01));
        assert_eq!(got.amount, amount(dec!(1500)));
    }

    #[test]
    fn update_by_other_user_fails() {
        let conn = get_test_connection();
        let owner = insert_test_user(&conn, "priya");
        let other = insert_test_user(&conn, "arjun");
        let budget =
            create_budget(owner, date!(2025 - 03 - 01), amount(dec!(1000)), &conn).unwrap();

        let result = update_budget(budget.id, other, date!(2025 - 03 - 01), amount(dec!(1)), &conn);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
        assert_eq!(get_budget(budget.id, owner, &conn), Ok(budget));
    }

    #[test]
    fn update_into_taken_month_fails() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "priya");
        create_budget(user_id, date!(2025 - 03 - 01), amount(dec!(1000)), &conn).unwrap();
        let april =
            create_budget(user_id, date!(2025 - 04 - 01), amount(dec!(1000)), &conn).unwrap();

        let result = update_budget(
            april.id,
            user_id,
            date!(2025 - 03 - 10),
            amount(dec!(1000)),
            &conn,
        );

        assert_eq!(result, Err(Error::DuplicateBudget(date!(2025 - 03 - 01))));
    }
}
