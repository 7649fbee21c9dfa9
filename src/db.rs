//! Database set up.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    auth::create_user_table, budget::create_budget_table,
    category::create_user_category_table, expense::create_expense_table,
};

/// Create all of the application's tables if they do not exist yet.
///
/// Foreign keys are switched on for `connection` so that deleting a user
/// removes their expenses, budgets and categories.
///
/// # Errors
/// Returns an error if any table could not be created. No tables are created in that case.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_user_category_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()
}
