//! Recording, editing, deleting and querying expenses.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod query;

pub use core::{
    Expense, ExpenseBuilder, create_expense, create_expense_table, delete_expense, get_expense,
    map_expense_row, update_expense,
};
pub use create::{create_expense_endpoint, get_new_expense_page};
pub use delete::delete_expense_endpoint;
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use query::{
    ExpenseFilter, ExpenseQuery, PageWindow, QuickFilter, category_totals, count_expenses,
    get_expenses, total_amount,
};
