//! Monthly budgets: one spending limit per user per calendar month.

mod core;
mod create;
mod edit;
mod form;
mod list;

pub use core::{
    Budget, create_budget, create_budget_table, get_budget, get_budget_for_month, get_budgets,
    update_budget,
};
pub use create::{create_budget_endpoint, get_new_budget_page};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::get_budgets_page;
