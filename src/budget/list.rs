//! Budgets listing page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{Budget, get_budgets},
    date_range::{month_bounds, month_label},
    endpoints,
    expense::{ExpenseFilter, total_amount},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    money::Amount,
    navigation::NavBar,
};

/// The state needed for the budgets listing page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct BudgetRow {
    budget: Budget,
    spent: Amount,
    edit_url: String,
}

/// Render the user's budgets with how much was spent in each month.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;

    let rows = budgets
        .into_iter()
        .map(|budget| {
            let month_filter = ExpenseFilter::in_range(month_bounds(budget.month));
            let spent = total_amount(user_id, &month_filter, &connection)?;

            Ok(BudgetRow {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id),
                budget,
                spent,
            })
        })
        .collect::<Result<Vec<_>, Error>>()
        .inspect_err(|error| tracing::error!("Could not total spending per budget: {error}"))?;

    Ok(budgets_view(&rows).into_response())
}

fn budgets_view(rows: &[BudgetRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let table_row = |row: &BudgetRow| {
        let over_budget = row.spent > row.budget.amount;

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (month_label(row.budget.month)) }
                td class=(TABLE_CELL_STYLE) { (format_currency(row.budget.amount)) }
                td
                    class=(TABLE_CELL_STYLE)
                    data-over-budget=[over_budget.then_some("true")]
                {
                    @if over_budget {
                        span class="text-red-600 dark:text-red-400" { (format_currency(row.spent)) }
                    } @else {
                        (format_currency(row.spent))
                    }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(row.edit_url) class=(LINK_STYLE) { "Edit" }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Set Budget" }
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            (table_row(row))
                        }

                        @if rows.is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No budgets set yet. "
                                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                                    {
                                        "Set your first budget"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[], &content)
}
