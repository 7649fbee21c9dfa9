//! The monthly summary page: spending per calendar month as a table and a bar chart.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, UserID,
    dashboard::charts::{DashboardChart, charts_script, charts_view, monthly_totals_chart},
    date_range::month_label,
    endpoints,
    html::{
        ECHARTS_SCRIPT, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, link,
    },
    money::Amount,
    navigation::NavBar,
};

/// The state needed for the monthly summary page.
#[derive(Debug, Clone)]
pub struct MonthlySummaryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MonthlySummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The total spent by the user in each month that has expenses, oldest first.
///
/// Months are identified by their first day.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn monthly_totals(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(Date, Amount)>, Error> {
    connection
        .prepare(
            "SELECT strftime('%Y-%m-01', date) AS month, SUM(amount) FROM expense \
            WHERE user_id = ?1 GROUP BY month ORDER BY month ASC",
        )?
        .query_map([user_id.as_i64()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// Display the user's spending for each month.
pub async fn get_monthly_summary_page(
    State(state): State<MonthlySummaryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let totals = monthly_totals(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get monthly totals: {error}"))?;

    Ok(monthly_summary_view(&totals).into_response())
}

fn monthly_summary_view(totals: &[(Date, Amount)]) -> Markup {
    let nav_bar = NavBar::new(endpoints::MONTHLY_SUMMARY_VIEW).into_html();

    let charts = if totals.is_empty() {
        Vec::new()
    } else {
        vec![DashboardChart {
            id: "monthly-chart",
            options: monthly_totals_chart(totals).to_string(),
        }]
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Monthly Summary" }

                (charts_view(&charts))

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class="px-6 py-3 text-right" { "Total" }
                        }
                    }

                    tbody
                    {
                        @for (month, total) in totals {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (month_label(*month)) }
                                td class="px-6 py-4 text-right" { (format_currency(*total)) }
                            }
                        }

                        @if totals.is_empty() {
                            tr
                            {
                                td
                                    colspan="2"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "Nothing to summarise yet. "
                                    (link(endpoints::NEW_EXPENSE_VIEW, "Add an expense"))
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    let head_elements = if charts.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Monthly Summary", &head_elements, &content)
}


#[cfg(test)]
mod monthly_summary_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        category::CategoryName,
        expense::{Expense, create_expense},
        money::Amount,
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_connection, insert_test_user,
            parse_html_document, select_text, table_rows,
        },
    };

    use super::{MonthlySummaryState, get_monthly_summary_page};

    #[tokio::test]
    async fn renders_table_and_chart() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        create_expense(
            user_id,
            Expense::build(
                "Rent",
                Amount::new(dec!(1000)).unwrap(),
                CategoryName::new_unchecked("Bills"),
                date!(2025 - 01 - 01),
            ),
            &connection,
        )
        .unwrap();
        let state = MonthlySummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_monthly_summary_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(table_rows(&html), [["Jan 2025", "₹1,000.00"]]);
        assert_eq!(select_text(&html, "#monthly-chart").len(), 1);
    }
}
