//! The dashboard page: filtered expenses, totals, a category chart, insights and the budget card.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, UserID,
    budget::get_budget_for_month,
    category::CategoryName,
    dashboard::{
        charts::{DashboardChart, category_breakdown_chart, charts_script, charts_view},
        insights::{BudgetStatus, Insight, budget_card_view, compute_insights, insights_view},
    },
    date_range::{month_bounds, previous_month_bounds},
    endpoints,
    expense::{
        Expense, ExpenseFilter, ExpenseQuery, PageWindow, QuickFilter, category_totals,
        count_expenses, get_expenses, total_amount,
    },
    html::{
        CATEGORY_BADGE_STYLE, ECHARTS_SCRIPT, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency, link,
    },
    money::Amount,
    navigation::NavBar,
    pagination::{
        PaginationConfig, PaginationIndicator, clamp_page, create_pagination_indicators,
        page_count, pagination_view,
    },
    timezone::current_local_date,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Everything shown on the dashboard.
struct DashboardData {
    expenses: Vec<Expense>,
    filtered_total: Amount,
    category_totals: Vec<(CategoryName, Amount)>,
    insights: Vec<Insight>,
    budget_status: Option<BudgetStatus>,
    pagination: Vec<PaginationIndicator>,
}

/// Display the user's expenses selected by the query parameters along with
/// this month's insights.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(user_id, &query, today, &state.pagination_config, &connection)
        .inspect_err(|error| tracing::error!("could not load dashboard data: {error}"))?;

    Ok(dashboard_view(&query, &data).into_response())
}

fn build_dashboard_data(
    user_id: UserID,
    query: &ExpenseQuery,
    today: Date,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    let filter = ExpenseFilter::from_query(query, today);

    let expense_count = count_expenses(user_id, &filter, connection)?;
    let page_size = pagination_config.default_page_size;
    let last_page = page_count(expense_count, page_size);
    let page = clamp_page(
        query.page_number().unwrap_or(pagination_config.default_page),
        last_page,
    );

    let expenses = get_expenses(
        user_id,
        &filter,
        Some(PageWindow::new(page, page_size)),
        connection,
    )?;
    let filtered_total = total_amount(user_id, &filter, connection)?;
    let category_totals = category_totals(user_id, &filter, connection)?;

    let this_month = get_expenses(
        user_id,
        &ExpenseFilter::in_range(month_bounds(today)),
        None,
        connection,
    )?;
    let previous_month_total = total_amount(
        user_id,
        &ExpenseFilter::in_range(previous_month_bounds(today)),
        connection,
    )?;
    let budget = get_budget_for_month(user_id, today, connection)?;

    let insights = compute_insights(&this_month, previous_month_total, budget.as_ref());
    let spent_this_month: Amount = this_month.iter().map(|expense| expense.amount).sum();
    let budget_status = budget.map(|budget| BudgetStatus::new(budget.amount, spent_this_month));

    Ok(DashboardData {
        expenses,
        filtered_total,
        category_totals,
        insights,
        budget_status,
        pagination: create_pagination_indicators(page, last_page, pagination_config.max_pages),
    })
}

/// The dashboard URL for `page` that keeps the current filters.
fn page_url(query: &ExpenseQuery, page: u64) -> String {
    let query = ExpenseQuery {
        page: Some(page.to_string()),
        ..query.clone()
    };

    match serde_urlencoded::to_string(&query) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::DASHBOARD_VIEW),
        Err(error) => {
            tracing::error!("could not encode dashboard query {query:?}: {error}");
            endpoints::DASHBOARD_VIEW.to_owned()
        }
    }
}

fn filter_form_view(query: &ExpenseQuery) -> Markup {
    let selected_filter = query
        .filter
        .as_deref()
        .map(QuickFilter::parse)
        .unwrap_or_default();

    html! {
        form
            id="filter-form"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full grid grid-cols-1 md:grid-cols-5 gap-4 items-end"
        {
            div
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    name="q"
                    id="q"
                    placeholder="Description, notes or category"
                    value=[query.q.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    name="from"
                    id="from"
                    value=[query.from.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    name="to"
                    id="to"
                    value=[query.to.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter" class=(FORM_LABEL_STYLE) { "Period" }
                select name="filter" id="filter" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for quick_filter in QuickFilter::ALL {
                        option
                            value=(quick_filter.as_query_value())
                            selected[quick_filter == selected_filter]
                        {
                            (quick_filter.label())
                        }
                    }
                }
            }

            div class="flex gap-4 items-center"
            {
                button
                    type="submit"
                    class="px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                        hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
                {
                    "Apply"
                }

                a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

fn expenses_table_view(expenses: &[Expense]) -> Markup {
    let table_row = |expense: &Expense| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
        let delete_url = endpoints::format_endpoint(endpoints::EXPENSE, expense.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? This cannot be undone.",
            expense.description
        );

        html! {
            tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
            {
                td class=(TABLE_CELL_STYLE) { (expense.date) }
                td class=(TABLE_CELL_STYLE)
                {
                    (expense.description)

                    @if let Some(notes) = &expense.notes {
                        p class="text-xs text-gray-500 dark:text-gray-400" { (notes) }
                    }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
                }
                td class="px-6 py-4 text-right" { (format_currency(expense.amount)) }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete"
                        ))
                    }
                }
            }
        }
    };

    html! {
        table
            id="expenses"
            class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for expense in expenses {
                    (table_row(expense))
                }

                @if expenses.is_empty() {
                    tr
                    {
                        td
                            colspan="5"
                            class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            "No expenses found. "
                            (link(endpoints::NEW_EXPENSE_VIEW, "Add an expense"))
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(query: &ExpenseQuery, data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let charts = if data.category_totals.is_empty() {
        Vec::new()
    } else {
        vec![DashboardChart {
            id: "category-chart",
            options: category_breakdown_chart(&data.category_totals).to_string(),
        }]
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div
                id="dashboard-content"
                class="space-y-6 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                        a href=(endpoints::EXPORT_CSV) class=(LINK_STYLE) download { "Export CSV" }
                        a href=(endpoints::EXPORT_PDF) class=(LINK_STYLE) download { "Export PDF" }
                    }
                }

                (budget_card_view(data.budget_status))

                (insights_view(&data.insights))

                (filter_form_view(query))

                p class="text-lg"
                {
                    "Total: "
                    span id="filtered-total" class="font-semibold"
                    {
                        (format_currency(data.filtered_total))
                    }
                }

                (expenses_table_view(&data.expenses))

                (pagination_view(&data.pagination, |page| page_url(query, page)))

                (charts_view(&charts))
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

    base("Dashboard", &head_elements, &content)
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        response::Response,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use rusqlite::Connection;
    use scraper::Html;
    use time::{Date, Duration, OffsetDateTime, macros::date};

    use crate::{
        UserID,
        budget::create_budget,
        category::CategoryName,
        date_range::{first_day_of_month, previous_month_bounds},
        expense::{Expense, ExpenseQuery, create_expense},
        money::Amount,
        pagination::PaginationConfig,
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_connection, insert_test_user,
            parse_html_document, select_text, table_rows,
        },
    };

    use super::{DashboardState, get_dashboard_page, page_url};

    fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }

    fn add_expense(
        connection: &Connection,
        user_id: UserID,
        description: &str,
        amount: Decimal,
        category: &str,
        date: Date,
    ) {
        create_expense(
            user_id,
            Expense::build(
                description,
                Amount::new(amount).unwrap(),
                CategoryName::new_unchecked(category),
                date,
            ),
            connection,
        )
        .unwrap();
    }

    async fn get_page(connection: Connection, user_id: UserID, query: ExpenseQuery) -> Response {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            pagination_config: PaginationConfig::default(),
        };

        get_dashboard_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap()
    }

    async fn get_html(connection: Connection, user_id: UserID, query: ExpenseQuery) -> Html {
        let response = get_page(connection, user_id, query).await;
        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    fn descriptions(html: &Html) -> Vec<String> {
        table_rows(html)
            .into_iter()
            .map(|row| row[1].clone())
            .collect()
    }

    #[tokio::test]
    async fn empty_dashboard_prompts_for_expenses() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");

        let html = get_html(connection, user_id, ExpenseQuery::default()).await;

        let rows = table_rows(&html);
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].starts_with("No expenses found."), "got {rows:?}");
        assert_eq!(select_text(&html, "#filtered-total"), ["₹0.00"]);
        assert!(select_text(&html, "#insights").is_empty());
        assert!(select_text(&html, "#category-chart").is_empty());
    }

    #[tokio::test]
    async fn shows_only_own_expenses_newest_first() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        let other = insert_test_user(&connection, "arjun");
        let today = today();
        add_expense(&connection, user_id, "Groceries", dec!(20), "Food", today - Duration::days(2));
        add_expense(&connection, user_id, "Taxi", dec!(15), "Travel", today);
        add_expense(&connection, other, "Secret", dec!(99), "Other", today);

        let html = get_html(connection, user_id, ExpenseQuery::default()).await;

        assert_eq!(descriptions(&html), ["Taxi", "Groceries"]);
        assert_eq!(select_text(&html, "#filtered-total"), ["₹35.00"]);
    }

    #[tokio::test]
    async fn search_and_date_filters_compose() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        add_expense(&connection, user_id, "Coffee", dec!(3.5), "Food", date!(2025 - 01 - 02));
        add_expense(&connection, user_id, "Coffee beans", dec!(12), "Food", date!(2025 - 02 - 02));
        add_expense(&connection, user_id, "Rent", dec!(1000), "Bills", date!(2025 - 01 - 01));

        let query = ExpenseQuery {
            q: Some("coffee".to_owned()),
            from: Some("2025-01-01".to_owned()),
            to: Some("2025-01-31".to_owned()),
            ..Default::default()
        };
        let html = get_html(connection, user_id, query).await;

        assert_eq!(descriptions(&html), ["Coffee"]);
        assert_eq!(select_text(&html, "#filtered-total"), ["₹3.50"]);
    }

    #[tokio::test]
    async fn malformed_date_is_ignored() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        add_expense(&connection, user_id, "Coffee", dec!(3.5), "Food", today());

        let query = ExpenseQuery {
            from: Some("not-a-date".to_owned()),
            ..Default::default()
        };
        let html = get_html(connection, user_id, query).await;

        assert_eq!(descriptions(&html), ["Coffee"]);
    }

    #[tokio::test]
    async fn paginates_six_per_page() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        let today = today();
        for day in 0..8 {
            add_expense(
                &connection,
                user_id,
                &format!("Expense {day}"),
                dec!(1),
                "Other",
                today - Duration::days(day),
            );
        }

        let query = ExpenseQuery {
            page: Some("2".to_owned()),
            ..Default::default()
        };
        let html = get_html(connection, user_id, query).await;

        assert_eq!(descriptions(&html), ["Expense 6", "Expense 7"]);
        assert_eq!(select_text(&html, "#filtered-total"), ["₹8.00"]);
        assert_eq!(select_text(&html, "nav.pagination [aria-current=page]"), ["2"]);
    }

    #[tokio::test]
    async fn shows_insights_and_budget_card() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        let today = today();
        let month_start = first_day_of_month(today);
        add_expense(&connection, user_id, "Rent", dec!(950), "Bills", today);
        add_expense(
            &connection,
            user_id,
            "Old rent",
            dec!(500),
            "Bills",
            previous_month_bounds(today).start,
        );
        create_budget(user_id, month_start, Amount::new(dec!(1000)).unwrap(), &connection)
            .unwrap();

        let html = get_html(connection, user_id, ExpenseQuery::default()).await;

        assert_eq!(
            select_text(&html, "#insights li"),
            [
                "Top spending category this month: Bills (₹950.00).",
                "Spending increased 90% vs last month.",
                "Warning: You have used 90%+ of your budget this month.",
            ]
        );
        assert_eq!(select_text(&html, "#budget-percent"), ["95%"]);
        assert_eq!(select_text(&html, "#budget-spent"), ["₹950.00"]);
    }

    #[tokio::test]
    async fn renders_category_chart() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        add_expense(&connection, user_id, "Coffee", dec!(3.5), "Food", today());

        let html = get_html(connection, user_id, ExpenseQuery::default()).await;

        assert_eq!(select_text(&html, "#category-chart").len(), 1);
    }

    #[tokio::test]
    async fn malformed_page_shows_first_page() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        add_expense(&connection, user_id, "Coffee", dec!(3.5), "Food", today());

        let query = ExpenseQuery {
            page: Some("abc".to_owned()),
            ..Default::default()
        };
        let html = get_html(connection, user_id, query).await;

        assert_eq!(descriptions(&html), ["Coffee"]);
    }

    #[test]
    fn page_url_keeps_filters() {
        let query = ExpenseQuery {
            q: Some("coffee".to_owned()),
            filter: Some("week".to_owned()),
            page: Some("1".to_owned()),
            ..Default::default()
        };

        assert_eq!(page_url(&query, 3), "/dashboard?q=coffee&filter=week&page=3");
    }
}
