//! The new budget page and the endpoint for creating a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{
        create_budget,
        form::{BudgetForm, budget_form_view, month_input_value},
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, FormAction, base},
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed for creating and updating budgets.
#[derive(Debug, Clone)]
pub struct BudgetFormState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for setting a budget, defaulting to the current month.
pub async fn get_new_budget_page(State(state): State<BudgetFormState>) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let form = budget_form_view(
        FormAction::Create(endpoints::BUDGETS_API),
        &month_input_value(today),
        None,
        "",
    );

    Ok(budget_page_view("Set Budget", endpoints::NEW_BUDGET_VIEW, &form).into_response())
}

pub(super) fn budget_page_view(title: &str, active_endpoint: &str, form: &Markup) -> Markup {
    let nav_bar = NavBar::new(active_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { (title) }
            (form)
        }
    };

    base(title, &[], &content)
}

/// A route handler for creating a budget, redirects to the budgets page on success.
///
/// A second budget for the same month is rejected with an alert.
pub async fn create_budget_endpoint(
    State(state): State<BudgetFormState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let budget = match form.validate() {
        Ok(budget) => budget,
        Err(error_message) => {
            return budget_form_view(
                FormAction::Create(endpoints::BUDGETS_API),
                &form.month,
                Some(form.amount),
                &error_message,
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(user_id, budget.month, budget.amount, &connection) {
        Ok(budget) => {
            tracing::info!("User {user_id} set a budget for {}", budget.month);

            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateBudget(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create budget: {error}");
            error.into_alert_response()
        }
    }
}
