//! The edit budget page and the endpoint for updating a budget.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID,
    budget::{
        create::{BudgetFormState, budget_page_view},
        form::{BudgetForm, budget_form_view, month_input_value},
        get_budget, update_budget,
    },
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    html::FormAction,
};

/// Renders the page for editing a budget.
///
/// Responds with 404 if the budget does not exist or belongs to another user.
pub async fn get_edit_budget_page(
    State(state): State<BudgetFormState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, user_id, &connection)?;

    let update_endpoint = format_endpoint(endpoints::BUDGET, budget_id);
    let form = budget_form_view(
        FormAction::Update(&update_endpoint),
        &month_input_value(budget.month),
        Some(budget.amount.as_decimal()),
        "",
    );

    Ok(budget_page_view("Edit Budget", endpoints::EDIT_BUDGET_VIEW, &form).into_response())
}

/// A route handler for updating a budget, redirects to the budgets page on success.
pub async fn update_budget_endpoint(
    State(state): State<BudgetFormState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let update_endpoint = format_endpoint(endpoints::BUDGET, budget_id);

    let budget = match form.validate() {
        Ok(budget) => budget,
        Err(error_message) => {
            return budget_form_view(
                FormAction::Update(&update_endpoint),
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

    match update_budget(budget_id, user_id, budget.month, budget.amount, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingBudget | Error::DuplicateBudget(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
