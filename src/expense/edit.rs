//! The edit expense page and the endpoint for updating an expense.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error, UserID,
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{
        create::{ExpenseFormState, category_choices},
        form::{ExpenseForm, ExpenseFormDefaults, expense_form_view},
        get_expense, update_expense,
    },
    html::{FORM_CONTAINER_STYLE, FormAction, base},
    navigation::NavBar,
    timezone::current_local_date,
};

/// Renders the page for editing an expense.
///
/// Responds with 404 if the expense does not exist or belongs to another user.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseFormState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve expense {expense_id}: {error}");
        }
    })?;
    let categories = category_choices(user_id, &connection)?;

    let update_endpoint = format_endpoint(endpoints::EXPENSE, expense_id);
    let form = expense_form_view(
        FormAction::Update(&update_endpoint),
        &ExpenseFormDefaults::from_expense(&expense),
        &categories,
        today,
        "",
    );

    Ok(edit_expense_view(&form).into_response())
}

fn edit_expense_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Expense" }
            (form)
        }
    };

    base("Edit Expense", &[], &content)
}

/// A route handler for updating an expense, redirects to the dashboard on success.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseFormState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = match form.clone().into_builder(&state.classifier) {
        Ok(builder) => builder,
        Err(error) => {
            let categories = match category_choices(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let update_endpoint = format_endpoint(endpoints::EXPENSE, expense_id);

            return expense_form_view(
                FormAction::Update(&update_endpoint),
                &ExpenseFormDefaults::from_form(&form),
                &categories,
                form.date,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_expense(expense_id, user_id, builder, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingExpense) => {
            tracing::warn!("User {user_id} tried to update missing expense {expense_id}");
            Error::UpdateMissingExpense.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
