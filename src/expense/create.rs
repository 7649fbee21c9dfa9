//! The new expense page and the endpoint for recording an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{CategoryClassifier, CategoryName, get_user_categories, merge_category_choices},
    endpoints,
    expense::{
        create_expense,
        form::{ExpenseForm, ExpenseFormDefaults, expense_form_view},
    },
    html::{FORM_CONTAINER_STYLE, FormAction, base},
    navigation::NavBar,
    timezone::current_local_date,
};

/// The state needed to show the expense form and save expenses.
#[derive(Debug, Clone)]
pub struct ExpenseFormState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// Predicts the category when the user leaves it for the app to decide.
    pub classifier: Arc<CategoryClassifier>,
}

impl FromRef<AppState> for ExpenseFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            classifier: state.classifier.clone(),
        }
    }
}

/// The categories offered on the expense form for `user_id`.
pub(super) fn category_choices(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryName>, Error> {
    let user_categories = get_user_categories(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get categories for {user_id}: {error}"))?;

    Ok(merge_category_choices(&user_categories))
}

/// Renders the page for recording an expense.
pub async fn get_new_expense_page(
    State(state): State<ExpenseFormState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = category_choices(user_id, &connection)?;

    let form = expense_form_view(
        FormAction::Create(endpoints::EXPENSES_API),
        &ExpenseFormDefaults::default(),
        &categories,
        today,
        "",
    );

    Ok(new_expense_view(&form).into_response())
}

fn new_expense_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Add Expense" }
            (form)
        }
    };

    base("Add Expense", &[], &content)
}

/// A route handler for recording an expense, redirects to the dashboard on success.
///
/// Invalid input re-renders the form with an error message.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseFormState>,
    Extension(user_id): Extension<UserID>,
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

            return expense_form_view(
                FormAction::Create(endpoints::EXPENSES_API),
                &ExpenseFormDefaults::from_form(&form),
                &categories,
                form.date,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match create_expense(user_id, builder, &connection) {
        Ok(expense) => {
            tracing::debug!(
                "User {user_id} recorded expense {} in {}",
                expense.id,
                expense.category
            );

            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod new_expense_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};

    use crate::{
        category::{CategoryClassifier, CategoryName, create_user_category},
        endpoints,
        test_utils::{
            assert_content_type, assert_form_select, assert_hx_endpoint, assert_valid_html,
            get_test_connection, insert_test_user, must_get_form, parse_html_document,
        },
    };

    use super::{ExpenseFormState, get_new_expense_page};

    #[tokio::test]
    async fn offers_base_and_user_categories() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        create_user_category(user_id, CategoryName::new_unchecked("Pets"), &connection).unwrap();
        let state = ExpenseFormState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            classifier: Arc::new(CategoryClassifier::default()),
        };

        let response = get_new_expense_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");
        assert_form_select(
            &form,
            "category",
            &["Food", "Travel", "Shopping", "Bills", "Entertainment", "Other", "Pets"],
            Some(""),
        );
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");
        let state = ExpenseFormState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Not/AZone".to_owned(),
            classifier: Arc::new(CategoryClassifier::default()),
        };

        let result = get_new_expense_page(State(state), Extension(user_id)).await;

        assert!(result.is_err());
    }
}

#[cfg(test)]
mod create_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        UserID,
        category::CategoryClassifier,
        endpoints,
        expense::{ExpenseFilter, form::ExpenseForm, get_expenses},
        money::Amount,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, get_test_connection, insert_test_user,
            must_get_form, parse_html_fragment,
        },
    };

    use super::{ExpenseFormState, create_expense_endpoint};

    fn get_state() -> (ExpenseFormState, UserID) {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "priya");

        (
            ExpenseFormState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
                classifier: Arc::new(CategoryClassifier::default()),
            },
            user_id,
        )
    }

    fn form(description: &str, amount: Decimal, category: &str) -> Form<ExpenseForm> {
        Form(ExpenseForm {
            description: description.to_owned(),
            amount,
            category: Some(category.to_owned()),
            date: date!(2025 - 06 - 12),
            notes: Some("".to_owned()),
        })
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (state, user_id) = get_state();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            form("Movie tickets", dec!(480), "Entertainment"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let expenses = get_expenses(user_id, &ExpenseFilter::default(), None, &connection).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Movie tickets");
        assert_eq!(expenses[0].amount, Amount::new(dec!(480)).unwrap());
        assert_eq!(expenses[0].category.as_ref(), "Entertainment");
        assert_eq!(expenses[0].notes, None);
    }

    #[tokio::test]
    async fn other_category_stores_prediction() {
        let (state, user_id) = get_state();

        create_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            form("Pizza night", dec!(600), "Other"),
        )
        .await;

        let connection = state.db_connection.lock().unwrap();
        let expenses = get_expenses(user_id, &ExpenseFilter::default(), None, &connection).unwrap();
        assert_eq!(expenses[0].category.as_ref(), "Food");
    }

    #[tokio::test]
    async fn blank_description_renders_form_error() {
        let (state, user_id) = get_state();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            form("   ", dec!(10), ""),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Description cannot be empty");
        let connection = state.db_connection.lock().unwrap();
        let expenses = get_expenses(user_id, &ExpenseFilter::default(), None, &connection).unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn negative_amount_renders_form_error() {
        let (state, user_id) = get_state();

        let response = create_expense_endpoint(
            State(state),
            Extension(user_id),
            form("Refund", dec!(-5), "Food"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: -5 is negative, amounts must be zero or more");
    }
}
