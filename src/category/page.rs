//! The categories page: lists every category a user can pick and adds new ones.

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
    category::{
        BASE_CATEGORIES, CategoryFormData, CategoryName, UserCategory, create_user_category,
        get_user_categories,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the categories page and endpoint.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page.
pub async fn get_categories_page(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user_categories = get_user_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get categories for {user_id}: {error}"))?;

    Ok(categories_view(&user_categories).into_response())
}

/// Add a category for the current user.
///
/// Names matching a base category, ignoring case, are rejected as duplicates.
pub async fn create_category_endpoint(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return category_form_view(&format!("Error: {error}")).into_response(),
    };

    if BASE_CATEGORIES
        .iter()
        .any(|base| base.eq_ignore_ascii_case(name.as_ref()))
    {
        return Error::DuplicateCategoryName(name.to_string()).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_user_category(user_id, name, &connection) {
        Ok(category) => {
            tracing::info!("User {user_id} added category {}", category.name);
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateCategoryName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_alert_response()
        }
    }
}

fn category_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full max-w-md space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "New Category" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Pets"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

fn category_badges(names: impl Iterator<Item = String>) -> Markup {
    html! {
        ul class="flex flex-wrap gap-2"
        {
            @for name in names {
                li class=(CATEGORY_BADGE_STYLE) { (name) }
            }
        }
    }
}

fn categories_view(user_categories: &[UserCategory]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-6"
            {
                h1 class="text-xl font-bold" { "Categories" }

                section id="base-categories" class="space-y-2"
                {
                    h2 class="font-semibold" { "Built-in" }
                    (category_badges(BASE_CATEGORIES.iter().map(|name| name.to_string())))
                }

                section id="user-categories" class="space-y-2"
                {
                    h2 class="font-semibold" { "Yours" }

                    @if user_categories.is_empty() {
                        span class="text-gray-500 dark:text-gray-400"
                        {
                            "You have not added any categories yet."
                        }
                    } @else {
                        (category_badges(user_categories.iter().map(|category| category.name.to_string())))
                    }
                }

                (category_form_view(""))
            }
        }
    };

    base("Categories", &[], &content)
}
