//! The sign up page and the handler that creates an account.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{cookie::set_auth_cookie, log_in::SessionState, user::create_user},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        loading_spinner, log_in_register, password_input, text_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// Client side minimum password length. zxcvbn does the real check on the server.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// A validation error shown under one field of the sign up form.
#[derive(Clone, Copy)]
enum FieldError<'a> {
    Username(&'a str),
    Email(&'a str),
    Password(&'a str),
    ConfirmPassword(&'a str),
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_INPUT_MIN_LENGTH)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn sign_up_form(username: &str, email: &str, error: Option<FieldError>) -> Markup {
    let username_error = match error {
        Some(FieldError::Username(message)) => Some(message),
        _ => None,
    };
    let email_error = match error {
        Some(FieldError::Email(message)) => Some(message),
        _ => None,
    };
    let password_error = match error {
        Some(FieldError::Password(message)) => Some(message),
        _ => None,
    };
    let confirm_password_error = match error {
        Some(FieldError::ConfirmPassword(message)) => Some(message),
        _ => None,
    };

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", username, username_error))
            (text_input("email", "Email", "email", email, email_error))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, password_error))
            (confirm_password_input(confirm_password_error))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Account"
            }

            span class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn render_error(username: &str, email: &str, error: FieldError<'_>) -> Response {
    sign_up_form(username, email, Some(error)).into_response()
}

/// Display the sign up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form("", "", None);
    let content = log_in_register("Create an account", &form);

    base("Sign Up", &[], &content).into_response()
}

#[derive(Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a user from the sign up form and log them in.
///
/// Invalid input re-renders the form with an error under the offending field.
pub async fn sign_up(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() {
        return render_error(
            username,
            email,
            FieldError::Username("Username cannot be empty"),
        );
    }

    if !EmailAddress::is_valid(email) {
        return render_error(
            username,
            email,
            FieldError::Email("Enter a valid email address"),
        );
    }

    let validated_password = match ValidatedPassword::new(&form.password, &[username, email]) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return render_error(username, email, FieldError::Password(&message));
        }
    };

    if form.password != form.confirm_password {
        return render_error(
            username,
            email,
            FieldError::ConfirmPassword("Passwords do not match"),
        );
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match create_user(username, email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateUsername(_)) => {
                return render_error(
                    username,
                    email,
                    FieldError::Username("That username is already taken"),
                );
            }
            Err(error) => {
                tracing::error!("An unhandled error occurred while inserting a new user: {error}");
                return get_internal_server_error_redirect();
            }
        }
    };

    tracing::info!("Created user {} ({})", user.id, user.username);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
