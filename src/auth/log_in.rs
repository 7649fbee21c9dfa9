//! The log-in page and the handler that checks credentials and starts a session.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie},
        redirect::normalize_redirect_url,
        user::get_user_by_username,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input,
        text_input,
    },
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Shown for both unknown usernames and wrong passwords so that the form does
/// not reveal which usernames exist.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The state needed to log in or sign up and start a session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The session length when "remember me" is not selected.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl SessionState {
    /// Create the cookie key from a string and use the default session length.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SessionState> for Key {
    fn from_ref(state: &SessionState) -> Self {
        state.cookie_key.clone()
    }
}

fn log_in_form(username: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("username", "Username", "text", username, None))
            (password_input("", 0, None))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }

            span class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &[], &content).into_response()
}

/// The data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    pub username: String,
    pub password: String,
    /// A checkbox, so any value means "remember me" and a missing value means the default session.
    pub remember_me: Option<String>,
    /// Where to send the user once they are logged in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to
/// `redirect_url`, or the dashboard if there is none. Otherwise the form is
/// returned with an error message.
pub async fn post_log_in(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let render_error =
        |message: &str| log_in_form(&form.username, Some(message), redirect_url).into_response();

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        };

        match get_user_by_username(&form.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
            Err(error) => {
                tracing::error!("Unhandled error while looking up user: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("Failed log in attempt for user {}", user.id);
            return render_error(INVALID_CREDENTIALS_ERROR_MSG);
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG);
        }
    }

    let cookie_duration = if form.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW).to_owned();

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(jar) => (StatusCode::SEE_OTHER, HxRedirect(redirect_url), jar).into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::{Form, PrivateCookieJar};
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash, ValidatedPassword,
        auth::{cookie::COOKIE_TOKEN, create_user},
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, get_test_connection,
            must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, RedirectQuery, SessionState, get_log_in_page,
        post_log_in,
    };

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state() -> SessionState {
        let connection = get_test_connection();
        // Lowest bcrypt cost to keep the tests quick.
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap();
        create_user("priya", "priya@example.com", hash, &connection).unwrap();

        SessionState::new("foobar", Arc::new(Mutex::new(connection)))
    }

    fn log_in_data(username: &str, password: &str) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn log_in(state: SessionState, data: LogInData) -> axum::response::Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        post_log_in(State(state), jar, Form(data)).await
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn log_in_page_keeps_safe_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("/monthly".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let selector = scraper::Selector::parse("input[name=redirect_url]").unwrap();
        let input = document.select(&selector).next().expect("no redirect input");
        assert_eq!(input.value().attr("value"), Some("/monthly"));
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = log_in(get_test_state(), log_in_data("Priya", PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let set_cookie = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.starts_with(COOKIE_TOKEN));
        assert!(set_cookie, "want auth cookie to be set");
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_page() {
        let mut data = log_in_data("priya", PASSWORD);
        data.redirect_url = Some("/budgets".to_owned());

        let response = log_in(get_test_state(), data).await;

        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);
    }

    #[tokio::test]
    async fn log_in_ignores_offsite_redirect() {
        let mut data = log_in_data("priya", PASSWORD);
        data.redirect_url = Some("https://evil.example".to_owned());

        let response = log_in(get_test_state(), data).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn remember_me_extends_session() {
        let state = get_test_state();
        let mut data = log_in_data("priya", PASSWORD);
        data.remember_me = Some("on".to_owned());

        let response = log_in(state, data).await;

        let header = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(COOKIE_TOKEN))
            .expect("auth cookie missing")
            .to_owned();
        let cookie = axum_extra::extract::cookie::Cookie::parse(header).unwrap();
        let expires = cookie.expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + Duration::days(7);
        assert!((expires - want).abs() < Duration::seconds(5));
    }

    #[tokio::test]
    async fn wrong_password_shows_error() {
        let response = log_in(get_test_state(), log_in_data("priya", "wrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn unknown_user_shows_same_error() {
        let response = log_in(get_test_state(), log_in_data("nobody", PASSWORD)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }
}
