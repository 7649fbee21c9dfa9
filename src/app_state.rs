//! Implements a struct that holds the state of the server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::DEFAULT_COOKIE_DURATION, category::CategoryClassifier, db::initialize,
    pagination::PaginationConfig,
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The directory containing the LiberationSans font files used for PDF reports.
    ///
    /// PDF export is unavailable when this is `None`.
    pub pdf_font_dir: Option<PathBuf>,

    /// The rules for guessing an expense's category from its description.
    pub classifier: Arc<CategoryClassifier>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

/// The settings used to build an [AppState] that have sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// See [AppState::pagination_config].
    pub pagination_config: PaginationConfig,
    /// See [AppState::pdf_font_dir].
    pub pdf_font_dir: Option<PathBuf>,
    /// See [AppState::classifier].
    pub classifier: CategoryClassifier,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Kolkata".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        config: AppConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            pagination_config: config.pagination_config,
            pdf_font_dir: config.pdf_font_dir,
            classifier: Arc::new(config.classifier),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
