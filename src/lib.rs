//! Spendwise is a web app for tracking personal expenses.
//!
//! Users record what they spend, have categories suggested from the
//! description, set monthly budgets, and get a dashboard with filters,
//! charts and plain-language insights about this month's spending.
//! Expenses can be downloaded as CSV or as a PDF report.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod date_range;
mod db;
mod endpoints;
mod error;
mod expense;
mod export;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppConfig, AppState};
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_username};
pub use budget::{Budget, create_budget};
pub use category::{CategoryClassifier, CategoryName, KeywordRule};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{Expense, create_expense};
pub use logging::logging_middleware;
pub use money::Amount;
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
