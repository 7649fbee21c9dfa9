//! Downloads of a user's expenses as a CSV file or a PDF report.

mod csv;
mod pdf;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use csv::export_csv_endpoint;
pub use pdf::export_pdf_endpoint;

/// The state needed for exporting expenses.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The directory holding the fonts for PDF reports, see [AppState::pdf_font_dir].
    pub pdf_font_dir: Option<PathBuf>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pdf_font_dir: state.pdf_font_dir.clone(),
        }
    }
}
