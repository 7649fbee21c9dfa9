//! PDF report of every expense a user has recorded.

use std::path::Path;

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use genpdf::{
    Document, Element, SimplePageDecorator, elements,
    style::Style,
};

use crate::{
    Error, UserID,
    auth::get_user_by_id,
    expense::{Expense, ExpenseFilter, get_expenses},
    export::ExportState,
    money::Amount,
};

/// The font family looked up in the font directory, e.g. `LiberationSans-Regular.ttf`.
const FONT_FAMILY: &str = "LiberationSans";
const PDF_FILENAME: &str = "expenses_report.pdf";
const REPORT_TITLE: &str = "Expense Report";

/// Render `expenses` as a PDF report for `username`.
///
/// # Errors
/// Returns:
/// - [Error::PdfEngineUnavailable] if `font_dir` is `None` or the fonts could not be loaded,
/// - [Error::PdfRenderError] if the document could not be rendered.
pub fn render_expenses_pdf(
    username: &str,
    expenses: &[Expense],
    font_dir: Option<&Path>,
) -> Result<Vec<u8>, Error> {
    let font_dir = font_dir
        .ok_or_else(|| Error::PdfEngineUnavailable("no font directory configured".to_owned()))?;

    let font_family = genpdf::fonts::from_files(font_dir, FONT_FAMILY, None).map_err(|error| {
        Error::PdfEngineUnavailable(format!(
            "could not load {FONT_FAMILY} fonts from {}: {error}",
            font_dir.display()
        ))
    })?;

    let mut document = Document::new(font_family);
    document.set_title(REPORT_TITLE);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(10);
    document.set_page_decorator(decorator);

    document.push(
        elements::Paragraph::new(REPORT_TITLE).styled(Style::new().bold().with_font_size(18)),
    );
    document.push(elements::Paragraph::new(format!("User: {username}")));

    let total: Amount = expenses.iter().map(|expense| expense.amount).sum();
    document.push(elements::Paragraph::new(format!(
        "{} expenses totalling {total}",
        expenses.len()
    )));
    document.push(elements::Break::new(1));

    let mut table = elements::TableLayout::new(vec![4, 2, 2, 2, 4]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let mut header_row = table.row();
    for column in ["Description", "Amount", "Category", "Date", "Notes"] {
        header_row.push_element(elements::Paragraph::new(column).styled(Style::new().bold()));
    }
    header_row
        .push()
        .map_err(|error| Error::PdfRenderError(error.to_string()))?;

    for expense in expenses {
        table
            .row()
            .element(elements::Paragraph::new(expense.description.as_str()))
            .element(elements::Paragraph::new(expense.amount.to_string()))
            .element(elements::Paragraph::new(expense.category.to_string()))
            .element(elements::Paragraph::new(expense.date.to_string()))
            .element(elements::Paragraph::new(
                expense.notes.as_deref().unwrap_or_default(),
            ))
            .push()
            .map_err(|error| Error::PdfRenderError(error.to_string()))?;
    }

    document.push(table);

    let mut buffer = Vec::new();
    document
        .render(&mut buffer)
        .map_err(|error| Error::PdfRenderError(error.to_string()))?;

    Ok(buffer)
}

/// Download all of the user's expenses, newest first, as a PDF report.
///
/// Responds with an error page explaining how to enable PDF export when no
/// fonts are available.
pub async fn export_pdf_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (user, expenses) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let user = get_user_by_id(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
        let expenses = get_expenses(user_id, &ExpenseFilter::default(), None, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses for export: {error}"))?;

        (user, expenses)
    };

    let pdf = render_expenses_pdf(&user.username, &expenses, state.pdf_font_dir.as_deref())?;
    tracing::info!("Exported {} expenses to PDF", expenses.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
