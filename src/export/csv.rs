//! CSV export of every expense a user has recorded.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    Error, UserID,
    expense::{Expense, ExpenseFilter, get_expenses},
    export::ExportState,
};

/// The column names written as the first row of the CSV file.
pub const CSV_HEADER: [&str; 5] = ["Description", "Amount", "Category", "Date", "Notes"];

const CSV_FILENAME: &str = "expenses.csv";

/// Write `expenses` as CSV in the order given.
///
/// Amounts have two decimal places, dates are formatted as YYYY-MM-DD and
/// missing notes are written as an empty field.
///
/// # Errors
/// Returns [Error::CsvExportError] if a record could not be written.
pub fn write_expenses_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvExportError(error.to_string()))?;

    for expense in expenses {
        let amount = expense.amount.to_string();
        let date = expense.date.to_string();

        writer
            .write_record([
                expense.description.as_str(),
                amount.as_str(),
                expense.category.as_ref(),
                date.as_str(),
                expense.notes.as_deref().unwrap_or_default(),
            ])
            .map_err(|error| Error::CsvExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvExportError(error.to_string()))
}

/// Download all of the user's expenses, newest first, as a CSV file.
pub async fn export_csv_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses(user_id, &ExpenseFilter::default(), None, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses for export: {error}"))?
    };

    let csv = write_expenses_csv(&expenses)
        .inspect_err(|error| tracing::error!("could not export expenses: {error}"))?;
    tracing::info!("Exported {} expenses to CSV", expenses.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod write_csv_tests {
    use rust_decimal_macros::dec;
    use time::{OffsetDateTime, macros::date};

    use crate::{UserID, category::CategoryName, expense::Expense, money::Amount};

    use super::write_expenses_csv;

    #[test]
    fn writes_header_for_no_expenses() {
        let csv = write_expenses_csv(&[]).unwrap();

        assert_eq!(String::from_utf8(csv).unwrap(), "Description,Amount,Category,Date,Notes\n");
    }

    #[test]
    fn quotes_fields_with_commas() {
        let expense = Expense {
            id: 1,
            user_id: UserID::new(1),
            description: "Dinner, drinks".to_owned(),
            amount: Amount::new(dec!(1234.5)).unwrap(),
            category: CategoryName::new_unchecked("Food"),
            date: date!(2025 - 03 - 04),
            notes: Some("Birthday".to_owned()),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let csv = write_expenses_csv(&[expense]).unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "Description,Amount,Category,Date,Notes\n\
            \"Dinner, drinks\",1234.50,Food,2025-03-04,Birthday\n"
        );
    }
}
