//! The budget form shared by the new and edit budget pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormAction},
    money::Amount,
};

const MONTH_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]");
const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The form data for creating or updating a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    /// A month as YYYY-MM, or any date in the month as YYYY-MM-DD.
    pub month: String,
    pub amount: Decimal,
}

/// A budget form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBudget {
    /// Any day in the budgeted month.
    pub month: Date,
    pub amount: Amount,
}

impl BudgetForm {
    /// Check the month and amount, returning a message for the user on failure.
    pub fn validate(&self) -> Result<ValidBudget, String> {
        let month = parse_month(&self.month)
            .ok_or_else(|| "Error: Enter the month as YYYY-MM".to_owned())?;
        let amount = Amount::new(self.amount).map_err(|error: Error| format!("Error: {error}"))?;

        Ok(ValidBudget { month, amount })
    }
}

fn parse_month(value: &str) -> Option<Date> {
    let value = value.trim();

    Date::parse(value, DATE_FORMAT)
        .or_else(|_| Date::parse(&format!("{value}-01"), DATE_FORMAT))
        .ok()
}

/// Format `month` for a month input, e.g. "2025-03".
pub fn month_input_value(month: Date) -> String {
    month.format(MONTH_FORMAT).unwrap_or_default()
}

/// Render the budget form with `month` and `amount` pre-filled.
pub fn budget_form_view(
    action: FormAction<'_>,
    month: &str,
    amount: Option<Decimal>,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put) = action.hx_attributes();
    let submit_text = match action {
        FormAction::Create(_) => "Save Budget",
        FormAction::Update(_) => "Update Budget",
    };
    let amount_str = amount.map(|amount| format!("{amount:.2}"));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                input
                    id="month"
                    type="month"
                    name="month"
                    value=(month)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=[amount_str.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
