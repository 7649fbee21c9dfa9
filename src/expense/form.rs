//! The expense form shared by the new and edit expense pages.

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::{CategoryClassifier, CategoryName},
    expense::{Expense, ExpenseBuilder},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, FormAction, loading_spinner,
    },
    money::Amount,
};

/// The form data for creating or updating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    pub description: String,
    /// Kept as a plain decimal so that a negative amount can be reported on the form.
    pub amount: Decimal,
    /// Blank or "Other" asks for the category to be predicted from the description.
    #[serde(default)]
    pub category: Option<String>,
    pub date: Date,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExpenseForm {
    /// Validate the form and resolve its category with `classifier`.
    ///
    /// # Errors
    /// Returns [Error::EmptyDescription], [Error::NegativeAmount] or
    /// [Error::AmountTooLarge] for invalid input.
    pub fn into_builder(self, classifier: &CategoryClassifier) -> Result<ExpenseBuilder, Error> {
        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        let amount = Amount::new(self.amount)?;
        let category = classifier.resolve(
            self.category.as_deref().unwrap_or_default(),
            &self.description,
        );

        Ok(
            Expense::build(self.description.trim(), amount, category, self.date)
                .notes(self.notes.as_deref()),
        )
    }
}

/// The values to pre-fill the expense form with.
#[derive(Debug, Default)]
pub struct ExpenseFormDefaults<'a> {
    pub description: &'a str,
    pub amount: Option<Decimal>,
    /// `None` selects automatic categorisation.
    pub category: Option<&'a str>,
    pub date: Option<Date>,
    pub notes: &'a str,
}

impl<'a> ExpenseFormDefaults<'a> {
    /// The values of an existing expense.
    pub fn from_expense(expense: &'a Expense) -> Self {
        Self {
            description: &expense.description,
            amount: Some(expense.amount.as_decimal()),
            category: Some(expense.category.as_ref()),
            date: Some(expense.date),
            notes: expense.notes.as_deref().unwrap_or_default(),
        }
    }

    /// The values a user just submitted.
    pub fn from_form(form: &'a ExpenseForm) -> Self {
        Self {
            description: &form.description,
            amount: Some(form.amount),
            category: form
                .category
                .as_deref()
                .filter(|category| !category.trim().is_empty()),
            date: Some(form.date),
            notes: form.notes.as_deref().unwrap_or_default(),
        }
    }
}

/// Render the expense form.
///
/// The date defaults to `today`. `categories` are offered in the given order after the automatic option.
/// A default category missing from `categories` is still offered so that
/// editing an expense never silently changes its category.
pub fn expense_form_view(
    action: FormAction<'_>,
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[CategoryName],
    today: Date,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put) = action.hx_attributes();
    let submit_text = match action {
        FormAction::Create(_) => "Add Expense",
        FormAction::Update(_) => "Update Expense",
    };

    let amount_str = defaults.amount.map(|amount| format!("{amount:.2}"));
    let date = defaults.date.unwrap_or(today);
    let unlisted_category = defaults
        .category
        .filter(|selected| !categories.iter().any(|name| name.as_ref() == *selected));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="e.g. Pizza with friends"
                    value=(defaults.description)
                    required
                    autofocus
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

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[defaults.category.is_none()] { "Detect from description" }

                    @for name in categories {
                        option
                            value=(name)
                            selected[defaults.category == Some(name.as_ref())]
                        {
                            (name)
                        }
                    }

                    @if let Some(category) = unlisted_category {
                        option value=(category) selected { (category) }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                textarea
                    id="notes"
                    name="notes"
                    rows="3"
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (defaults.notes)
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                (submit_text)
            }
        }
    }
}
