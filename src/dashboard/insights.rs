//! Sentences about this month's spending and the budget card.
//!
//! Insights are derived from three inputs:
//! - the current month's expenses,
//! - the previous month's total,
//! - and the current month's budget, if one is set.
//!
//! They are always reported in the same order: top category, trend, then budget.

use std::{collections::BTreeMap, fmt::Display};

use maud::{Markup, html};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{
    budget::Budget,
    category::CategoryName,
    endpoints,
    expense::Expense,
    html::{LINK_STYLE, format_currency},
    money::Amount,
};

/// Month-over-month changes within this many percent either way are not reported.
pub const TREND_THRESHOLD_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
/// Budget use at or above this percentage triggers a warning.
pub const BUDGET_WARNING_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
/// Budget use at or above this percentage means the budget is exceeded.
pub const BUDGET_EXCEEDED_PERCENT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// A generated observation about this month's spending.
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    /// The category with the largest total this month.
    TopCategory { category: CategoryName, total: Amount },
    /// Spending rose by more than [TREND_THRESHOLD_PERCENT].
    ///
    /// `percent` is rounded to a whole number, halves going to the even neighbour.
    SpendingIncreased { percent: Decimal },
    /// Spending fell by more than [TREND_THRESHOLD_PERCENT], `percent` is positive and rounded.
    SpendingDecreased { percent: Decimal },
    /// Nothing was spent last month but something was spent this month.
    NewSpending,
    BudgetExceeded,
    BudgetWarning,
}

impl Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insight::TopCategory { category, total } => write!(
                f,
                "Top spending category this month: {category} ({}).",
                format_currency(*total)
            ),
            Insight::SpendingIncreased { percent } => {
                write!(f, "Spending increased {percent}% vs last month.")
            }
            Insight::SpendingDecreased { percent } => {
                write!(f, "Spending decreased {percent}% vs last month.")
            }
            Insight::NewSpending => {
                write!(f, "New spending this month (no expenses recorded last month).")
            }
            Insight::BudgetExceeded => {
                write!(f, "Alert: You have exceeded your budget for this month.")
            }
            Insight::BudgetWarning => {
                write!(f, "Warning: You have used 90%+ of your budget this month.")
            }
        }
    }
}

/// Derive the insights for the current month.
///
/// `current_month` should hold every expense in the current month and
/// `previous_month_total` the sum of last month's expenses.
pub fn compute_insights(
    current_month: &[Expense],
    previous_month_total: Amount,
    budget: Option<&Budget>,
) -> Vec<Insight> {
    let current_total: Amount = current_month.iter().map(|expense| expense.amount).sum();

    [
        top_category(current_month),
        spending_trend(current_total, previous_month_total),
        budget.and_then(|budget| budget_alert(current_total, budget.amount)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// The category with the largest total, ties going to the alphabetically first name.
fn top_category(expenses: &[Expense]) -> Option<Insight> {
    let mut totals: BTreeMap<&CategoryName, Amount> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(&expense.category).or_default() += expense.amount;
    }

    let mut top: Option<(&CategoryName, Amount)> = None;
    for (category, total) in totals {
        if top.is_none_or(|(_, top_total)| total > top_total) {
            top = Some((category, total));
        }
    }

    top.map(|(category, total)| Insight::TopCategory {
        category: category.clone(),
        total,
    })
}

fn spending_trend(current_total: Amount, previous_total: Amount) -> Option<Insight> {
    if previous_total.is_zero() {
        return (!current_total.is_zero()).then_some(Insight::NewSpending);
    }

    let current = current_total.as_decimal();
    let previous = previous_total.as_decimal();
    let change = (current - previous) / previous * Decimal::ONE_HUNDRED;

    if change > TREND_THRESHOLD_PERCENT {
        Some(Insight::SpendingIncreased {
            percent: round_percent(change),
        })
    } else if change < -TREND_THRESHOLD_PERCENT {
        Some(Insight::SpendingDecreased {
            percent: round_percent(change.abs()),
        })
    } else {
        None
    }
}

fn round_percent(percent: Decimal) -> Decimal {
    percent.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

fn budget_alert(spent: Amount, budget: Amount) -> Option<Insight> {
    let percent = budget_percentage(spent, budget);

    if percent >= BUDGET_EXCEEDED_PERCENT {
        Some(Insight::BudgetExceeded)
    } else if percent >= BUDGET_WARNING_PERCENT {
        Some(Insight::BudgetWarning)
    } else {
        None
    }
}

/// How much of `budget` has been spent as a percentage, zero for a zero budget.
pub fn budget_percentage(spent: Amount, budget: Amount) -> Decimal {
    if budget.is_zero() {
        return Decimal::ZERO;
    }

    spent.as_decimal() / budget.as_decimal() * Decimal::ONE_HUNDRED
}

/// The figures shown on the budget card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub budget: Amount,
    pub spent: Amount,
    /// The percentage of the budget used, truncated to a whole number.
    pub percent_used: u64,
}

impl BudgetStatus {
    pub fn new(budget: Amount, spent: Amount) -> Self {
        let percent_used = budget_percentage(spent, budget)
            .trunc()
            .to_u64()
            .unwrap_or_default();

        Self {
            budget,
            spent,
            percent_used,
        }
    }
}

/// Renders the insights as a list, or nothing if there are none.
pub(super) fn insights_view(insights: &[Insight]) -> Markup {
    html! {
        @if !insights.is_empty() {
            section id="insights" class="w-full space-y-2"
            {
                h2 class="text-lg font-semibold" { "Insights" }

                ul class="list-disc list-inside space-y-1"
                {
                    @for insight in insights {
                        li { (insight) }
                    }
                }
            }
        }
    }
}

/// Renders the budget card, or a prompt to set a budget.
pub(super) fn budget_card_view(status: Option<BudgetStatus>) -> Markup {
    let Some(status) = status else {
        return html! {
            section id="budget-card" class="w-full p-4 rounded bg-white dark:bg-gray-800"
            {
                "No budget set for this month. "
                a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Set a budget" }
            }
        };
    };

    let bar_width = status.percent_used.min(100);
    let bar_style = if status.percent_used >= 100 {
        "h-2.5 rounded-full bg-red-600"
    } else if status.percent_used >= 90 {
        "h-2.5 rounded-full bg-yellow-400"
    } else {
        "h-2.5 rounded-full bg-blue-600"
    };

    html! {
        section id="budget-card" class="w-full p-4 rounded bg-white dark:bg-gray-800 space-y-2"
        {
            div class="flex justify-between"
            {
                span { "Budget: " span id="budget-amount" { (format_currency(status.budget)) } }
                span { "Spent: " span id="budget-spent" { (format_currency(status.spent)) } }
                span id="budget-percent" { (status.percent_used) "%" }
            }

            div
                class="w-full bg-gray-200 rounded-full h-2.5 dark:bg-gray-700"
                role="progressbar"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(bar_width)
            {
                div class=(bar_style) style=(format!("width: {bar_width}%")) {}
            }
        }
    }
}
