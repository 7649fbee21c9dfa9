//! Calendar helpers for quick filters, budgets and the monthly summary.

use time::{Date, Duration, format_description::BorrowedFormatItem, macros::format_description};

const MONTH_LABEL_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month repr:short] [year]");

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Whether `date` falls within the range, including both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The first day of the month containing `date`.
pub fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The calendar month containing `date`.
pub fn month_bounds(date: Date) -> DateRange {
    let start = first_day_of_month(date);
    // 31 days after the first always lands in the following month.
    let next_month = first_day_of_month(start + Duration::days(31));
    let end = next_month - Duration::days(1);

    DateRange { start, end }
}

/// The calendar month before the one containing `date`.
pub fn previous_month_bounds(date: Date) -> DateRange {
    month_bounds(first_day_of_month(date) - Duration::days(1))
}

/// Monday of the week containing `today` up to and including `today`.
pub fn week_to_date(today: Date) -> DateRange {
    let days_since_monday = i64::from(today.weekday().number_days_from_monday());

    DateRange {
        start: today - Duration::days(days_since_monday),
        end: today,
    }
}

/// A short label for the month containing `date`, e.g. "Jan 2025".
pub fn month_label(date: Date) -> String {
    date.format(MONTH_LABEL_FORMAT).unwrap_or_default()
}
