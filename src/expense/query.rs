//! Filtering, paging and aggregation of a user's expenses.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    category::CategoryName,
    date_range::{DateRange, month_bounds, week_to_date},
    expense::{Expense, map_expense_row},
    money::Amount,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The raw query parameters for filtering expenses.
///
/// Every field is kept as text so that a malformed value is ignored rather
/// than rejecting the whole request.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseQuery {
    /// Text to search for in the description, notes and category.
    pub q: Option<String>,
    /// The earliest date to include, formatted as YYYY-MM-DD.
    pub from: Option<String>,
    /// The latest date to include, formatted as YYYY-MM-DD.
    pub to: Option<String>,
    /// One of "all", "today", "week" or "month".
    pub filter: Option<String>,
    /// The one-based page number.
    pub page: Option<String>,
}

impl ExpenseQuery {
    /// The requested page, or `None` if it is missing or not a whole number.
    pub fn page_number(&self) -> Option<u64> {
        let value = self
            .page
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())?;

        value
            .parse()
            .inspect_err(|error| tracing::debug!("ignoring malformed page {value:?}: {error}"))
            .ok()
    }
}

/// A named date restriction relative to today.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QuickFilter {
    #[default]
    All,
    Today,
    /// Monday of the current week up to today.
    Week,
    /// The whole of the current calendar month.
    Month,
}

impl QuickFilter {
    /// All quick filters in the order they are offered to the user.
    pub const ALL: [QuickFilter; 4] = [
        QuickFilter::All,
        QuickFilter::Today,
        QuickFilter::Week,
        QuickFilter::Month,
    ];

    /// Parse a quick filter, treating unknown values as [QuickFilter::All].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::All,
        }
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All time",
            Self::Today => "Today",
            Self::Week => "This week",
            Self::Month => "This month",
        }
    }

    /// The dates covered by the filter, or `None` for no restriction.
    pub fn date_range(self, today: Date) -> Option<DateRange> {
        match self {
            Self::All => None,
            Self::Today => Some(DateRange {
                start: today,
                end: today,
            }),
            Self::Week => Some(week_to_date(today)),
            Self::Month => Some(month_bounds(today)),
        }
    }
}

/// Conditions for selecting a user's expenses.
///
/// All conditions must hold for an expense to be selected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseFilter {
    /// Lower-case search text, matched against description, notes and category.
    pub search: Option<String>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub quick_filter: QuickFilter,
    /// The dates selected by `quick_filter`, resolved against today.
    pub quick_range: Option<DateRange>,
}

impl ExpenseFilter {
    /// Build a filter from query parameters, with `today` in the user's local timezone.
    ///
    /// Malformed dates are logged and ignored.
    pub fn from_query(query: &ExpenseQuery, today: Date) -> Self {
        let search = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let quick_filter = query
            .filter
            .as_deref()
            .map(QuickFilter::parse)
            .unwrap_or_default();

        Self {
            search,
            from: parse_date_param("from", query.from.as_deref()),
            to: parse_date_param("to", query.to.as_deref()),
            quick_filter,
            quick_range: quick_filter.date_range(today),
        }
    }

    /// A filter selecting every expense in `range`.
    pub fn in_range(range: DateRange) -> Self {
        Self {
            from: Some(range.start),
            to: Some(range.end),
            ..Default::default()
        }
    }

    /// Build the SQL `WHERE` clause and its parameters.
    fn where_clause(&self, user_id: UserID) -> (String, Vec<Value>) {
        let mut conditions = vec!["user_id = ?".to_owned()];
        let mut params = vec![Value::Integer(user_id.as_i64())];

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            conditions.push(
                "(LOWER(description) LIKE ? ESCAPE '\\' \
                OR LOWER(COALESCE(notes, '')) LIKE ? ESCAPE '\\' \
                OR LOWER(category) LIKE ? ESCAPE '\\')"
                    .to_owned(),
            );
            params.extend(std::iter::repeat_n(Value::Text(pattern), 3));
        }

        let mut push_date = |condition: &str, date: Date| {
            conditions.push(condition.to_owned());
            params.push(Value::Text(date.to_string()));
        };

        if let Some(from) = self.from {
            push_date("date >= ?", from);
        }

        if let Some(to) = self.to {
            push_date("date <= ?", to);
        }

        if let Some(range) = self.quick_range {
            push_date("date >= ?", range.start);
            push_date("date <= ?", range.end);
        }

        (conditions.join(" AND "), params)
    }
}

fn parse_date_param(name: &str, value: Option<&str>) -> Option<Date> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;

    Date::parse(value, DATE_FORMAT)
        .inspect_err(|error| tracing::debug!("ignoring malformed {name} date {value:?}: {error}"))
        .ok()
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A slice of the filtered expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    /// The window for the 1-indexed `page` with `page_size` expenses per page.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            limit: page_size,
            offset: page.saturating_sub(1) * page_size,
        }
    }
}

/// Get the expenses selected by `filter`, newest first.
///
/// Expenses on the same day are ordered by when they were recorded, newest first.
/// Pass `None` for `window` to get every matching expense.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_expenses(
    user_id: UserID,
    filter: &ExpenseFilter,
    window: Option<PageWindow>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut params) = filter.where_clause(user_id);

    let limit_clause = match window {
        Some(window) => {
            params.push(Value::Integer(to_sql_int(window.limit)));
            params.push(Value::Integer(to_sql_int(window.offset)));
            " LIMIT ? OFFSET ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT id, user_id, description, amount, category, date, notes, created_at \
        FROM expense WHERE {where_clause} \
        ORDER BY date DESC, created_at DESC, id DESC{limit_clause}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Count the expenses selected by `filter`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_expenses(
    user_id: UserID,
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, params) = filter.where_clause(user_id);

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM expense WHERE {where_clause}"),
        params_from_iter(params),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// The sum of the expenses selected by `filter`, zero if there are none.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn total_amount(
    user_id: UserID,
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<Amount, Error> {
    let (where_clause, params) = filter.where_clause(user_id);

    connection
        .query_row(
            &format!("SELECT SUM(amount) FROM expense WHERE {where_clause}"),
            params_from_iter(params),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The sum of the expenses selected by `filter` for each category, ordered by category name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn category_totals(
    user_id: UserID,
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<Vec<(CategoryName, Amount)>, Error> {
    let (where_clause, params) = filter.where_clause(user_id);

    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) FROM expense WHERE {where_clause} \
            GROUP BY category ORDER BY category ASC"
        ))?
        .query_map(params_from_iter(params), |row| {
            let category: String = row.get(0)?;
            Ok((CategoryName::new_unchecked(&category), row.get(1)?))
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod quick_filter_tests {
    use time::macros::date;

    use crate::date_range::DateRange;

    use super::QuickFilter;

    #[test]
    fn unknown_values_mean_all() {
        assert_eq!(QuickFilter::parse("yesterday"), QuickFilter::All);
        assert_eq!(QuickFilter::parse(""), QuickFilter::All);
        assert_eq!(QuickFilter::parse(" Week "), QuickFilter::Week);
    }

    #[test]
    fn date_ranges() {
        let today = date!(2025 - 06 - 12);

        assert_eq!(QuickFilter::All.date_range(today), None);
        assert_eq!(
            QuickFilter::Today.date_range(today),
            Some(DateRange {
                start: today,
                end: today
            })
        );
        assert_eq!(
            QuickFilter::Week.date_range(today),
            Some(DateRange {
                start: date!(2025 - 06 - 09),
                end: today
            })
        );
        assert_eq!(
            QuickFilter::Month.date_range(today),
            Some(DateRange {
                start: date!(2025 - 06 - 01),
                end: date!(2025 - 06 - 30)
            })
        );
    }
}

#[cfg(test)]
mod expense_filter_tests {
    use axum::extract::Query;
    use time::macros::date;

    use super::{ExpenseFilter, ExpenseQuery, QuickFilter};

    #[test]
    fn empty_query_selects_everything() {
        let filter = ExpenseFilter::from_query(&ExpenseQuery::default(), date!(2025 - 06 - 12));

        assert_eq!(filter, ExpenseFilter::default());
    }

    #[test]
    fn search_is_trimmed_and_lower_cased() {
        let query = ExpenseQuery {
            q: Some("  PiZZa ".to_owned()),
            ..Default::default()
        };

        let filter = ExpenseFilter::from_query(&query, date!(2025 - 06 - 12));

        assert_eq!(filter.search.as_deref(), Some("pizza"));
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ExpenseQuery {
            q: Some("   ".to_owned()),
            ..Default::default()
        };

        let filter = ExpenseFilter::from_query(&query, date!(2025 - 06 - 12));

        assert_eq!(filter.search, None);
    }

    #[test]
    fn malformed_dates_are_ignored() {
        let query = ExpenseQuery {
            from: Some("2025-13-01".to_owned()),
            to: Some("yesterday".to_owned()),
            ..Default::default()
        };

        let filter = ExpenseFilter::from_query(&query, date!(2025 - 06 - 12));

        assert_eq!(filter.from, None);
        assert_eq!(filter.to, None);
    }

    #[test]
    fn parses_page_number() {
        let query = ExpenseQuery {
            page: Some(" 3 ".to_owned()),
            ..Default::default()
        };

        assert_eq!(query.page_number(), Some(3));
    }

    #[test]
    fn malformed_page_is_ignored() {
        for page in ["abc", "-1", "2.5", ""] {
            let query = ExpenseQuery {
                page: Some(page.to_owned()),
                ..Default::default()
            };

            assert_eq!(query.page_number(), None, "want {page:?} ignored");
        }
    }

    #[test]
    fn malformed_page_does_not_reject_query_string() {
        let uri = "/dashboard?q=tea&page=abc".parse().unwrap();

        let Query(query) = Query::<ExpenseQuery>::try_from_uri(&uri).unwrap();

        assert_eq!(query.q.as_deref(), Some("tea"));
        assert_eq!(query.page_number(), None);
    }

    #[test]
    fn parses_dates_and_quick_filter() {
        let query = ExpenseQuery {
            from: Some("2025-01-01".to_owned()),
            to: Some("2025-01-31".to_owned()),
            filter: Some("month".to_owned()),
            ..Default::default()
        };

        let filter = ExpenseFilter::from_query(&query, date!(2025 - 06 - 12));

        assert_eq!(filter.from, Some(date!(2025 - 01 - 01)));
        assert_eq!(filter.to, Some(date!(2025 - 01 - 31)));
        assert_eq!(filter.quick_filter, QuickFilter::Month);
        assert!(filter.quick_range.is_some());
    }
}
