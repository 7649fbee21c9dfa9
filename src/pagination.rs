//! Paging for long listings: page arithmetic, the page indicator model and its HTML.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of expenses shown on each page of the dashboard.
    pub default_page_size: u64,
    /// The maximum number of page numbers to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 6,
            max_pages: 5,
        }
    }
}

/// The number of pages needed to show `item_count` items, `page_size` at a time.
///
/// There is always at least one page, even when there is nothing to show.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }

    item_count.div_ceil(page_size).max(1)
}

/// Clamp a requested page number into `1..=page_count`.
pub fn clamp_page(requested_page: u64, page_count: u64) -> u64 {
    requested_page.clamp(1, page_count.max(1))
}

/// One element of the page navigation bar.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Build the page navigation for `curr_page` of `page_count` pages.
///
/// At most `max_pages` page numbers are shown around the current page. When
/// pages are hidden, the first and last page are still linked with an ellipsis
/// marking the gap.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half_window = max_pages / 2;

    let (window_start, window_end) = if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= half_window {
        (1, max_pages)
    } else if curr_page > page_count - half_window {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - half_window, curr_page + half_window)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if page_count > max_pages && curr_page > half_window + 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend((window_start..=window_end).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if page_count > max_pages && curr_page < page_count - half_window {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

const PAGE_LINK_STYLE: &str = "block px-3 py-2 rounded-sm text-blue-600 hover:underline";

/// Render the page navigation bar.
///
/// `page_url` builds the link for a page number so that callers can keep their
/// own query parameters, e.g. search filters, across pages.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    html! {
        nav class="pagination flex justify-center" aria-label="Pagination"
        {
            ul class="pagination flex items-center gap-x-2 p-0 m-0"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) role="button" class=(PAGE_LINK_STYLE) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) role="button" class=(PAGE_LINK_STYLE) { "Next" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-1 text-gray-500" { "…" }
                            }
                        }
                    }
                }
            }
        }
    }
}
