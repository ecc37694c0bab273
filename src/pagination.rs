//! This module defines the common functionality for paging data.
//!
//! The remote API returns whole collections, so paging happens on the client
//! after fetching.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum rows to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// One element of the pagination indicator row.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to another page.
    Page(u64),
    /// The page currently displayed.
    CurrPage(u64),
    /// A gap between the window and the first/last page link.
    Ellipsis,
    /// The chevron linking to the next page.
    NextButton(u64),
    /// The chevron linking to the previous page.
    BackButton(u64),
}

/// Compute the indicator row for `curr_page` of `page_count` total pages.
///
/// At most `max_pages` numbered links are shown in a window around the
/// current page; the first and last page stay reachable through
/// ellipsis-separated links when they fall outside the window.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half_window = max_pages / 2;

    // Clamp the window so it never runs past either end of the page range.
    let (window_start, window_end) = if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= half_window {
        (1, max_pages)
    } else if curr_page > page_count - half_window {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - half_window, curr_page + half_window)
    };

    let mut indicators: Vec<PaginationIndicator> = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if window_start > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    for page in window_start..=window_end {
        if page == curr_page {
            indicators.push(PaginationIndicator::CurrPage(page));
        } else {
            indicators.push(PaginationIndicator::Page(page));
        }
    }

    if window_end < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

const PAGE_LINK_STYLE: &str = "flex items-center justify-center px-3 h-8 \
    leading-tight text-gray-500 bg-white border border-gray-300 \
    hover:bg-gray-100 hover:text-gray-700 dark:bg-gray-800 \
    dark:border-gray-700 dark:text-gray-400 dark:hover:bg-gray-700 \
    dark:hover:text-white";

const CURR_PAGE_STYLE: &str = "flex items-center justify-center px-3 h-8 \
    text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100 \
    hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

/// Render the indicator row as links to `base_url` with a `page` query param.
pub fn pagination_controls(indicators: &[PaginationIndicator], base_url: &str) -> Markup {
    let page_url = |page: u64| format!("{base_url}?page={page}");

    html! {
        nav aria-label="Pagination"
        {
            ul class="inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Previous" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Next" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                a
                                    href=(page_url(*page))
                                    aria-current="page"
                                    class=(CURR_PAGE_STYLE)
                                {
                                    (page)
                                }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(PAGE_LINK_STYLE) { "…" }
                            }
                        }
                    }
                }
            }
        }
    }
}
