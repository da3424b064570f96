//! Page-number pagination over ordered post collections.

use serde::Serialize;
use std::num::IntErrorKind;

/// Number of posts on a full page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Parse the `page` query parameter.
///
/// Missing or non-integer input selects the first page. Integers too large
/// for `i64` saturate so that [`Paginator::window`] still clamps them to the
/// last (or first) page.
pub fn parse_page_number(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 1;
    };
    match raw.trim().parse::<i64>() {
        Ok(number) => number,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 1,
        },
    }
}

/// Position of one page inside a collection of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Splits collections into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Number of pages for `total` items. An empty collection still has one page.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a requested page number, clamping it into `1..=num_pages`.
    pub fn window(&self, total: u64, requested: i64) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = if requested < 1 {
            1
        } else {
            (requested as u64).min(num_pages)
        };

        PageWindow {
            number,
            num_pages,
            total,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

/// One page of items plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            has_next,
            has_previous,
            next_page: has_next.then_some(window.number + 1),
            previous_page: has_previous.then_some(window.number - 1),
        }
    }
}
