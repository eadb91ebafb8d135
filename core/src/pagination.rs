//! Pagination counters copied from paged responses, and the controls derived
//! from them.

use serde::{Deserialize, Serialize};

use crate::types::PagedResponse;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_records: 0,
            total_pages: 0,
            has_next_page: false,
            has_previous_page: false,
        }
    }
}

impl<T> From<&PagedResponse<T>> for Pagination {
    fn from(page: &PagedResponse<T>) -> Self {
        Self {
            page_number: page.page_number,
            page_size: page.page_size,
            total_records: page.total_records,
            total_pages: page.total_pages,
            has_next_page: page.has_next_page,
            has_previous_page: page.has_previous_page,
        }
    }
}

/// What a pager may offer. The server flags are authoritative: a `next`
/// link appears only when `has_next_page` is set, whatever the counters say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    pub current: u32,
    pub total_pages: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl Pagination {
    pub fn controls(&self) -> PageControls {
        PageControls {
            current: self.page_number,
            total_pages: self.total_pages,
            previous: (self.has_previous_page && self.page_number > 1)
                .then(|| self.page_number - 1),
            next: if self.has_next_page {
                self.page_number.checked_add(1)
            } else {
                None
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// One fetched page of domain values.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
