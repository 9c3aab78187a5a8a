//! Explicit pagination
//!
//! Queries take a `PageRequest` and return `(items, total)`; handlers wrap
//! that pair into a `Paginated` envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }.normalized()
    }

    /// Clamp to page >= 1 and 1 <= limit <= MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset, saturated to what a signed SQL bind can carry
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub start_item: u64,
    pub end_item: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let PageRequest { page, limit } = request.normalized();
        let total_pages = total.div_ceil(limit);
        let start_item = if total == 0 {
            0
        } else {
            (page - 1).saturating_mul(limit).saturating_add(1)
        };
        let end_item = page.saturating_mul(limit).min(total);

        Self {
            items,
            pagination: PageMeta {
                current_page: page,
                total_pages,
                total_items: total,
                items_per_page: limit,
                has_next: page < total_pages,
                has_previous: page > 1,
                start_item,
                end_item,
            },
        }
    }
}
