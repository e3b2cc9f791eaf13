//! Backend-agnostic search request model: filter expressions, sort specs, page requests
//! and the page result handed back to callers.
//!
//! Everything here is built from untrusted client input. Field names stay plain strings
//! until a resolver in `search-db` maps them onto allow-listed columns.

pub mod filter;
pub mod page;
pub mod sort;

pub use filter::{Combinator, FilterCondition, FilterExpression, FilterValue, OperatorKind};
pub use page::{total_pages, PageRequest, PageResult, DEFAULT_PAGE_SIZE};
pub use sort::{SortDir, SortKey, SortSpec};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("invalid sort token: '{0}'")]
    InvalidSortToken(String),

    #[error("page size must be greater than zero")]
    InvalidPageSize,
}

pub type Result<T> = std::result::Result<T, Error>;

/// A complete client search request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub filter: FilterExpression,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}
