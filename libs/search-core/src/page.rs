use serde::{Deserialize, Serialize};

use crate::Error;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Offset based page request. `page_size` is always non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page_size: u64,
    offset: u64,
}

impl PageRequest {
    pub fn new(page_size: u64, offset: u64) -> Result<Self, Error> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        Ok(Self { page_size, offset })
    }

    /// Zero based page `index` of `page_size` rows.
    pub fn of_page(index: u64, page_size: u64) -> Result<Self, Error> {
        Self::new(page_size, index.saturating_mul(page_size))
    }

    pub fn first(page_size: u64) -> Result<Self, Error> {
        Self::new(page_size, 0)
    }

    /// Fetch everything in one page.
    pub fn unpaged() -> Self {
        Self {
            page_size: u64::MAX,
            offset: 0,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_unpaged(&self) -> bool {
        self.page_size == u64::MAX
    }

    pub fn page_index(&self) -> u64 {
        self.offset / self.page_size
    }

    pub fn next(&self) -> Self {
        Self {
            page_size: self.page_size,
            offset: self.offset.saturating_add(self.page_size),
        }
    }

    pub fn with_page_size(&self, page_size: u64) -> Result<Self, Error> {
        Self::new(page_size, self.offset)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Wire form: `{"page_size": 10, "offset": 30}` or `{"size": 10, "page": 3}`.
#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default, alias = "size")]
    page_size: Option<u64>,
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    page: Option<u64>,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = Error;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        let size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        match (raw.offset, raw.page) {
            (Some(offset), _) => PageRequest::new(size, offset),
            (None, Some(page)) => PageRequest::of_page(page, size),
            (None, None) => PageRequest::new(size, 0),
        }
    }
}

/// One page of results plus the metadata derived from the full match count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub page_size: u64,
    pub page_index: u64,
    pub total_pages: u64,
    pub is_last_page: bool,
}

impl<T> PageResult<T> {
    pub fn new(
        items: Vec<T>,
        total_elements: u64,
        page_size: u64,
        page_index: u64,
        is_last_page: bool,
    ) -> Self {
        Self {
            items,
            total_elements,
            page_size,
            page_index,
            total_pages: total_pages(total_elements, page_size),
            is_last_page,
        }
    }

    /// A page with no rows at the requested position.
    pub fn empty(page: PageRequest, total_elements: u64) -> Self {
        Self::new(
            Vec::new(),
            total_elements,
            page.page_size(),
            page.page_index(),
            true,
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map items while preserving the page metadata (domain -> DTO convenience).
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page_size: self.page_size,
            page_index: self.page_index,
            total_pages: self.total_pages,
            is_last_page: self.is_last_page,
        }
    }
}

/// `ceil(total / page_size)`, zero for an empty result or a zero page size.
pub fn total_pages(total_elements: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_elements.div_ceil(page_size)
}
