use serde::{Deserialize, Serialize};

use search_core::{PageRequest, DEFAULT_PAGE_SIZE};

/// Server side bounds for client page sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub default_size: u64,
    /// `None` lets clients ask for everything.
    pub max_size: Option<u64>,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: Some(1000),
        }
    }
}

impl PageLimits {
    /// Missing → default, zero → 1, above max → max.
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        let mut size = requested.unwrap_or(self.default_size).max(1);
        if let Some(max) = self.max_size {
            size = size.min(max.max(1));
        }
        size
    }

    /// `page` with its size clamped; the offset is kept.
    pub fn apply(&self, page: PageRequest) -> PageRequest {
        page.with_page_size(self.clamp(Some(page.page_size())))
            .unwrap_or(page)
    }
}
