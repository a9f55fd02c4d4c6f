//! Page slicing for list views.

use serde::Serialize;

use crate::api::Pagination;

/// One page of a collection plus the totals needed to render paging controls
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// `ceil(total / page_size)`; zero when there is nothing to show
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Slice `items` to the requested 1-based page.
///
/// A page past the end yields no items; the page number is reported as
/// requested rather than corrected.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> PageResult<T> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let slice: &[T] = if page_size == 0 || start >= items.len() {
        &[]
    } else {
        let end = start.saturating_add(page_size).min(items.len());
        &items[start..end]
    };

    PageResult {
        items: slice.to_vec(),
        page,
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

impl<T> PageResult<T> {
    /// Wrap a page the server already cut, trusting its totals. Without
    /// metadata the items are taken to be the whole collection.
    pub fn from_server(
        items: Vec<T>,
        pagination: Option<Pagination>,
        page: usize,
        page_size: usize,
    ) -> Self {
        match pagination {
            Some(meta) => Self {
                items,
                page: if meta.page == 0 { page } else { meta.page },
                page_size,
                total_items: meta.total,
                total_pages: meta.total_pages,
            },
            None => {
                let total_items = items.len();
                Self {
                    items,
                    page,
                    page_size,
                    total_items,
                    total_pages: total_pages(total_items, page_size),
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based positions of the first and last item shown, `None` for an
    /// empty page
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }
}
