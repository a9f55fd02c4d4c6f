//! The user-editable query behind a list view.

use std::collections::BTreeMap;

/// Filter value that disables a dimension
pub const ALL: &str = "all";

/// Selected value per filter dimension. Dimensions that were never set read
/// as [`ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: &str) -> &str {
        self.0.get(dimension).map(String::as_str).unwrap_or(ALL)
    }

    /// Returns whether the stored value changed
    pub fn set(&mut self, dimension: &str, value: &str) -> bool {
        if self.get(dimension) == value {
            return false;
        }
        if value == ALL {
            self.0.remove(dimension);
        } else {
            self.0.insert(dimension.to_string(), value.to_string());
        }
        true
    }

    /// Dimensions with a value other than [`ALL`]
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(d, v)| (d.as_str(), v.as_str()))
    }

    /// Copy of the active dimensions accepted by `keep`
    pub fn subset(&self, keep: impl Fn(&str) -> bool) -> FilterSet {
        FilterSet(
            self.0
                .iter()
                .filter(|(d, _)| keep(d))
                .map(|(d, v)| (d.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw input, committed search term, filters and paging of one view.
///
/// Every change to the search term, a filter or the page size puts the view
/// back on page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    raw_input: String,
    search_term: String,
    filters: FilterSet,
    page: usize,
    page_size: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            raw_input: String::new(),
            search_term: String::new(),
            filters: FilterSet::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filter(&self, dimension: &str) -> &str {
        self.filters.get(dimension)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn set_raw_input(&mut self, value: &str) {
        if self.raw_input != value {
            self.raw_input = value.to_string();
        }
    }

    /// Commit a search term and return to page 1. Returns whether anything
    /// that affects the fetched data changed.
    pub(crate) fn commit_search(&mut self, term: &str) -> bool {
        let changed = self.search_term != term || self.page != 1;
        self.search_term = term.to_string();
        self.page = 1;
        changed
    }

    pub(crate) fn set_filter(&mut self, dimension: &str, value: &str) -> bool {
        if !self.filters.set(dimension, value) {
            return false;
        }
        self.page = 1;
        true
    }

    pub(crate) fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Zero is ignored
    pub(crate) fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 || self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }
}
