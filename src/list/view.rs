//! Per-view configuration and the three dashboard presets.
//!
//! A view decides which parts of the query the backend handles and which are
//! applied locally after the fetch.

use std::marker::PhantomData;
use std::time::Duration;

use super::filter::{ListItem, SupportLookup, evaluate};
use super::paginate::{PageResult, paginate};
use super::query::{ALL, ListQuery};
use crate::api::{CollectionKind, CollectionPage, CollectionRequest, RequestPaging};
use crate::config::ViewSettings;
use crate::error::{LedgerError, Result};
use crate::types::{Consent, Patient, Transaction, VALID_CONSENT_STATUSES, VALID_TRANSACTION_STATUSES};

pub const DEFAULT_PAGE_SIZE: usize = 10;
const SEARCH_DEBOUNCE_MS: u64 = 500;
const PATIENT_SEARCH_DEBOUNCE_MS: u64 = 300;
const TRANSACTION_FETCH_LIMIT: usize = 20;
const PATIENT_LOOKUP_LIMIT: usize = 1000;

/// Where a part of the query is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Server,
    Client,
}

/// Where pages are cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    Server,
    /// Fetch the listing, optionally capped, and page it locally
    Client { fetch_limit: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDimension {
    pub name: &'static str,
    pub placement: Placement,
    /// Accepted values besides [`ALL`]; empty accepts anything
    pub values: &'static [&'static str],
}

impl FilterDimension {
    pub fn server(name: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            name,
            placement: Placement::Server,
            values,
        }
    }

    pub fn client(name: &'static str, values: &'static [&'static str]) -> Self {
        Self {
            name,
            placement: Placement::Client,
            values,
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        value == ALL || self.values.is_empty() || self.values.contains(&value)
    }
}

#[derive(Debug, Clone)]
pub struct ViewConfig<T> {
    pub kind: CollectionKind,
    pub debounce: Duration,
    pub search: Placement,
    pub paging: Paging,
    pub dimensions: Vec<FilterDimension>,
    pub page_size: usize,
    /// Patients to fetch for name resolution, `None` when the view needs none
    pub lookup_limit: Option<usize>,
    _item: PhantomData<fn() -> T>,
}

impl<T: ListItem> ViewConfig<T> {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            search: Placement::Client,
            paging: Paging::Client { fetch_limit: None },
            dimensions: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            lookup_limit: None,
            _item: PhantomData,
        }
    }

    pub fn with_dimension(mut self, dimension: FilterDimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Apply configured overrides on top of the preset
    pub fn with_settings(mut self, settings: &ViewSettings) -> Self {
        if let Some(ms) = settings.debounce_ms {
            self.debounce = Duration::from_millis(ms);
        }
        if let Some(size) = settings.page_size.filter(|s| *s > 0) {
            self.page_size = size;
        }
        if let (Paging::Client { fetch_limit }, Some(limit)) = (&mut self.paging, settings.fetch_limit)
        {
            *fetch_limit = Some(limit);
        }
        if self.lookup_limit.is_some()
            && let Some(limit) = settings.lookup_limit
        {
            self.lookup_limit = Some(limit);
        }
        self
    }

    pub fn dimension(&self, name: &str) -> Option<&FilterDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn validate_filter(&self, dimension: &str, value: &str) -> Result<()> {
        match self.dimension(dimension) {
            Some(d) if d.accepts(value) => Ok(()),
            _ => Err(LedgerError::InvalidFilter {
                dimension: dimension.to_string(),
                value: value.to_string(),
            }),
        }
    }

    fn placed(&self, name: &str, placement: Placement) -> bool {
        self.dimension(name).is_some_and(|d| d.placement == placement)
    }

    /// The backend request for the current query
    pub fn request(&self, query: &ListQuery) -> CollectionRequest {
        let paging = match self.paging {
            Paging::Server => RequestPaging::Page {
                page: query.page(),
                page_size: query.page_size(),
            },
            Paging::Client { fetch_limit } => RequestPaging::Listing { limit: fetch_limit },
        };

        let mut request = CollectionRequest::new(self.kind, paging);
        if self.search == Placement::Server {
            request = request.with_search(query.search_term());
        }
        for (dimension, value) in query.filters().active() {
            if self.placed(dimension, Placement::Server) {
                request = request.with_filter(dimension, value);
            }
        }
        request
    }

    /// Apply the locally handled parts of the query to a fetched collection
    pub fn page(
        &self,
        fetched: &CollectionPage<T>,
        query: &ListQuery,
        lookup: Option<&SupportLookup>,
    ) -> PageResult<T> {
        let search = match self.search {
            Placement::Client => query.search_term(),
            Placement::Server => "",
        };
        let filters = query
            .filters()
            .subset(|d| self.placed(d, Placement::Client));
        let filtered = evaluate(&fetched.items, search, &filters, lookup);

        match self.paging {
            Paging::Client { .. } => paginate(&filtered, query.page(), query.page_size()),
            Paging::Server => PageResult::from_server(
                filtered,
                fetched.pagination,
                query.page(),
                query.page_size(),
            ),
        }
    }
}

impl ViewConfig<Consent> {
    /// Status filtered by the backend; search and paging over the full
    /// listing, with patient names resolved locally
    pub fn consents() -> Self {
        let mut view = Self::new(CollectionKind::Consents)
            .with_dimension(FilterDimension::server("status", VALID_CONSENT_STATUSES));
        view.lookup_limit = Some(PATIENT_LOOKUP_LIMIT);
        view
    }
}

impl ViewConfig<Patient> {
    /// Search and paging handled by the backend
    pub fn patients() -> Self {
        let mut view = Self::new(CollectionKind::Patients);
        view.debounce = Duration::from_millis(PATIENT_SEARCH_DEBOUNCE_MS);
        view.search = Placement::Server;
        view.paging = Paging::Server;
        view
    }
}

impl ViewConfig<Transaction> {
    /// Wallet filtered by the backend and capped; type, status and search
    /// applied locally
    pub fn transactions() -> Self {
        let mut view = Self::new(CollectionKind::Transactions)
            .with_dimension(FilterDimension::server("wallet", &[]))
            .with_dimension(FilterDimension::client("type", &[]))
            .with_dimension(FilterDimension::client("status", VALID_TRANSACTION_STATUSES));
        view.paging = Paging::Client {
            fetch_limit: Some(TRANSACTION_FETCH_LIMIT),
        };
        view
    }
}
