//! Records API access.
//!
//! The dashboard consumes the backend through the [`DataService`] trait so the
//! list controllers and mutations can run against the HTTP client in
//! production and against scripted stubs in tests.

pub mod error;
pub mod http;

use std::collections::BTreeMap;
use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{
    Consent, ConsentPatch, MedicalRecord, NewConsent, Patient, PlatformStats, Transaction,
};

pub use http::HttpDataService;

/// The collections the backend exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Patients,
    Consents,
    Transactions,
}

impl CollectionKind {
    /// Path segment of the collection endpoint
    pub fn path(self) -> &'static str {
        match self {
            CollectionKind::Patients => "patients",
            CollectionKind::Consents => "consents",
            CollectionKind::Transactions => "transactions",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Patients => write!(f, "patient"),
            CollectionKind::Consents => write!(f, "consent"),
            CollectionKind::Transactions => write!(f, "transaction"),
        }
    }
}

/// How much of a collection a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPaging {
    /// One server-computed page
    Page { page: usize, page_size: usize },
    /// The whole listing, optionally capped, for paging in the caller
    Listing { limit: Option<usize> },
}

/// Arguments for one collection fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub kind: CollectionKind,
    pub paging: RequestPaging,
    /// Server-side search term, never empty
    pub search: Option<String>,
    /// Server-side filters; values equal to the "all" sentinel are never present
    pub filters: BTreeMap<String, String>,
}

impl CollectionRequest {
    pub fn new(kind: CollectionKind, paging: RequestPaging) -> Self {
        Self {
            kind,
            paging,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    pub fn with_filter(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(dimension.into(), value.into());
        self
    }

    pub fn filter(&self, dimension: &str) -> Option<&str> {
        self.filters.get(dimension).map(String::as_str)
    }
}

/// Server-computed pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One fetched collection, plus server pagination when the server paged it
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> CollectionPage<T> {
    pub fn listing(items: Vec<T>) -> Self {
        Self {
            items,
            pagination: None,
        }
    }

    pub fn paged(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            pagination: Some(pagination),
        }
    }
}

/// Remote data capability consumed by the dashboard
#[async_trait::async_trait]
pub trait DataService: Send + Sync {
    async fn list_patients(&self, request: &CollectionRequest) -> Result<CollectionPage<Patient>>;

    async fn list_consents(&self, request: &CollectionRequest) -> Result<CollectionPage<Consent>>;

    async fn list_transactions(
        &self,
        request: &CollectionRequest,
    ) -> Result<CollectionPage<Transaction>>;

    async fn patient(&self, id: &str) -> Result<Patient>;

    async fn patient_records(&self, patient_id: &str) -> Result<Vec<MedicalRecord>>;

    async fn consent(&self, id: &str) -> Result<Consent>;

    async fn create_consent(&self, payload: &NewConsent) -> Result<Consent>;

    async fn update_consent(&self, id: &str, patch: &ConsentPatch) -> Result<Consent>;

    async fn stats(&self) -> Result<PlatformStats>;
}

/// Entities that can be listed through a [`DataService`]
pub trait Fetch: Sized + Send + 'static {
    fn fetch<'a>(
        service: &'a dyn DataService,
        request: &'a CollectionRequest,
    ) -> BoxFuture<'a, Result<CollectionPage<Self>>>;
}

impl Fetch for Patient {
    fn fetch<'a>(
        service: &'a dyn DataService,
        request: &'a CollectionRequest,
    ) -> BoxFuture<'a, Result<CollectionPage<Self>>> {
        service.list_patients(request)
    }
}

impl Fetch for Consent {
    fn fetch<'a>(
        service: &'a dyn DataService,
        request: &'a CollectionRequest,
    ) -> BoxFuture<'a, Result<CollectionPage<Self>>> {
        service.list_consents(request)
    }
}

impl Fetch for Transaction {
    fn fetch<'a>(
        service: &'a dyn DataService,
        request: &'a CollectionRequest,
    ) -> BoxFuture<'a, Result<CollectionPage<Self>>> {
        service.list_transactions(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_search_is_dropped() {
        let request = CollectionRequest::new(
            CollectionKind::Patients,
            RequestPaging::Page {
                page: 1,
                page_size: 10,
            },
        )
        .with_search("");
        assert_eq!(request.search, None);
    }

    #[test]
    fn test_filter_lookup() {
        let request = CollectionRequest::new(
            CollectionKind::Consents,
            RequestPaging::Listing { limit: None },
        )
        .with_filter("status", "active");
        assert_eq!(request.filter("status"), Some("active"));
        assert_eq!(request.filter("type"), None);
    }

    #[test]
    fn test_pagination_deserializes_camel_case() {
        let json = r#"{"page": 2, "limit": 10, "total": 42, "totalPages": 5}"#;
        let pagination: Pagination = serde_json::from_str(json).unwrap();
        assert_eq!(pagination.total_pages, 5);
        assert_eq!(pagination.total, 42);
    }
}
