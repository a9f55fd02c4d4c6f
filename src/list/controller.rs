//! List-state controller.
//!
//! A synchronous reducer over one view's query and fetched data. It never
//! performs I/O: every change that needs fresh data returns a [`FetchTicket`]
//! for the caller to run, and the outcome is handed back through
//! [`ListController::apply`]. Tickets carry increasing sequence numbers and
//! only the newest one issued is ever applied.

use std::sync::Arc;

use tokio::time::Instant;

use super::debounce::DebouncedInput;
use super::filter::{ListItem, SupportLookup};
use super::paginate::PageResult;
use super::query::{ALL, ListQuery};
use super::view::ViewConfig;
use crate::api::{CollectionPage, CollectionRequest};
use crate::error::{LedgerError, Result};
use crate::notify::Toast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    /// Not mounted yet
    Idle,
    /// First fetch in flight, nothing to show
    Loading,
    Ready,
    /// Showing the previous page while a newer fetch is in flight
    Refreshing,
    /// Last fetch failed; the previous page, if any, is still shown
    Error,
}

impl ListStatus {
    pub fn is_fetching(self) -> bool {
        matches!(self, ListStatus::Loading | ListStatus::Refreshing)
    }
}

/// A fetch the caller must run and report back
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub request: CollectionRequest,
}

/// Read-only view of the controller for rendering
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub status: ListStatus,
    pub page: Option<PageResult<T>>,
    pub error: Option<String>,
    pub query: ListQuery,
    pub notification: Option<Toast>,
    /// Typed input that has not been committed as the search term yet
    pub search_pending: bool,
    pub lookup: Option<Arc<SupportLookup>>,
}

pub struct ListController<T: ListItem> {
    view: ViewConfig<T>,
    query: ListQuery,
    input: DebouncedInput,
    lookup: Option<Arc<SupportLookup>>,
    fetched: Option<CollectionPage<T>>,
    page: Option<PageResult<T>>,
    status: ListStatus,
    error: Option<String>,
    notification: Option<Toast>,
    issued: u64,
    applied: u64,
    closed: bool,
}

impl<T: ListItem> ListController<T> {
    pub fn new(view: ViewConfig<T>) -> Self {
        Self {
            query: ListQuery::new(view.page_size),
            input: DebouncedInput::new(view.debounce),
            view,
            lookup: None,
            fetched: None,
            page: None,
            status: ListStatus::Idle,
            error: None,
            notification: None,
            issued: 0,
            applied: 0,
            closed: false,
        }
    }

    pub fn with_lookup(mut self, lookup: SupportLookup) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    /// Replace the lookup and re-derive the current page from data already
    /// fetched, if no newer fetch is outstanding
    pub fn set_lookup(&mut self, lookup: SupportLookup) {
        self.lookup = Some(Arc::new(lookup));
        if self.issued == self.applied
            && let Some(fetched) = &self.fetched
        {
            self.page = Some(self.view.page(fetched, &self.query, self.lookup.as_deref()));
        }
    }

    pub fn view(&self) -> &ViewConfig<T> {
        &self.view
    }

    pub fn lookup(&self) -> Option<&SupportLookup> {
        self.lookup.as_deref()
    }

    /// Start loading with the current query
    pub fn mount(&mut self) -> FetchTicket {
        self.closed = false;
        self.status = ListStatus::Loading;
        self.ticket()
    }

    fn ticket(&mut self) -> FetchTicket {
        self.issued += 1;
        let request = self.view.request(&self.query);
        tracing::debug!(
            kind = %self.view.kind,
            seq = self.issued,
            page = self.query.page(),
            "fetch issued"
        );
        FetchTicket {
            seq: self.issued,
            request,
        }
    }

    /// Issue a fetch for a changed query. Before mount the change is only
    /// recorded; mounting picks it up.
    fn refetch(&mut self) -> Option<FetchTicket> {
        if self.closed || self.status == ListStatus::Idle {
            return None;
        }
        self.status = match self.status {
            ListStatus::Loading => ListStatus::Loading,
            _ if self.page.is_none() => ListStatus::Loading,
            _ => ListStatus::Refreshing,
        };
        Some(self.ticket())
    }

    /// Record typed input; the search term follows once the input settles
    pub fn on_input(&mut self, value: &str, now: Instant) {
        if self.closed {
            return;
        }
        self.query.set_raw_input(value);
        self.input.on_input(value, now);
    }

    /// Commit settled input as the search term
    pub fn poll_debounce(&mut self, now: Instant) -> Option<FetchTicket> {
        let term = self.input.poll(now)?;
        if self.query.commit_search(&term) {
            self.refetch()
        } else {
            None
        }
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.input.deadline()
    }

    /// Commit a search term immediately, dropping any pending input
    pub fn set_search(&mut self, term: &str) -> Option<FetchTicket> {
        self.input.cancel();
        self.query.set_raw_input(term);
        if self.query.commit_search(term) {
            self.refetch()
        } else {
            None
        }
    }

    pub fn set_filter(&mut self, dimension: &str, value: &str) -> Result<Option<FetchTicket>> {
        self.view.validate_filter(dimension, value)?;
        if self.query.set_filter(dimension, value) {
            Ok(self.refetch())
        } else {
            Ok(None)
        }
    }

    pub fn clear_filter(&mut self, dimension: &str) -> Result<Option<FetchTicket>> {
        self.set_filter(dimension, ALL)
    }

    pub fn set_page(&mut self, page: usize) -> Option<FetchTicket> {
        if self.query.set_page(page) {
            self.refetch()
        } else {
            None
        }
    }

    /// Only moves while a later page exists
    pub fn next_page(&mut self) -> Option<FetchTicket> {
        let total_pages = self.page.as_ref()?.total_pages;
        if self.query.page() < total_pages {
            self.set_page(self.query.page() + 1)
        } else {
            None
        }
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        if self.query.page() > 1 {
            self.set_page(self.query.page() - 1)
        } else {
            None
        }
    }

    /// A page size of zero is ignored
    pub fn set_page_size(&mut self, page_size: usize) -> Option<FetchTicket> {
        if self.query.set_page_size(page_size) {
            self.refetch()
        } else {
            None
        }
    }

    /// Fetch again with the unchanged query
    pub fn refresh(&mut self) -> FetchTicket {
        if self.status == ListStatus::Idle {
            return self.mount();
        }
        match self.refetch() {
            Some(ticket) => ticket,
            // closed; the outcome will be ignored
            None => self.ticket(),
        }
    }

    /// A mutation went through: back to page 1 and reload everything
    pub fn mutation_succeeded(&mut self) -> FetchTicket {
        self.query.set_page(1);
        self.refresh()
    }

    /// A mutation failed: report it and leave the list alone
    pub fn mutation_failed(&mut self, error: &LedgerError) {
        tracing::warn!(kind = %self.view.kind, error = %error, "mutation failed");
        self.notification = Some(Toast::error(error.to_string()));
    }

    /// Apply the outcome of a ticket. Returns `false` when the outcome was
    /// discarded because a newer ticket has been issued since.
    pub fn apply(&mut self, seq: u64, result: Result<CollectionPage<T>>) -> bool {
        if self.closed || seq != self.issued || seq <= self.applied {
            tracing::debug!(
                kind = %self.view.kind,
                seq,
                latest = self.issued,
                "discarding stale response"
            );
            return false;
        }
        self.applied = seq;

        match result {
            Ok(fetched) => {
                let page = self.view.page(&fetched, &self.query, self.lookup.as_deref());
                self.fetched = Some(fetched);
                self.page = Some(page);
                self.error = None;
                self.status = ListStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(kind = %self.view.kind, seq, error = %e, "fetch failed");
                self.notification = Some(Toast::error(format!(
                    "Failed to fetch {}s: {e}",
                    self.view.kind
                )));
                self.error = Some(e.to_string());
                self.status = ListStatus::Error;
            }
        }
        true
    }

    pub fn notify(&mut self, toast: Toast) {
        self.notification = Some(toast);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            status: self.status,
            page: self.page.clone(),
            error: self.error.clone(),
            query: self.query.clone(),
            notification: self.notification.clone(),
            search_pending: self.input.is_pending(),
            lookup: self.lookup.clone(),
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn page(&self) -> Option<&PageResult<T>> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notification(&self) -> Option<&Toast> {
        self.notification.as_ref()
    }

    /// Everything the last applied fetch returned, before local filtering
    pub fn items(&self) -> &[T] {
        self.fetched.as_ref().map(|f| f.items.as_slice()).unwrap_or(&[])
    }

    /// Stop the view: pending input is dropped and late responses ignored
    pub fn teardown(&mut self) {
        self.input.cancel();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
