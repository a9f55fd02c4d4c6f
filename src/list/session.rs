//! Async driver for a [`ListController`].
//!
//! [`ListSession`] runs the controller's fetch tickets against a
//! [`DataService`]. The awaitable setters run one fetch at a time, which is
//! what the one-shot commands need. [`ListSession::run`] is the interactive
//! loop: it takes events from a channel, keeps any number of fetches in
//! flight, fires the debounce deadline and publishes a snapshot after every
//! step.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};

use super::controller::{FetchTicket, ListController, ListSnapshot, ListStatus};
use super::filter::{ListItem, SupportLookup};
use super::view::ViewConfig;
use crate::api::{CollectionKind, CollectionPage, CollectionRequest, DataService, Fetch, RequestPaging};
use crate::error::{LedgerError, Result};
use crate::notify::Toast;

/// Capacity for event channels feeding [`ListSession::run`]
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

type InFlight<T> = BoxFuture<'static, (u64, Result<CollectionPage<T>>)>;

/// User actions delivered to a running session
#[derive(Debug)]
pub enum ListEvent {
    /// Typed search text, debounced before it applies
    Input(String),
    /// Search term applied immediately
    Search(String),
    SetFilter { dimension: String, value: String },
    ClearFilter(String),
    SetPage(usize),
    NextPage,
    PreviousPage,
    SetPageSize(usize),
    Refresh,
    /// A mutation completed; the message is shown as a success toast
    MutationSucceeded(String),
    MutationFailed(LedgerError),
    DismissNotification,
    Close,
}

pub struct ListSession<T: ListItem + Fetch> {
    controller: ListController<T>,
    service: Arc<dyn DataService>,
}

impl<T: ListItem + Fetch> ListSession<T> {
    pub fn new(service: Arc<dyn DataService>, view: ViewConfig<T>) -> Self {
        Self {
            controller: ListController::new(view),
            service,
        }
    }

    pub fn controller(&self) -> &ListController<T> {
        &self.controller
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.controller.snapshot()
    }

    /// Load the patient lookup the view needs, if any. A failure is logged
    /// and resolves to an empty lookup.
    fn load_lookup(&self) -> Option<BoxFuture<'static, SupportLookup>> {
        let limit = self.controller.view().lookup_limit?;
        let service = Arc::clone(&self.service);
        Some(Box::pin(async move {
            let request = CollectionRequest::new(
                CollectionKind::Patients,
                RequestPaging::Page {
                    page: 1,
                    page_size: limit,
                },
            );
            match service.list_patients(&request).await {
                Ok(page) => SupportLookup::from_patients(page.items),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load patients for name lookup");
                    SupportLookup::default()
                }
            }
        }))
    }

    async fn prepare_lookup(&mut self) {
        if let Some(load) = self.load_lookup() {
            let lookup = load.await;
            self.controller.set_lookup(lookup);
        }
    }

    async fn execute(&mut self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            let result = T::fetch(self.service.as_ref(), &ticket.request).await;
            self.controller.apply(ticket.seq, result);
        }
    }

    fn in_flight(&self, ticket: FetchTicket) -> InFlight<T> {
        let service = Arc::clone(&self.service);
        Box::pin(async move {
            let result = T::fetch(service.as_ref(), &ticket.request).await;
            (ticket.seq, result)
        })
    }

    /// Enter `Loading`, load the lookup (when the view has one), then the
    /// first page
    pub async fn mount(&mut self) {
        let ticket = self.controller.mount();
        self.prepare_lookup().await;
        self.execute(Some(ticket)).await;
    }

    /// Record typed input without waiting for it to settle
    pub fn input(&mut self, value: &str) {
        self.controller.on_input(value, Instant::now());
    }

    /// Wait out the debounce interval and apply the settled search
    pub async fn settle(&mut self) {
        while let Some(deadline) = self.controller.debounce_deadline() {
            sleep_until(deadline).await;
            let ticket = self.controller.poll_debounce(Instant::now());
            self.execute(ticket).await;
        }
    }

    pub async fn search(&mut self, term: &str) {
        let ticket = self.controller.set_search(term);
        self.execute(ticket).await;
    }

    pub async fn set_filter(&mut self, dimension: &str, value: &str) -> Result<()> {
        let ticket = self.controller.set_filter(dimension, value)?;
        self.execute(ticket).await;
        Ok(())
    }

    pub async fn clear_filter(&mut self, dimension: &str) -> Result<()> {
        let ticket = self.controller.clear_filter(dimension)?;
        self.execute(ticket).await;
        Ok(())
    }

    pub async fn set_page(&mut self, page: usize) {
        let ticket = self.controller.set_page(page);
        self.execute(ticket).await;
    }

    pub async fn next_page(&mut self) {
        let ticket = self.controller.next_page();
        self.execute(ticket).await;
    }

    pub async fn previous_page(&mut self) {
        let ticket = self.controller.previous_page();
        self.execute(ticket).await;
    }

    pub async fn set_page_size(&mut self, page_size: usize) {
        let ticket = self.controller.set_page_size(page_size);
        self.execute(ticket).await;
    }

    pub async fn refresh(&mut self) {
        let ticket = self.controller.refresh();
        self.execute(Some(ticket)).await;
    }

    /// Feed a mutation outcome to the view: success reloads from page 1
    /// (mounting the view if it never loaded), failure only raises a
    /// notification. The outcome is passed through.
    pub async fn after_mutation<R>(
        &mut self,
        outcome: Result<R>,
        success: impl Into<String>,
    ) -> Result<R> {
        match &outcome {
            Ok(_) => {
                if self.controller.status() == ListStatus::Idle {
                    self.prepare_lookup().await;
                }
                self.controller.notify(Toast::success(success));
                let ticket = self.controller.mutation_succeeded();
                self.execute(Some(ticket)).await;
            }
            Err(e) => self.controller.mutation_failed(e),
        }
        outcome
    }

    fn handle(&mut self, event: ListEvent) -> Option<FetchTicket> {
        match event {
            ListEvent::Input(value) => {
                self.controller.on_input(&value, Instant::now());
                None
            }
            ListEvent::Search(term) => self.controller.set_search(&term),
            ListEvent::SetFilter { dimension, value } => self.filter_event(&dimension, &value),
            ListEvent::ClearFilter(dimension) => self.filter_event(&dimension, super::query::ALL),
            ListEvent::SetPage(page) => self.controller.set_page(page),
            ListEvent::NextPage => self.controller.next_page(),
            ListEvent::PreviousPage => self.controller.previous_page(),
            ListEvent::SetPageSize(size) => self.controller.set_page_size(size),
            ListEvent::Refresh => Some(self.controller.refresh()),
            ListEvent::MutationSucceeded(message) => {
                self.controller.notify(Toast::success(message));
                Some(self.controller.mutation_succeeded())
            }
            ListEvent::MutationFailed(error) => {
                self.controller.mutation_failed(&error);
                None
            }
            ListEvent::DismissNotification => {
                self.controller.dismiss_notification();
                None
            }
            ListEvent::Close => None,
        }
    }

    fn filter_event(&mut self, dimension: &str, value: &str) -> Option<FetchTicket> {
        match self.controller.set_filter(dimension, value) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.controller.notify(Toast::warning(e.to_string()));
                None
            }
        }
    }

    /// Drive the view until `Close` arrives or the event channel closes.
    ///
    /// The view enters `Loading` at once. While its lookup loads, events are
    /// still handled but fetches are held back; only the newest held ticket
    /// is sent once the lookup settles. A snapshot is published after mount
    /// and after every event, debounce commit, lookup and applied or
    /// discarded response. Returns the torn-down controller.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ListEvent>,
        snapshots: watch::Sender<ListSnapshot<T>>,
    ) -> ListController<T> {
        let mut in_flight: FuturesUnordered<InFlight<T>> = FuturesUnordered::new();
        let mut lookups: FuturesUnordered<BoxFuture<'static, SupportLookup>> =
            FuturesUnordered::new();
        let mut held = None;

        let ticket = self.controller.mount();
        match self.load_lookup() {
            Some(load) => {
                lookups.push(load);
                held = Some(ticket);
            }
            None => in_flight.push(self.in_flight(ticket)),
        }
        snapshots.send_replace(self.controller.snapshot());

        loop {
            let deadline = self.controller.debounce_deadline();
            let ticket = tokio::select! {
                event = events.recv() => {
                    match event {
                        None | Some(ListEvent::Close) => break,
                        Some(event) => self.handle(event),
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.controller.poll_debounce(Instant::now())
                }
                Some(lookup) = lookups.next(), if !lookups.is_empty() => {
                    self.controller.set_lookup(lookup);
                    held.take()
                }
                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.controller.apply(seq, result);
                    None
                }
            };

            if let Some(ticket) = ticket {
                if lookups.is_empty() {
                    in_flight.push(self.in_flight(ticket));
                } else {
                    held = Some(ticket);
                }
            }
            snapshots.send_replace(self.controller.snapshot());
        }

        self.controller.teardown();
        snapshots.send_replace(self.controller.snapshot());
        self.controller
    }
}
