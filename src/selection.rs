//! Detail overlay for a selected list item.
//!
//! Selection is independent of the list query: the selected id does not have
//! to be on the current page, and opening or closing the overlay never
//! changes what the list shows. Failures while loading details stay inside
//! the overlay.

use serde::Serialize;

use crate::api::DataService;
use crate::error::Result;
use crate::types::{Consent, MedicalRecord, Patient};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<String>,
    is_open: bool,
}

impl Selection {
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected_id = Some(id.into());
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.selected_id = None;
        self.is_open = false;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.is_open && self.selected_id.as_deref() == Some(id)
    }
}

/// A consent with its patient and the patient's records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentDetail {
    pub consent: Consent,
    pub patient: Patient,
    pub records: Vec<MedicalRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetail {
    pub patient: Patient,
    pub records: Vec<MedicalRecord>,
}

/// Detail content that can be loaded by id
#[async_trait::async_trait]
pub trait DetailLoader: Sized + Send {
    async fn load(service: &dyn DataService, id: &str) -> Result<Self>;
}

#[async_trait::async_trait]
impl DetailLoader for ConsentDetail {
    /// Each step needs the previous one's answer
    async fn load(service: &dyn DataService, id: &str) -> Result<Self> {
        let consent = service.consent(id).await?;
        let patient = service.patient(&consent.patient_id).await?;
        let records = service.patient_records(&patient.id).await?;
        Ok(Self {
            consent,
            patient,
            records,
        })
    }
}

#[async_trait::async_trait]
impl DetailLoader for PatientDetail {
    async fn load(service: &dyn DataService, id: &str) -> Result<Self> {
        let (patient, records) =
            futures::try_join!(service.patient(id), service.patient_records(id))?;
        Ok(Self { patient, records })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState<D> {
    #[default]
    Closed,
    Loading,
    Loaded(D),
    /// Shown in place of the detail content
    Failed(String),
}

/// Selection plus the detail content loaded for it
#[derive(Debug, Clone)]
pub struct DetailOverlay<D> {
    selection: Selection,
    state: DetailState<D>,
}

impl<D: DetailLoader> Default for DetailOverlay<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DetailLoader> DetailOverlay<D> {
    pub fn new() -> Self {
        Self {
            selection: Selection::default(),
            state: DetailState::Closed,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> &DetailState<D> {
        &self.state
    }

    pub fn into_state(self) -> DetailState<D> {
        self.state
    }

    /// Select `id` and mark its detail as loading
    pub fn select(&mut self, id: &str) {
        self.selection.select(id);
        self.state = DetailState::Loading;
    }

    /// Store a load outcome unless the selection moved on meanwhile
    pub fn resolve(&mut self, id: &str, result: Result<D>) -> bool {
        if !self.selection.is_selected(id) {
            return false;
        }
        self.state = match result {
            Ok(detail) => DetailState::Loaded(detail),
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to load detail");
                DetailState::Failed(e.to_string())
            }
        };
        true
    }

    /// Select and load in one step
    pub async fn open(&mut self, service: &dyn DataService, id: &str) -> &DetailState<D> {
        self.select(id);
        let result = D::load(service, id).await;
        self.resolve(id, result);
        &self.state
    }

    pub fn close(&mut self) {
        self.selection.close();
        self.state = DetailState::Closed;
    }
}
