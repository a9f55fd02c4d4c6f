//! Consent mutations.
//!
//! Creating a consent asks the connected wallet to sign a fixed statement
//! naming the purpose and patient, then submits the signature with the
//! consent. Both checks that can fail locally (a connected wallet, a complete
//! form) run before the signer or the backend is involved.

use rand::RngCore;

use crate::api::{CollectionKind, CollectionRequest, DataService, RequestPaging};
use crate::error::{LedgerError, Result};
use crate::types::{Consent, ConsentPatch, ConsentStatus, NewConsent, Patient};
use crate::wallet::Wallet;

/// Patients offered per lookup while picking one for a new consent
pub const PATIENT_OPTION_LIMIT: usize = 50;

pub const CREATED_MESSAGE: &str = "Consent created successfully!";

/// Input for a new consent
#[derive(Debug, Clone, Default)]
pub struct ConsentForm {
    pub patient: Option<Patient>,
    pub purpose: String,
}

impl ConsentForm {
    pub fn new(patient: Patient, purpose: impl Into<String>) -> Self {
        Self {
            patient: Some(patient),
            purpose: purpose.into(),
        }
    }

    /// The selected patient and purpose, or `Validation` if either is missing
    pub fn require(&self) -> Result<(&Patient, &str)> {
        match &self.patient {
            Some(patient) if !self.purpose.trim().is_empty() => Ok((patient, &self.purpose)),
            _ => Err(LedgerError::Validation(
                "patient and purpose are required".to_string(),
            )),
        }
    }
}

/// A patient as offered in the consent form's picker
#[derive(Debug, Clone, PartialEq)]
pub struct PatientOption {
    pub id: String,
    pub label: String,
    pub patient: Patient,
}

impl From<Patient> for PatientOption {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.clone(),
            label: format!("{} (Patient ID: {})", patient.name, patient.patient_id),
            patient,
        }
    }
}

/// Patients matching `input` for the picker. Lookup failures yield no
/// options rather than an error.
pub async fn patient_options(service: &dyn DataService, input: &str) -> Vec<PatientOption> {
    let request = CollectionRequest::new(
        CollectionKind::Patients,
        RequestPaging::Page {
            page: 1,
            page_size: PATIENT_OPTION_LIMIT,
        },
    )
    .with_search(input);

    match service.list_patients(&request).await {
        Ok(page) => page.items.into_iter().map(PatientOption::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load patient options");
            Vec::new()
        }
    }
}

/// Statement the wallet signs when a consent is created
pub fn consent_message(purpose: &str, patient: &Patient) -> String {
    format!("I consent to: {purpose} for patient: {}", patient.patient_id)
}

/// Sign and submit a new consent
pub async fn create_consent(
    service: &dyn DataService,
    wallet: &Wallet,
    form: &ConsentForm,
) -> Result<Consent> {
    let account = wallet.require_account()?;
    let (patient, purpose) = form.require()?;

    let signature = wallet.sign_message(&consent_message(purpose, patient)).await?;
    let payload = NewConsent {
        patient_id: patient.id.clone(),
        purpose: purpose.to_string(),
        wallet_address: account.to_string(),
        signature,
    };

    let consent = service.create_consent(&payload).await?;
    tracing::info!(id = %consent.id, patient = %patient.id, "consent created");
    Ok(consent)
}

/// Move a consent to `status`. Activation records a transaction hash.
pub async fn update_consent_status(
    service: &dyn DataService,
    id: &str,
    status: ConsentStatus,
) -> Result<Consent> {
    let patch = ConsentPatch {
        status,
        blockchain_tx_hash: (status == ConsentStatus::Active).then(generate_tx_hash),
    };
    let consent = service.update_consent(id, &patch).await?;
    tracing::info!(id, %status, "consent status updated");
    Ok(consent)
}

pub fn status_updated_message(status: ConsentStatus) -> String {
    format!("Consent status updated to {status}")
}

/// `0x` followed by 64 hex digits
pub fn generate_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{hex}")
}
