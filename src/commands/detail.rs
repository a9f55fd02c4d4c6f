use owo_colors::OwoColorize;

use super::{AppContext, print_json};
use crate::display::{format_consent_status_colored, format_date, records_table, truncate_hash};
use crate::error::{LedgerError, Result};
use crate::selection::{ConsentDetail, DetailLoader, DetailOverlay, DetailState, PatientDetail};
use crate::types::{MedicalRecord, Patient};

/// Open the overlay on `id` and hand back the loaded detail
async fn load_detail<D: DetailLoader>(ctx: &AppContext, id: &str) -> Result<D> {
    let mut overlay = DetailOverlay::<D>::new();
    overlay.open(ctx.service.as_ref(), id).await;
    match overlay.into_state() {
        DetailState::Loaded(detail) => Ok(detail),
        DetailState::Failed(message) => Err(LedgerError::Other(message)),
        DetailState::Closed | DetailState::Loading => {
            Err(LedgerError::Other(format!("no detail loaded for '{id}'")))
        }
    }
}

fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<14} {value}\n", format!("{label}:").dimmed())
}

fn optional(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn patient_section(patient: &Patient) -> String {
    let mut text = String::new();
    text.push_str(&format!("{}\n", patient.name.bold()));
    text.push_str(&field("Patient ID", &patient.patient_id));
    text.push_str(&field("Record ID", &patient.id));
    text.push_str(&field("Born", format_date(patient.date_of_birth.as_deref())));
    text.push_str(&field("Gender", optional(patient.gender.as_deref())));
    text.push_str(&field("Email", optional(patient.email.as_deref())));
    text.push_str(&field("Phone", optional(patient.phone.as_deref())));
    text.push_str(&field("Wallet", optional(patient.wallet_address.as_deref())));
    text
}

fn records_section(records: &[MedicalRecord]) -> String {
    if records.is_empty() {
        format!("\n{}\n", "No medical records".dimmed())
    } else {
        format!("\n{}\n{}\n", "Medical records".cyan().bold(), records_table(records))
    }
}

pub async fn cmd_patient_show(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let detail: PatientDetail = load_detail(ctx, id).await?;
    if json {
        return print_json(&detail);
    }

    let mut text = patient_section(&detail.patient);
    text.push_str(&records_section(&detail.records));
    print!("{text}");
    Ok(())
}

pub async fn cmd_consent_show(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let detail: ConsentDetail = load_detail(ctx, id).await?;
    if json {
        return print_json(&detail);
    }

    let consent = &detail.consent;
    let mut text = String::new();
    text.push_str(&format!(
        "{} {}\n",
        format!("Consent {}", consent.id).cyan().bold(),
        format_consent_status_colored(consent.status)
    ));
    text.push_str(&field("Purpose", &consent.purpose));
    text.push_str(&field("Wallet", optional(consent.wallet_address.as_deref())));
    text.push_str(&field(
        "Tx hash",
        truncate_hash(consent.blockchain_tx_hash.as_deref()),
    ));
    text.push_str(&field("Created", format_date(consent.created_at.as_deref())));
    text.push_str(&field("Updated", format_date(consent.updated_at.as_deref())));
    text.push('\n');
    text.push_str(&patient_section(&detail.patient));
    text.push_str(&records_section(&detail.records));
    print!("{text}");
    Ok(())
}
