//! Table rendering for list pages, detail records and statistics.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::formatters::{format_date, format_number, format_type_label, item_label, truncate_address, truncate_hash};
use crate::list::{ListItem, PageResult, SupportLookup};
use crate::types::{Consent, MedicalRecord, Patient, PlatformStats, Transaction};

#[derive(Tabled)]
struct PatientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Patient ID")]
    patient_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Wallet")]
    wallet: String,
}

#[derive(Tabled)]
struct ConsentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Purpose")]
    purpose: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tx Hash")]
    tx_hash: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    tx_type: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tx Hash")]
    tx_hash: String,
    #[tabled(rename = "Time")]
    time: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Hash")]
    hash: String,
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Total")]
    total: String,
}

fn render<R: Tabled>(rows: Vec<R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn patients_table(patients: &[Patient]) -> String {
    render(
        patients
            .iter()
            .map(|p| PatientRow {
                id: p.id.clone(),
                patient_id: p.patient_id.clone(),
                name: p.name.clone(),
                gender: p.gender.clone().unwrap_or_default(),
                wallet: p
                    .wallet_address
                    .as_deref()
                    .map(truncate_address)
                    .unwrap_or_default(),
            })
            .collect(),
    )
}

/// Patient column shows the resolved name when the lookup knows the id
pub fn consents_table(consents: &[Consent], lookup: Option<&SupportLookup>) -> String {
    render(
        consents
            .iter()
            .map(|c| {
                let name = lookup.map(|l| l.patient_name(&c.patient_id)).unwrap_or("");
                ConsentRow {
                    id: c.id.clone(),
                    patient: if name.is_empty() {
                        c.patient_id.clone()
                    } else {
                        name.to_string()
                    },
                    purpose: c.purpose.clone(),
                    status: c.status.to_string(),
                    tx_hash: truncate_hash(c.blockchain_tx_hash.as_deref()),
                    created: format_date(c.created_at.as_deref()),
                }
            })
            .collect(),
    )
}

pub fn transactions_table(transactions: &[Transaction]) -> String {
    render(
        transactions
            .iter()
            .map(|t| TransactionRow {
                id: t.id.clone(),
                tx_type: format_type_label(&t.tx_type),
                from: truncate_address(&t.from),
                to: truncate_address(&t.to),
                status: t.status.to_string(),
                tx_hash: truncate_hash(Some(&t.blockchain_tx_hash)),
                time: format_date(t.timestamp.as_deref()),
            })
            .collect(),
    )
}

pub fn records_table(records: &[MedicalRecord]) -> String {
    render(
        records
            .iter()
            .map(|r| RecordRow {
                record_type: r.record_type.clone(),
                title: r.title.clone(),
                date: format_date(r.date.as_deref()),
                doctor: r.doctor.clone().unwrap_or_default(),
                hash: truncate_hash(r.blockchain_hash.as_deref()),
            })
            .collect(),
    )
}

pub fn stats_table(stats: &PlatformStats) -> String {
    let rows = [
        ("Patients", stats.total_patients),
        ("Medical records", stats.total_records),
        ("Consents", stats.total_consents),
        ("Active consents", stats.active_consents),
        ("Pending consents", stats.pending_consents),
        ("Transactions", stats.total_transactions),
    ]
    .into_iter()
    .map(|(metric, n)| StatRow {
        metric,
        total: format_number(n),
    })
    .collect();
    render(rows)
}

/// List items that know how to render a page of themselves
pub trait ListRender: ListItem {
    /// Singular noun used in footers and messages
    const NOUN: &'static str;

    fn table(items: &[Self], lookup: Option<&SupportLookup>) -> String;
}

impl ListRender for Patient {
    const NOUN: &'static str = "patient";

    fn table(items: &[Self], _lookup: Option<&SupportLookup>) -> String {
        patients_table(items)
    }
}

impl ListRender for Consent {
    const NOUN: &'static str = "consent";

    fn table(items: &[Self], lookup: Option<&SupportLookup>) -> String {
        consents_table(items, lookup)
    }
}

impl ListRender for Transaction {
    const NOUN: &'static str = "transaction";

    fn table(items: &[Self], _lookup: Option<&SupportLookup>) -> String {
        transactions_table(items)
    }
}

/// Table plus footer, or the footer alone for an empty page
pub fn render_page<T: ListRender>(page: &PageResult<T>, lookup: Option<&SupportLookup>) -> String {
    let footer = page_footer(page, T::NOUN);
    if page.items.is_empty() {
        footer
    } else {
        format!("{}\n{footer}", T::table(&page.items, lookup))
    }
}

/// `Showing 21-23 of 23 consents (page 3 of 3)`
pub fn page_footer<T>(page: &PageResult<T>, singular: &str) -> String {
    match page.range() {
        Some((first, last)) => format!(
            "Showing {first}-{last} of {} (page {} of {})",
            item_label(page.total_items, singular),
            page.page,
            page.total_pages
        ),
        None if page.total_items == 0 => format!("No {singular}s found"),
        None => format!(
            "Page {} is past the end ({}, {} pages)",
            page.page,
            item_label(page.total_items, singular),
            page.total_pages
        ),
    }
}
