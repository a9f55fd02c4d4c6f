use serde::{Deserialize, Serialize};

use crate::status_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    #[default]
    Pending,
    Active,
    Revoked,
}

status_enum!(ConsentStatus, VALID_CONSENT_STATUSES, {
    Pending => "pending",
    Active => "active",
    Revoked => "revoked",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

status_enum!(TransactionStatus, VALID_TRANSACTION_STATUSES, {
    Pending => "pending",
    Confirmed => "confirmed",
    Failed => "failed",
});

/// Consent purposes offered when creating a consent
pub const CONSENT_PURPOSES: &[&str] = &[
    "Research Study Participation",
    "Data Sharing with Research Institution",
    "Third-Party Analytics Access",
    "Insurance Provider Access",
];

/// Page sizes offered by every list view
pub const PAGE_SIZE_OPTIONS: &[usize] = &[5, 10, 20];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Internal record id
    pub id: String,
    /// Human-facing patient number
    #[serde(default)]
    pub patient_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub id: String,
    pub patient_id: String,
    pub purpose: String,
    #[serde(default)]
    pub status: ConsentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub blockchain_tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_patients: u64,
    pub total_records: u64,
    pub total_consents: u64,
    pub active_consents: u64,
    pub pending_consents: u64,
    pub total_transactions: u64,
}

/// Payload for creating a consent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsent {
    pub patient_id: String,
    pub purpose: String,
    pub wallet_address: String,
    pub signature: String,
}

/// Patch for an existing consent. A `None` hash is sent as an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPatch {
    pub status: ConsentStatus,
    pub blockchain_tx_hash: Option<String>,
}
