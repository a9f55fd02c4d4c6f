#![allow(dead_code)]

//! Shared helpers for integration tests: an in-memory records backend with
//! failure injection and call recording, plus a runner for the binary.

use std::collections::{HashMap, HashSet, VecDeque};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use careledger::api::{
    CollectionKind, CollectionPage, CollectionRequest, DataService, Pagination, RequestPaging,
};
use careledger::error::{LedgerError, Result};
use careledger::types::{
    Consent, ConsentPatch, ConsentStatus, MedicalRecord, NewConsent, Patient, PlatformStats,
    Transaction, TransactionStatus,
};
use careledger::wallet::Signer;
use tempfile::TempDir;

#[derive(Default)]
struct StubState {
    patients: Vec<Patient>,
    consents: Vec<Consent>,
    transactions: Vec<Transaction>,
    records: HashMap<String, Vec<MedicalRecord>>,
    failing: HashSet<CollectionKind>,
    fail_mutations: bool,
    delays: HashMap<CollectionKind, VecDeque<Duration>>,
    requests: Vec<CollectionRequest>,
    created: Vec<NewConsent>,
    patches: Vec<(String, ConsentPatch)>,
    calls: usize,
}

/// In-memory backend that behaves like the records API
#[derive(Default)]
pub struct StubService {
    state: Mutex<StubState>,
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        self.state().patients = patients;
        self
    }

    pub fn with_consents(self, consents: Vec<Consent>) -> Self {
        self.state().consents = consents;
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        self.state().transactions = transactions;
        self
    }

    pub fn with_records(self, patient_id: &str, records: Vec<MedicalRecord>) -> Self {
        self.state().records.insert(patient_id.to_string(), records);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    /// Make every listing of `kind` fail until [`StubService::recover`]
    pub fn fail(&self, kind: CollectionKind) {
        self.state().failing.insert(kind);
    }

    pub fn recover(&self, kind: CollectionKind) {
        self.state().failing.remove(&kind);
    }

    pub fn fail_mutations(&self) {
        self.state().fail_mutations = true;
    }

    /// Delay the next listings of `kind`, one entry per call, in order
    pub fn delay(&self, kind: CollectionKind, delays: &[Duration]) {
        self.state()
            .delays
            .entry(kind)
            .or_default()
            .extend(delays.iter().copied());
    }

    pub fn push_consent(&self, consent: Consent) {
        self.state().consents.push(consent);
    }

    /// Listing requests received so far, oldest first
    pub fn requests(&self) -> Vec<CollectionRequest> {
        self.state().requests.clone()
    }

    pub fn requests_for(&self, kind: CollectionKind) -> Vec<CollectionRequest> {
        self.requests().into_iter().filter(|r| r.kind == kind).collect()
    }

    /// Every call of any kind, listings and mutations included
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    pub fn created(&self) -> Vec<NewConsent> {
        self.state().created.clone()
    }

    pub fn patches(&self) -> Vec<(String, ConsentPatch)> {
        self.state().patches.clone()
    }

    /// Record a listing call and return the delay to apply, or the injected failure
    fn begin(&self, request: &CollectionRequest) -> Result<Option<Duration>> {
        let mut state = self.state();
        state.calls += 1;
        state.requests.push(request.clone());
        if state.failing.contains(&request.kind) {
            return Err(LedgerError::Transport(format!(
                "{} unavailable",
                request.kind.path()
            )));
        }
        Ok(state
            .delays
            .get_mut(&request.kind)
            .and_then(VecDeque::pop_front))
    }

    async fn wait(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn begin_mutation(&self) -> Result<()> {
        let mut state = self.state();
        state.calls += 1;
        if state.fail_mutations {
            return Err(LedgerError::Transport("write rejected".to_string()));
        }
        Ok(())
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn listing<T>(items: Vec<T>, limit: Option<usize>) -> CollectionPage<T> {
    let items = match limit {
        Some(limit) => items.into_iter().take(limit).collect(),
        None => items,
    };
    CollectionPage::listing(items)
}

#[async_trait::async_trait]
impl DataService for StubService {
    async fn list_patients(&self, request: &CollectionRequest) -> Result<CollectionPage<Patient>> {
        let delay = self.begin(request)?;
        Self::wait(delay).await;

        let matching: Vec<Patient> = self
            .state()
            .patients
            .iter()
            .filter(|p| match &request.search {
                Some(term) => {
                    contains(&p.name, term)
                        || contains(&p.patient_id, term)
                        || p.email.as_deref().is_some_and(|e| contains(e, term))
                }
                None => true,
            })
            .cloned()
            .collect();

        match request.paging {
            RequestPaging::Page { page, page_size } => {
                let total = matching.len();
                let items = matching
                    .into_iter()
                    .skip((page - 1) * page_size)
                    .take(page_size)
                    .collect();
                Ok(CollectionPage::paged(
                    items,
                    Pagination {
                        page,
                        limit: page_size,
                        total,
                        total_pages: total.div_ceil(page_size),
                    },
                ))
            }
            RequestPaging::Listing { limit } => Ok(listing(matching, limit)),
        }
    }

    async fn list_consents(&self, request: &CollectionRequest) -> Result<CollectionPage<Consent>> {
        let delay = self.begin(request)?;
        Self::wait(delay).await;

        let status = request.filter("status").map(str::to_string);
        let consents: Vec<Consent> = self
            .state()
            .consents
            .iter()
            .filter(|c| status.as_deref().is_none_or(|s| c.status.to_string() == s))
            .cloned()
            .collect();
        let limit = match request.paging {
            RequestPaging::Listing { limit } => limit,
            RequestPaging::Page { .. } => None,
        };
        Ok(listing(consents, limit))
    }

    async fn list_transactions(
        &self,
        request: &CollectionRequest,
    ) -> Result<CollectionPage<Transaction>> {
        let delay = self.begin(request)?;
        Self::wait(delay).await;

        let wallet = request.filter("wallet").map(str::to_lowercase);
        let transactions: Vec<Transaction> = self
            .state()
            .transactions
            .iter()
            .filter(|t| {
                wallet.as_deref().is_none_or(|w| {
                    t.from.to_lowercase() == w || t.to.to_lowercase() == w
                })
            })
            .cloned()
            .collect();
        let limit = match request.paging {
            RequestPaging::Listing { limit } => limit,
            RequestPaging::Page { .. } => None,
        };
        Ok(listing(transactions, limit))
    }

    async fn patient(&self, id: &str) -> Result<Patient> {
        let mut state = self.state();
        state.calls += 1;
        state
            .patients
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                kind: CollectionKind::Patients,
                id: id.to_string(),
            })
    }

    async fn patient_records(&self, patient_id: &str) -> Result<Vec<MedicalRecord>> {
        let mut state = self.state();
        state.calls += 1;
        Ok(state.records.get(patient_id).cloned().unwrap_or_default())
    }

    async fn consent(&self, id: &str) -> Result<Consent> {
        let mut state = self.state();
        state.calls += 1;
        state
            .consents
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                kind: CollectionKind::Consents,
                id: id.to_string(),
            })
    }

    async fn create_consent(&self, payload: &NewConsent) -> Result<Consent> {
        self.begin_mutation()?;
        let mut state = self.state();
        state.created.push(payload.clone());
        let consent = Consent {
            id: format!("c-new-{}", state.created.len()),
            patient_id: payload.patient_id.clone(),
            purpose: payload.purpose.clone(),
            status: ConsentStatus::Pending,
            wallet_address: Some(payload.wallet_address.clone()),
            signature: Some(payload.signature.clone()),
            ..Default::default()
        };
        // newest first, like the backend
        state.consents.insert(0, consent.clone());
        Ok(consent)
    }

    async fn update_consent(&self, id: &str, patch: &ConsentPatch) -> Result<Consent> {
        self.begin_mutation()?;
        let mut state = self.state();
        state.patches.push((id.to_string(), patch.clone()));
        let consent = state
            .consents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LedgerError::NotFound {
                kind: CollectionKind::Consents,
                id: id.to_string(),
            })?;
        consent.status = patch.status;
        if patch.blockchain_tx_hash.is_some() {
            consent.blockchain_tx_hash = patch.blockchain_tx_hash.clone();
        }
        Ok(consent.clone())
    }

    async fn stats(&self) -> Result<PlatformStats> {
        let mut state = self.state();
        state.calls += 1;
        Ok(PlatformStats {
            total_patients: state.patients.len() as u64,
            total_consents: state.consents.len() as u64,
            active_consents: state
                .consents
                .iter()
                .filter(|c| c.status == ConsentStatus::Active)
                .count() as u64,
            pending_consents: state
                .consents
                .iter()
                .filter(|c| c.status == ConsentStatus::Pending)
                .count() as u64,
            total_transactions: state.transactions.len() as u64,
            ..Default::default()
        })
    }
}

/// Signer that answers immediately, or declines when built with `declining`
pub struct FixedSigner {
    decline: bool,
}

impl FixedSigner {
    pub fn approving() -> Arc<Self> {
        Arc::new(Self { decline: false })
    }

    pub fn declining() -> Arc<Self> {
        Arc::new(Self { decline: true })
    }
}

#[async_trait::async_trait]
impl Signer for FixedSigner {
    async fn sign_message(&self, message: &str) -> Result<String> {
        if self.decline {
            return Err(LedgerError::UserRejected("declined".to_string()));
        }
        Ok(format!("0xsig:{}", message.len()))
    }
}

pub const ACCOUNT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

pub fn patient(id: &str, name: &str) -> Patient {
    Patient {
        id: id.to_string(),
        patient_id: format!("PAT-{id}"),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        ..Default::default()
    }
}

pub fn consent(id: &str, patient_id: &str, purpose: &str, status: ConsentStatus) -> Consent {
    Consent {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        purpose: purpose.to_string(),
        status,
        ..Default::default()
    }
}

pub fn transaction(id: &str, tx_type: &str, from: &str, status: TransactionStatus) -> Transaction {
    Transaction {
        id: id.to_string(),
        tx_type: tx_type.to_string(),
        from: from.to_string(),
        to: "0x0000000000000000000000000000000000000001".to_string(),
        status,
        blockchain_tx_hash: format!("0x{id:0>64}"),
        ..Default::default()
    }
}

/// `n` pending consents `c1..=cn` spread over patients `p1` and `p2`
pub fn numbered_consents(n: usize) -> Vec<Consent> {
    (1..=n)
        .map(|i| {
            consent(
                &format!("c{i}"),
                if i % 2 == 0 { "p2" } else { "p1" },
                "Medical Research",
                ConsentStatus::Pending,
            )
        })
        .collect()
}

/// The consents fixture used across scenarios: John Smith and Jane Doe with
/// one consent each in every status
pub fn clinic() -> StubService {
    StubService::new()
        .with_patients(vec![patient("p1", "John Smith"), patient("p2", "Jane Doe")])
        .with_consents(vec![
            consent("c1", "p1", "Medical Research", ConsentStatus::Active),
            consent("c2", "p2", "Insurance Provider Access", ConsentStatus::Active),
            consent("c3", "p1", "Insurance Provider Access", ConsentStatus::Pending),
            consent("c4", "p2", "Second Opinion", ConsentStatus::Revoked),
        ])
}

/// Runs the binary with configuration isolated in a temp directory
pub struct CareledgerTest {
    pub temp_dir: TempDir,
}

impl CareledgerTest {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn write_config(&self, yaml: &str) {
        std::fs::write(self.config_path(), yaml).expect("Failed to write config");
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_careledger"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("CARELEDGER_CONFIG", self.config_path())
            .env_remove("CARELEDGER_API_URL")
            .env_remove("CARELEDGER_API_TOKEN")
            .env_remove("CARELEDGER_WALLET_ACCOUNT")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute careledger")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
