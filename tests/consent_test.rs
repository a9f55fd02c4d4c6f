mod common;

use careledger::api::CollectionKind;
use careledger::consent::{
    ConsentForm, consent_message, create_consent, patient_options, update_consent_status,
};
use careledger::error::LedgerError;
use careledger::selection::{ConsentDetail, DetailOverlay, DetailState, PatientDetail};
use careledger::types::{ConsentStatus, MedicalRecord};
use careledger::wallet::Wallet;
use common::{ACCOUNT, FixedSigner, StubService, clinic, patient};
use regex::Regex;

fn record(id: &str, patient_id: &str, title: &str) -> MedicalRecord {
    MedicalRecord {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        record_type: "lab_result".to_string(),
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_sends_signed_payload() {
    let stub = clinic();
    let wallet = Wallet::connected(ACCOUNT, FixedSigner::approving());
    let patient = patient("p1", "John Smith");
    let form = ConsentForm::new(patient.clone(), "Medical Research");

    let consent = create_consent(&stub, &wallet, &form).await.unwrap();
    assert_eq!(consent.status, ConsentStatus::Pending);

    let created = stub.created();
    assert_eq!(created.len(), 1);
    let payload = &created[0];
    assert_eq!(payload.patient_id, "p1");
    assert_eq!(payload.purpose, "Medical Research");
    assert_eq!(payload.wallet_address, ACCOUNT);
    let message = consent_message("Medical Research", &patient);
    assert_eq!(message, "I consent to: Medical Research for patient: PAT-p1");
    assert_eq!(payload.signature, format!("0xsig:{}", message.len()));
}

#[tokio::test]
async fn test_create_without_wallet_makes_no_calls() {
    let stub = clinic();
    let form = ConsentForm::new(patient("p1", "John Smith"), "Medical Research");

    let err = create_consent(&stub, &Wallet::disconnected(), &form)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoWallet));

    let err = create_consent(&stub, &Wallet::watch_only(ACCOUNT), &form)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoWallet));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_incomplete_form_makes_no_calls() {
    let stub = clinic();
    let wallet = Wallet::connected(ACCOUNT, FixedSigner::approving());

    let blank_purpose = ConsentForm::new(patient("p1", "John Smith"), "   ");
    let err = create_consent(&stub, &wallet, &blank_purpose).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let no_patient = ConsentForm {
        patient: None,
        purpose: "Medical Research".to_string(),
    };
    let err = create_consent(&stub, &wallet, &no_patient).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_declined_signature_creates_nothing() {
    let stub = clinic();
    let wallet = Wallet::connected(ACCOUNT, FixedSigner::declining());
    let form = ConsentForm::new(patient("p1", "John Smith"), "Medical Research");

    let err = create_consent(&stub, &wallet, &form).await.unwrap_err();
    assert!(matches!(err, LedgerError::UserRejected(_)));
    assert!(stub.created().is_empty());
}

#[tokio::test]
async fn test_activation_records_transaction_hash() {
    let stub = clinic();
    let hash_re = Regex::new(r"^0x[0-9a-f]{64}$").unwrap();

    let consent = update_consent_status(&stub, "c3", ConsentStatus::Active)
        .await
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Active);

    update_consent_status(&stub, "c1", ConsentStatus::Revoked)
        .await
        .unwrap();

    let patches = stub.patches();
    assert_eq!(patches[0].0, "c3");
    assert!(hash_re.is_match(patches[0].1.blockchain_tx_hash.as_deref().unwrap()));
    assert_eq!(patches[1].0, "c1");
    assert_eq!(patches[1].1.status, ConsentStatus::Revoked);
    assert_eq!(patches[1].1.blockchain_tx_hash, None);
}

#[tokio::test]
async fn test_update_of_unknown_consent_fails() {
    let stub = clinic();
    let err = update_consent_status(&stub, "c-missing", ConsentStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound {
            kind: CollectionKind::Consents,
            ..
        }
    ));
}

#[tokio::test]
async fn test_patient_options_label_and_failure() {
    let stub = clinic();
    let options = patient_options(&stub, "jane").await;
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, "p2");
    assert_eq!(options[0].label, "Jane Doe (Patient ID: PAT-p2)");

    stub.fail(CollectionKind::Patients);
    assert!(patient_options(&stub, "jane").await.is_empty());
}

#[tokio::test]
async fn test_consent_detail_loads_patient_and_records() {
    let stub = clinic().with_records("p2", vec![record("r1", "p2", "Blood panel")]);
    let mut overlay = DetailOverlay::<ConsentDetail>::new();

    match overlay.open(&stub, "c2").await {
        DetailState::Loaded(detail) => {
            assert_eq!(detail.consent.id, "c2");
            assert_eq!(detail.patient.name, "Jane Doe");
            assert_eq!(detail.records.len(), 1);
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(overlay.selection().is_selected("c2"));

    overlay.close();
    assert_eq!(overlay.state(), &DetailState::Closed);
    assert!(!overlay.selection().is_open());
}

#[tokio::test]
async fn test_detail_failure_stays_in_overlay() {
    let stub = StubService::new();
    let mut overlay = DetailOverlay::<PatientDetail>::new();

    match overlay.open(&stub, "p-missing").await {
        DetailState::Failed(message) => assert!(message.contains("p-missing")),
        other => panic!("unexpected state {other:?}"),
    }
    assert_eq!(overlay.selection().selected_id(), Some("p-missing"));
}
