use super::AppContext;
use crate::consent::{
    CREATED_MESSAGE, ConsentForm, create_consent, patient_options, status_updated_message,
    update_consent_status,
};
use crate::display::{print_toast, render_page};
use crate::error::{LedgerError, Result};
use crate::list::{ListSession, ViewConfig};
use crate::types::{CONSENT_PURPOSES, Consent, ConsentStatus, Patient};

/// Resolve `--patient` as a record id, falling back to a search that must
/// match exactly one patient
async fn resolve_patient(ctx: &AppContext, query: &str) -> Result<Patient> {
    match ctx.service.patient(query).await {
        Ok(patient) => return Ok(patient),
        Err(LedgerError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let mut options = patient_options(ctx.service.as_ref(), query).await;
    match options.len() {
        1 => Ok(options.remove(0).patient),
        0 => Err(LedgerError::Validation(format!(
            "no patient matches '{query}'"
        ))),
        n => {
            let labels: Vec<String> = options.into_iter().map(|o| o.label).collect();
            Err(LedgerError::Validation(format!(
                "'{query}' matches {n} patients: {}",
                labels.join(", ")
            )))
        }
    }
}

/// Reload the consents list after a mutation and print it with the outcome
async fn refresh_after(
    ctx: &AppContext,
    outcome: Result<Consent>,
    message: String,
) -> Result<Consent> {
    let view = ViewConfig::consents().with_settings(&ctx.config.views.consents);
    let mut session = ListSession::new(ctx.service.clone(), view);
    let outcome = session.after_mutation(outcome, message).await;

    let snapshot = session.snapshot();
    if let Some(page) = &snapshot.page {
        println!("{}", render_page(page, snapshot.lookup.as_deref()));
    }
    // a failure is reported once, by the caller
    if outcome.is_ok()
        && let Some(toast) = &snapshot.notification
    {
        print_toast(toast);
    }
    outcome
}

pub async fn cmd_consent_create(ctx: &AppContext, patient: &str, purpose: &str) -> Result<()> {
    ctx.wallet.require_account()?;
    if purpose.trim().is_empty() {
        return Err(LedgerError::Validation(format!(
            "a purpose is required, e.g. {}",
            CONSENT_PURPOSES.join(", ")
        )));
    }

    let patient = resolve_patient(ctx, patient).await?;
    let form = ConsentForm::new(patient, purpose);
    let outcome = create_consent(ctx.service.as_ref(), &ctx.wallet, &form).await;
    refresh_after(ctx, outcome, CREATED_MESSAGE.to_string()).await?;
    Ok(())
}

pub async fn cmd_consent_set_status(ctx: &AppContext, id: &str, status: ConsentStatus) -> Result<()> {
    let outcome = update_consent_status(ctx.service.as_ref(), id, status).await;
    refresh_after(ctx, outcome, status_updated_message(status)).await?;
    Ok(())
}
