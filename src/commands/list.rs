use serde::Serialize;

use super::{AppContext, print_json};
use crate::api::Fetch;
use crate::cli::ListArgs;
use crate::display::{ListRender, print_toast, render_page};
use crate::error::{LedgerError, Result};
use crate::list::{ListSession, ListStatus, ViewConfig};

/// Apply the shared list arguments, load once and print the page.
///
/// Filters must already be set on `session`: they reset the page, so the
/// requested page is applied last.
pub(super) async fn show_list<T>(mut session: ListSession<T>, args: &ListArgs) -> Result<()>
where
    T: ListRender + Fetch + Serialize,
{
    if let Some(search) = &args.search {
        session.search(search).await;
    }
    if let Some(page_size) = args.page_size {
        session.set_page_size(page_size).await;
    }
    if let Some(page) = args.page {
        session.set_page(page).await;
    }
    session.mount().await;

    let snapshot = session.snapshot();
    if snapshot.status == ListStatus::Error {
        let message = snapshot
            .notification
            .map(|t| t.message)
            .or(snapshot.error)
            .unwrap_or_default();
        return Err(LedgerError::Other(message));
    }

    let Some(page) = snapshot.page else {
        return Ok(());
    };

    if args.json {
        return print_json(&page);
    }

    println!("{}", render_page(&page, snapshot.lookup.as_deref()));
    if let Some(toast) = &snapshot.notification {
        print_toast(toast);
    }
    Ok(())
}

pub async fn cmd_patients(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let view = ViewConfig::patients().with_settings(&ctx.config.views.patients);
    let session = ListSession::new(ctx.service.clone(), view);
    show_list(session, &args).await
}

pub async fn cmd_consents(ctx: &AppContext, status: Option<String>, args: ListArgs) -> Result<()> {
    let view = ViewConfig::consents().with_settings(&ctx.config.views.consents);
    let mut session = ListSession::new(ctx.service.clone(), view);
    if let Some(status) = status {
        session.set_filter("status", &status).await?;
    }
    show_list(session, &args).await
}

pub async fn cmd_transactions(
    ctx: &AppContext,
    tx_type: Option<String>,
    status: Option<String>,
    mine: bool,
    args: ListArgs,
) -> Result<()> {
    let view = ViewConfig::transactions().with_settings(&ctx.config.views.transactions);
    let mut session = ListSession::new(ctx.service.clone(), view);
    if mine {
        let account = ctx.wallet.require_account()?;
        session.set_filter("wallet", account).await?;
    }
    if let Some(tx_type) = tx_type {
        session.set_filter("type", &tx_type).await?;
    }
    if let Some(status) = status {
        session.set_filter("status", &status).await?;
    }
    show_list(session, &args).await
}
