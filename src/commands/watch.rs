//! `watch`: an interactive list driven from stdin.
//!
//! Every plain line replaces the search input, which settles after the
//! view's debounce interval. Lines starting with `:` are commands. The view
//! is redrawn whenever its snapshot changes.

use std::time::Instant;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use super::AppContext;
use crate::api::Fetch;
use crate::cli::WatchView;
use crate::display::{ListRender, render_page};
use crate::error::{LedgerError, Result};
use crate::list::{EVENT_CHANNEL_CAPACITY, ListEvent, ListSession, ListSnapshot, ListStatus, ViewConfig};

const HELP: &str = "\
commands:
  <text>              search (applied after typing pauses)
  :next, :n           next page
  :prev, :p           previous page
  :page N             go to page N
  :size N             show N items per page
  :filter DIM VALUE   filter by a dimension, e.g. :filter status active
  :clear DIM          remove a filter
  :refresh, :r        reload
  :dismiss            hide the notification
  :help               this text
  :quit, :q           exit";

/// A parsed line of watch input
#[derive(Debug)]
pub enum WatchCommand {
    Event(ListEvent),
    Help,
    Quit,
}

fn parse_number(arg: Option<&str>, what: &str) -> std::result::Result<usize, String> {
    match arg.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => Ok(n),
        _ => Err(format!(":{what} needs a positive number")),
    }
}

/// Parse one line of watch input
pub fn parse_watch_line(line: &str) -> std::result::Result<WatchCommand, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(WatchCommand::Event(ListEvent::Input(line.to_string())));
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let event = match name {
        "next" | "n" => ListEvent::NextPage,
        "prev" | "p" => ListEvent::PreviousPage,
        "page" => ListEvent::SetPage(parse_number(words.next(), "page")?),
        "size" => ListEvent::SetPageSize(parse_number(words.next(), "size")?),
        "filter" => match (words.next(), words.next()) {
            (Some(dimension), Some(value)) => ListEvent::SetFilter {
                dimension: dimension.to_string(),
                value: value.to_string(),
            },
            _ => return Err(":filter needs a dimension and a value".to_string()),
        },
        "clear" => match words.next() {
            Some(dimension) => ListEvent::ClearFilter(dimension.to_string()),
            None => return Err(":clear needs a dimension".to_string()),
        },
        "refresh" | "r" => ListEvent::Refresh,
        "dismiss" => ListEvent::DismissNotification,
        "help" => return Ok(WatchCommand::Help),
        "quit" | "q" => return Ok(WatchCommand::Quit),
        other => return Err(format!("unknown command ':{other}' (try :help)")),
    };
    Ok(WatchCommand::Event(event))
}

fn status_line<T>(snapshot: &ListSnapshot<T>) -> String {
    let query = &snapshot.query;
    let mut parts = Vec::new();
    if !query.search_term().is_empty() {
        parts.push(format!("search \"{}\"", query.search_term()));
    }
    for (dimension, value) in query.filters().active() {
        parts.push(format!("{dimension}={value}"));
    }
    if snapshot.search_pending {
        parts.push("typing...".to_string());
    }
    match snapshot.status {
        ListStatus::Loading => parts.push("loading...".to_string()),
        ListStatus::Refreshing => parts.push("refreshing...".to_string()),
        _ => {}
    }
    parts.join("  ").dimmed().to_string()
}

fn render_snapshot<T: ListRender>(snapshot: &ListSnapshot<T>, now: Instant) -> String {
    let mut text = status_line(snapshot);
    text.push('\n');
    match &snapshot.page {
        Some(page) => text.push_str(&render_page(page, snapshot.lookup.as_deref())),
        None if snapshot.status == ListStatus::Error => {}
        None => text.push_str(&"Loading...".dimmed().to_string()),
    }
    if let Some(toast) = snapshot.notification.as_ref().filter(|t| !t.is_expired(now)) {
        text.push('\n');
        text.push_str(&toast.render());
    }
    text
}

/// Redraw on every snapshot change that alters the output
async fn print_snapshots<T: ListRender>(mut snapshots: watch::Receiver<ListSnapshot<T>>) {
    let mut last = String::new();
    while snapshots.changed().await.is_ok() {
        let rendered = render_snapshot(&snapshots.borrow_and_update(), Instant::now());
        if rendered != last {
            println!("\n{rendered}");
            last = rendered;
        }
    }
}

async fn watch_view<T>(session: ListSession<T>) -> Result<()>
where
    T: ListRender + Fetch,
{
    let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (snapshots, snapshot_rx) = watch::channel(session.snapshot());

    let printer = tokio::spawn(print_snapshots(snapshot_rx));
    let driver = tokio::spawn(session.run(receiver, snapshots));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match parse_watch_line(line.trim_end()) {
            Ok(WatchCommand::Event(event)) => event,
            Ok(WatchCommand::Help) => {
                eprintln!("{HELP}");
                continue;
            }
            Ok(WatchCommand::Quit) => break,
            Err(message) => {
                eprintln!("{}", message.yellow());
                continue;
            }
        };
        if events.send(event).await.is_err() {
            break;
        }
    }

    // ignore a closed channel: the driver has already stopped
    let _ = events.send(ListEvent::Close).await;
    drop(events);
    let controller = driver
        .await
        .map_err(|e| LedgerError::Other(format!("watch loop failed: {e}")))?;
    printer
        .await
        .map_err(|e| LedgerError::Other(format!("watch output failed: {e}")))?;
    tracing::debug!(closed = controller.is_closed(), "watch finished");
    Ok(())
}

pub async fn cmd_watch(ctx: &AppContext, view: WatchView) -> Result<()> {
    let service = ctx.service.clone();
    let views = &ctx.config.views;
    match view {
        WatchView::Patients => {
            let view = ViewConfig::patients().with_settings(&views.patients);
            watch_view(ListSession::new(service, view)).await
        }
        WatchView::Consents => {
            let view = ViewConfig::consents().with_settings(&views.consents);
            watch_view(ListSession::new(service, view)).await
        }
        WatchView::Transactions => {
            let view = ViewConfig::transactions().with_settings(&views.transactions);
            watch_view(ListSession::new(service, view)).await
        }
    }
}
