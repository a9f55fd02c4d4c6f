mod macros;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod consent;
pub mod display;
pub mod error;
pub mod list;
pub mod notify;
pub mod selection;
pub mod types;
pub mod wallet;

pub use api::{CollectionKind, CollectionPage, CollectionRequest, DataService, Fetch};
pub use error::{LedgerError, Result};
pub use list::{ListController, ListEvent, ListSession, ListSnapshot, ListStatus, ViewConfig};
pub use wallet::{Signer, Wallet};
