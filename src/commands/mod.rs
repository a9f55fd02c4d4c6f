mod config;
mod consent;
mod detail;
mod list;
mod stats;
mod watch;

pub use config::cmd_config_show;
pub use consent::{cmd_consent_create, cmd_consent_set_status};
pub use detail::{cmd_consent_show, cmd_patient_show};
pub use list::{cmd_consents, cmd_patients, cmd_transactions};
pub use stats::cmd_stats;
pub use watch::{WatchCommand, cmd_watch, parse_watch_line};

use std::sync::Arc;

use serde::Serialize;

use crate::api::{DataService, HttpDataService};
use crate::config::Config;
use crate::error::Result;
use crate::wallet::Wallet;

/// Everything a command needs to talk to the backend and the wallet
pub struct AppContext {
    pub config: Config,
    pub service: Arc<dyn DataService>,
    pub wallet: Wallet,
}

impl AppContext {
    pub fn new(config: Config, service: Arc<dyn DataService>, wallet: Wallet) -> Self {
        Self {
            config,
            service,
            wallet,
        }
    }

    /// HTTP service and wallet as configured
    pub fn from_config(config: Config) -> Result<Self> {
        let service: Arc<dyn DataService> = Arc::new(HttpDataService::from_config(&config)?);
        let wallet = Wallet::from_config(&config)?;
        Ok(Self::new(config, service, wallet))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
