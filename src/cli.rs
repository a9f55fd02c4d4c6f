use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::list::ALL;
use crate::types::{
    ConsentStatus, PAGE_SIZE_OPTIONS, VALID_CONSENT_STATUSES, VALID_TRANSACTION_STATUSES,
};

#[derive(Parser)]
#[command(name = "careledger")]
#[command(about = "Browse patients, consents and ledger transactions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(short, long, value_parser = parse_positive)]
    pub page: Option<usize>,

    /// Items per page: 5, 10 or 20 (default: 10)
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List patients
    #[command(visible_alias = "p")]
    Patients {
        #[command(flatten)]
        list: ListArgs,
    },

    /// List consents
    #[command(visible_alias = "c")]
    Consents {
        /// Status: pending, active, revoked or all
        #[arg(long, value_parser = parse_consent_filter)]
        status: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },

    /// List ledger transactions
    #[command(visible_alias = "tx")]
    Transactions {
        /// Transaction type, e.g. consent_approval or data_access
        #[arg(short = 't', long = "type")]
        tx_type: Option<String>,

        /// Status: pending, confirmed, failed or all
        #[arg(long, value_parser = parse_transaction_filter)]
        status: Option<String>,

        /// Only transactions of the connected wallet
        #[arg(long)]
        mine: bool,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show a patient with their medical records
    Patient {
        /// Patient record id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect and change consents
    Consent {
        #[command(subcommand)]
        action: ConsentAction,
    },

    /// Show platform totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow a list interactively; each stdin line is the current search
    /// input, lines starting with ':' are commands (:help lists them)
    Watch {
        view: WatchView,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConsentAction {
    /// Show a consent with its patient and records
    Show {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign and create a consent with the configured wallet
    Create {
        /// Patient record id, or text to search patients by
        #[arg(long)]
        patient: String,

        /// Purpose of the consent
        #[arg(long)]
        purpose: String,
    },

    /// Change a consent's status
    SetStatus {
        id: String,

        /// New status: pending, active, revoked
        #[arg(value_parser = parse_consent_status)]
        status: ConsentStatus,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchView {
    Patients,
    Consents,
    Transactions,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{s}' is not a positive number")),
    }
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if PAGE_SIZE_OPTIONS.contains(&n) => Ok(n),
        _ => {
            let options: Vec<String> = PAGE_SIZE_OPTIONS.iter().map(usize::to_string).collect();
            Err(format!("page size must be one of: {}", options.join(", ")))
        }
    }
}

fn parse_filter(s: &str, valid: &[&str]) -> Result<String, String> {
    let value = s.to_lowercase();
    if value == ALL || valid.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(format!(
            "invalid status '{s}'. Must be one of: {}, {ALL}",
            valid.join(", ")
        ))
    }
}

fn parse_consent_filter(s: &str) -> Result<String, String> {
    parse_filter(s, VALID_CONSENT_STATUSES)
}

fn parse_transaction_filter(s: &str) -> Result<String, String> {
    parse_filter(s, VALID_TRANSACTION_STATUSES)
}

fn parse_consent_status(s: &str) -> Result<ConsentStatus, String> {
    s.parse().map_err(|_| {
        format!(
            "invalid status '{s}'. Must be one of: {}",
            VALID_CONSENT_STATUSES.join(", ")
        )
    })
}
