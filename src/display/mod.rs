use owo_colors::OwoColorize;

use crate::notify::Toast;
use crate::types::ConsentStatus;

pub mod formatters;
pub mod tables;

pub use formatters::*;
pub use tables::*;

pub fn format_consent_status_colored(status: ConsentStatus) -> String {
    let badge = format!("[{status}]");
    match status {
        ConsentStatus::Pending => badge.yellow().to_string(),
        ConsentStatus::Active => badge.green().to_string(),
        ConsentStatus::Revoked => badge.red().to_string(),
    }
}

/// Print a notification to stderr so it never mixes with list output
pub fn print_toast(toast: &Toast) {
    eprintln!("{}", toast.render());
}
