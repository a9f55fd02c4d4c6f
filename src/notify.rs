//! Transient notifications.
//!
//! List views report fetch failures and mutation outcomes as toasts. A toast
//! never replaces the rendered list; it is shown next to it until dismissed
//! or expired.

use std::fmt;
use std::time::{Duration, Instant};

use owo_colors::OwoColorize;

/// How long a toast stays visible unless dismissed
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// One notification raised by a list view or mutation
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    /// Creation time, for expiry
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Success)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.timestamp) >= TOAST_DURATION
    }

    /// Message prefixed with a colored level marker, for terminal output
    pub fn render(&self) -> String {
        match self.level {
            ToastLevel::Info => format!("{} {}", "info:".cyan(), self.message),
            ToastLevel::Warning => format!("{} {}", "warning:".yellow(), self.message),
            ToastLevel::Error => format!("{} {}", "error:".red(), self.message),
            ToastLevel::Success => format!("{} {}", "ok:".green(), self.message),
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_level() {
        assert_eq!(Toast::error("x").level, ToastLevel::Error);
        assert_eq!(Toast::success("x").level, ToastLevel::Success);
        assert_eq!(Toast::warning("x").level, ToastLevel::Warning);
        assert_eq!(Toast::info("x").to_string(), "x");
    }

    #[test]
    fn test_expiry() {
        let toast = Toast::info("saved");
        assert!(!toast.is_expired(toast.timestamp));
        assert!(toast.is_expired(toast.timestamp + TOAST_DURATION));
    }

    #[test]
    fn test_render_keeps_message() {
        let toast = Toast::error("Failed to fetch consents");
        assert!(toast.render().contains("Failed to fetch consents"));
    }
}
