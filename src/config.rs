//! Top-level application configuration.
//!
//! Configuration is stored in `config.yaml` under the platform config
//! directory (or at `$CARELEDGER_CONFIG`) and includes:
//! - Records API location, timeout and token
//! - Wallet account and signing command
//! - Per-view list settings (debounce interval, page size, fetch caps)

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::http::normalize_base;
use crate::error::{LedgerError, Result};
use crate::wallet::is_valid_address;

pub const CONFIG_ENV: &str = "CARELEDGER_CONFIG";
pub const API_URL_ENV: &str = "CARELEDGER_API_URL";
pub const API_TOKEN_ENV: &str = "CARELEDGER_API_TOKEN";
pub const WALLET_ACCOUNT_ENV: &str = "CARELEDGER_WALLET_ACCOUNT";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Records API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Wallet used for signing consents
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Per-view list settings
    #[serde(default)]
    pub views: ViewsConfig,
}

/// Records API connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_api_timeout")]
    pub timeout: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_api_timeout(),
            token: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Wallet settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Connected account address (`0x` + 40 hex digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Program and arguments that sign a message read from stdin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_command: Option<Vec<String>>,

    /// Seconds to wait for the signer before treating it as declined (default: 120)
    #[serde(default = "default_sign_timeout")]
    pub sign_timeout: u64,
}

fn default_sign_timeout() -> u64 {
    120
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            account: None,
            sign_command: None,
            sign_timeout: default_sign_timeout(),
        }
    }
}

/// Overrides for one list view; unset fields keep the view's built-in values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Cap on items fetched for views that page locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_limit: Option<usize>,
    /// Cap on patients fetched to resolve names in the consents view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default)]
    pub consents: ViewSettings,
    #[serde(default)]
    pub patients: ViewSettings,
    #[serde(default)]
    pub transactions: ViewSettings,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("org", "careledger", "careledger")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LedgerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the list views cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout == 0 {
            return Err(LedgerError::Config(
                "api.timeout must be at least one second".to_string(),
            ));
        }

        if let Some(account) = &self.wallet.account {
            check_account(account, "wallet.account")?;
        }

        if let Some(command) = &self.wallet.sign_command
            && command.is_empty()
        {
            return Err(LedgerError::Config(
                "wallet.sign_command must name a program".to_string(),
            ));
        }

        for (name, view) in [
            ("consents", &self.views.consents),
            ("patients", &self.views.patients),
            ("transactions", &self.views.transactions),
        ] {
            if view.page_size == Some(0) {
                return Err(LedgerError::Config(format!(
                    "views.{name}.page_size must be positive"
                )));
            }
            if view.fetch_limit == Some(0) {
                return Err(LedgerError::Config(format!(
                    "views.{name}.fetch_limit must be positive"
                )));
            }
            if view.lookup_limit == Some(0) {
                return Err(LedgerError::Config(format!(
                    "views.{name}.lookup_limit must be positive"
                )));
            }
        }

        Ok(())
    }

    /// API base URL from environment or config, with a trailing slash
    pub fn api_base_url(&self) -> Result<Url> {
        let raw = match env::var(API_URL_ENV) {
            Ok(url) if !url.is_empty() => url,
            _ => self.api.base_url.clone(),
        };
        Ok(normalize_base(Url::parse(&raw)?))
    }

    /// Get the API token from environment or config
    pub fn api_token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var(API_TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }

        self.api.token.clone().map(SecretString::from)
    }

    /// Get the connected wallet account from environment or config
    pub fn wallet_account(&self) -> Result<Option<String>> {
        if let Ok(account) = env::var(WALLET_ACCOUNT_ENV)
            && !account.is_empty()
        {
            check_account(&account, WALLET_ACCOUNT_ENV)?;
            return Ok(Some(account));
        }

        Ok(self.wallet.account.clone())
    }

    /// Get the signer timeout duration
    pub fn sign_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.wallet.sign_timeout)
    }

    /// Render the effective configuration with secrets redacted
    pub fn redacted_yaml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.api.token.is_some() || env::var(API_TOKEN_ENV).is_ok_and(|t| !t.is_empty()) {
            shown.api.token = Some("[REDACTED]".to_string());
        }
        if let Ok(url) = self.api_base_url() {
            shown.api.base_url = url.to_string();
        }
        shown.wallet.account = self.wallet_account()?;
        Ok(serde_yaml_ng::to_string(&shown)?)
    }
}

fn check_account(account: &str, source: &str) -> Result<()> {
    if is_valid_address(account) {
        Ok(())
    } else {
        Err(LedgerError::Config(format!(
            "{source} '{account}' is not a valid address"
        )))
    }
}
