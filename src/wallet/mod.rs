//! Wallet connectivity.
//!
//! Consent creation needs a connected account and a signer. Both are
//! optional at runtime; operations that need them fail with
//! [`LedgerError::NoWallet`] before anything is sent to the backend.

pub mod command;

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::Config;
use crate::error::{LedgerError, Result};

pub use command::CommandSigner;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address regex should be valid")
});

/// Check that a string looks like a `0x`-prefixed 20-byte hex address
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// Signs free-form messages on behalf of the connected account
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    async fn sign_message(&self, message: &str) -> Result<String>;
}

/// The connected account and its signer, either of which may be absent
#[derive(Clone, Default)]
pub struct Wallet {
    account: Option<String>,
    signer: Option<Arc<dyn Signer>>,
}

impl Wallet {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(account: impl Into<String>, signer: Arc<dyn Signer>) -> Self {
        Self {
            account: Some(account.into()),
            signer: Some(signer),
        }
    }

    /// Account only; listing by wallet works, signing does not
    pub fn watch_only(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            signer: None,
        }
    }

    /// Build from configuration: account from `wallet.account`, signer from
    /// `wallet.sign_command`. An invalid account is a configuration error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let account = config.wallet_account()?;
        let signer = config.wallet.sign_command.as_ref().and_then(|command| {
            CommandSigner::new(command.clone(), config.sign_timeout())
                .map(|s| Arc::new(s) as Arc<dyn Signer>)
        });
        Ok(Self { account, signer })
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some() && self.signer.is_some()
    }

    /// The account, or `NoWallet` when none is connected
    pub fn require_account(&self) -> Result<&str> {
        self.account.as_deref().ok_or(LedgerError::NoWallet)
    }

    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let signer = self.signer.as_ref().ok_or(LedgerError::NoWallet)?;
        signer.sign_message(message).await
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}
