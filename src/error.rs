use thiserror::Error;

use crate::api::CollectionKind;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: CollectionKind, id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("signature request rejected: {0}")]
    UserRejected(String),

    #[error("no wallet connected")]
    NoWallet,

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid value '{value}' for filter '{dimension}'")]
    InvalidFilter { dimension: String, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl LedgerError {
    /// Whether this failure came from the network or backend rather than the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transport(_) | LedgerError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
