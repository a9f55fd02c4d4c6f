//! Conversion of backend failures into ledger errors.
//!
//! The records API answers failures with a status code and, usually, a JSON
//! body carrying an `error` or `message` field. This module turns that pair
//! into the dashboard's error taxonomy.

use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::api::CollectionKind;
use crate::error::LedgerError;

/// Failure reported by the records API
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if a response arrived at all
    pub status: Option<StatusCode>,
    /// Human-readable error message
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build from a non-success response body, preferring the API's own message.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });
        Self::with_status(message, status)
    }

    /// Server errors and rate limiting may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self.status {
            Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            None => true,
        }
    }

    /// Map into the taxonomy. `target` names the entity when the request
    /// addressed a single item, which turns a 404 into `NotFound`.
    pub fn into_ledger_error(self, target: Option<(CollectionKind, &str)>) -> LedgerError {
        match (self.status, target) {
            (Some(StatusCode::NOT_FOUND), Some((kind, id))) => LedgerError::NotFound {
                kind,
                id: id.to_string(),
            },
            (Some(StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY), _) => {
                LedgerError::Validation(self.message)
            }
            (Some(status), _) => {
                LedgerError::Transport(format!("HTTP {}: {}", status.as_u16(), self.message))
            }
            (None, _) => LedgerError::Transport(self.message),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for LedgerError {
    fn from(error: ApiError) -> Self {
        error.into_ledger_error(None)
    }
}
