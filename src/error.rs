//! Error types.
//!
//! `ApiError` covers everything the library surfaces to callers. `RemoteError`
//! is the single normalized shape for failures reported by a managed instance
//! or by the transport underneath it; response bodies are inspected once, here,
//! and never ad hoc by callers.

use crate::deploy::request::ExistingProcessGroup;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Library error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid orchestrator state: {0}")]
    InvalidState(String),

    #[error("Invalid conflict resolution: {0}")]
    InvalidResolution(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

/// Category of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// A process group with the requested name already exists under the parent
    Conflict,
    /// The endpoint answered with a failure status
    Remote,
    /// Network, TLS, timeout or authentication failure before a usable answer
    Transport,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RemoteErrorKind::Conflict => "conflict",
            RemoteErrorKind::Remote => "remote",
            RemoteErrorKind::Transport => "transport",
        };
        f.write_str(label)
    }
}

/// Normalized remote failure: kind, message and optional structured detail
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl RemoteError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Remote,
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    /// Build a conflict error carrying the existing process group.
    pub fn conflict(message: impl Into<String>, existing: &ExistingProcessGroup) -> Self {
        let message = message.into();
        let detail = serde_json::json!({
            "message": message,
            "existing_process_group": existing,
        });
        Self {
            kind: RemoteErrorKind::Conflict,
            message,
            status: Some(409),
            detail: Some(detail),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == RemoteErrorKind::Conflict
    }

    /// The existing process group reported by a conflict, if any.
    pub fn existing_process_group(&self) -> Option<ExistingProcessGroup> {
        if !self.is_conflict() {
            return None;
        }
        let detail = self.detail.as_ref()?;
        let existing = detail.get("existing_process_group")?;
        serde_json::from_value(existing.clone()).ok()
    }

    /// Normalize an HTTP failure response.
    ///
    /// A 409 is only a conflict when the body carries
    /// `detail.existing_process_group`; any other 409 is a plain remote failure.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let detail = parsed.as_ref().and_then(|v| v.get("detail")).cloned();
        let message = parsed
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        let is_conflict = status == 409
            && detail
                .as_ref()
                .map(|d| d.get("existing_process_group").is_some())
                .unwrap_or(false);

        Self {
            kind: if is_conflict {
                RemoteErrorKind::Conflict
            } else {
                RemoteErrorKind::Remote
            },
            message,
            status: Some(status),
            detail,
        }
    }
}

/// Pull a human message out of the differently shaped error bodies the API emits:
/// `{"detail": "..."}`, `{"detail": {"message": ...}}`, `{"detail": {"error": ...}}`
/// or a top-level `message`/`error`.
fn extract_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(map)) => {
            for key in ["message", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }
        }
        _ => {}
    }
    for key in ["message", "error"] {
        if let Some(Value::String(s)) = body.get(key) {
            return Some(s.clone());
        }
    }
    None
}
