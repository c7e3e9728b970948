use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    Network,
    Timeout,
    Validation,
    Unknown,
}

/// Failure of a single use-case invocation. Carries the kind the presentation
/// layer maps from and the original diagnostic for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct AppError {
    pub kind: FailureKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Io, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    /// Classifies a free-form diagnostic coming out of a data source.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let kind = if lower.contains("timeout") || lower.contains("timed out") {
            FailureKind::Timeout
        } else if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("offline")
            || lower.contains("unreachable")
        {
            FailureKind::Network
        } else if lower.contains("invalid")
            || lower.contains("malformed")
            || lower.contains("missing")
        {
            FailureKind::Validation
        } else if lower.contains("i/o") || lower.contains("io error") {
            FailureKind::Io
        } else {
            FailureKind::Unknown
        };

        Self { kind, message }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::TimedOut => Self::new(FailureKind::Timeout, value.to_string()),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected => {
                Self::new(FailureKind::Network, value.to_string())
            }
            _ => Self::io(value.to_string()),
        }
    }
}
