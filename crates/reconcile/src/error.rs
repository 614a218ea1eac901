//! Error taxonomy for reconciliation.
//!
//! Gateways classify raw command output into one of these errors. The
//! lifecycle policies may downgrade [`Error::NotFound`] and
//! [`Error::AlreadyExists`] when the matching option is set; everything else
//! reaches the caller unchanged.

use crate::field::{FieldChange, describe_changes};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Gateway operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Fetch => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "delete",
        };
        f.write_str(verb)
    }
}

/// Output captured from a failed command, kept for error reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Diagnostics {
    /// The most useful single line to show a user.
    pub fn summary(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        text.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
            .to_string()
    }
}

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The command layer could not run or returned unreadable output
    Transport,
    /// The natural key resolves to no remote object
    NotFound,
    /// Create found a pre-existing object
    AlreadyExists,
    /// Import found an object whose settings differ from the configuration
    ConfigMismatch,
    /// The desired record is invalid; nothing was sent to the host
    Validation,
}

impl ErrorCategory {
    /// Whether a lifecycle option can turn this error into a normal outcome.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound | Self::AlreadyExists)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "Host command failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::ConfigMismatch => "Configuration doesn't match existing resource",
            Self::Validation => "Invalid configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Transport => "Check the connection to the host and the captured output",
            Self::NotFound => "Verify the name, or set ignore_error_if_not_exists",
            Self::AlreadyExists => "Import the resource, or set import_if_exists",
            Self::ConfigMismatch => "Align the configuration with the existing resource",
            Self::Validation => "Fix the configuration and try again",
        }
    }
}

/// Errors that can occur while reconciling a resource.
#[derive(Debug, Error)]
pub enum Error {
    /// The command could not run, failed for an unrecognized reason, or
    /// produced output that could not be decoded
    #[error("cannot {operation} {kind} '{key}': {message}")]
    Transport {
        operation: Operation,
        kind: &'static str,
        key: String,
        message: String,
        diagnostics: Diagnostics,
    },

    #[error("cannot find {kind} '{key}'")]
    NotFound {
        kind: &'static str,
        key: String,
        diagnostics: Option<Diagnostics>,
    },

    #[error("{kind} '{key}' already exists")]
    AlreadyExists {
        kind: &'static str,
        key: String,
        diagnostics: Option<Diagnostics>,
    },

    #[error(
        "cannot import {kind} '{key}' when the configuration doesn't match the existing resource: {}",
        describe_changes(.changes)
    )]
    ConfigMismatch {
        kind: &'static str,
        key: String,
        changes: Vec<FieldChange>,
    },

    #[error("invalid {kind}: {message}")]
    Validation { kind: &'static str, message: String },
}

impl Error {
    pub fn validation(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
            diagnostics: None,
        }
    }

    pub fn already_exists(kind: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            key: key.into(),
            diagnostics: None,
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } => ErrorCategory::AlreadyExists,
            Error::ConfigMismatch { .. } => ErrorCategory::ConfigMismatch,
            Error::Validation { .. } => ErrorCategory::Validation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.category() == ErrorCategory::AlreadyExists
    }

    /// Attach captured command output to a not-found or already-exists
    /// error; other errors are returned unchanged.
    pub fn with_diagnostics(mut self, output: Diagnostics) -> Self {
        if let Error::NotFound { diagnostics, .. } | Error::AlreadyExists { diagnostics, .. } =
            &mut self
        {
            *diagnostics = Some(output);
        }
        self
    }

    /// Captured command output, when the error came from the host.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Transport { diagnostics, .. } => Some(diagnostics),
            Error::NotFound { diagnostics, .. } | Error::AlreadyExists { diagnostics, .. } => {
                diagnostics.as_ref()
            }
            _ => None,
        }
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;
