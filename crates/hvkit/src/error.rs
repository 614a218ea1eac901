//! Error types for host access.
//!
//! Scripts report missing objects and create collisions by throwing
//! messages prefixed with [`NOT_FOUND_MARKER`] or [`ALREADY_EXISTS_MARKER`].
//! Cmdlet errors are free text and never carry these prefixes, so a
//! `Cannot find the network adapter` from `New-VMSwitch` stays a transport
//! failure. The classifier reads the markers from the captured output so
//! gateways can hand the reconciliation engine a proper [`reconcile::Error`].

use reconcile::{Diagnostics, ErrorCategory, Operation};
use thiserror::Error;

/// Marker thrown by scripts when the requested object does not exist.
pub const NOT_FOUND_MARKER: &str = "HVKIT_NOT_FOUND:";

/// Marker thrown by scripts when a create collides with an existing object.
pub const ALREADY_EXISTS_MARKER: &str = "HVKIT_ALREADY_EXISTS:";

/// Errors that can occur while talking to a Hyper-V host.
#[derive(Debug, Error)]
pub enum Error {
    /// The executor process could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The SSH client could not reach or authenticate with the host
    #[error("ssh connection to {host} failed: {}", .diagnostics.summary())]
    Connection {
        /// Host that was contacted
        host: String,
        /// Output captured from the ssh client
        diagnostics: Diagnostics,
    },

    /// A script ran and exited with a failure
    #[error("script {script} failed: {}", .diagnostics.summary())]
    Script {
        /// Name of the script template
        script: &'static str,
        /// Output captured from the script
        diagnostics: Diagnostics,
    },

    /// A script template could not be compiled or rendered
    #[error("cannot render script {script}: {message}")]
    Template {
        /// Name of the script template
        script: &'static str,
        /// Renderer message
        message: String,
    },

    /// A script succeeded but its stdout is not the expected JSON document
    #[error("cannot decode output of script {script}: {source}")]
    Decode {
        /// Name of the script template
        script: &'static str,
        /// JSON error
        source: serde_json::Error,
        /// Raw stdout, kept for diagnostics
        stdout: String,
    },

    /// Script arguments could not be encoded
    #[error("cannot encode arguments: {0}")]
    Encode(#[from] serde_json::Error),

    /// A lookup query does not populate any key
    #[error("invalid {kind} query: {message}")]
    InvalidQuery {
        /// Object kind being queried
        kind: &'static str,
        /// What is wrong with the query
        message: String,
    },

    /// IO error while talking to the executor process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error into the reconciliation taxonomy.
    ///
    /// Only script failures can be [`ErrorCategory::NotFound`] or
    /// [`ErrorCategory::AlreadyExists`]; everything else is a transport
    /// problem, except for invalid queries which never reached the host.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Script { diagnostics, .. } => classify_output(diagnostics),
            Error::InvalidQuery { .. } => ErrorCategory::Validation,
            _ => ErrorCategory::Transport,
        }
    }

    /// Captured process output, when there is any.
    pub fn diagnostics(&self) -> Option<Diagnostics> {
        match self {
            Error::Script { diagnostics, .. } | Error::Connection { diagnostics, .. } => {
                Some(diagnostics.clone())
            }
            Error::Decode { stdout, .. } => Some(Diagnostics {
                exit_code: Some(0),
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            _ => None,
        }
    }

    /// Convert into a [`reconcile::Error`] carrying kind, key and operation.
    pub fn into_reconcile(
        self,
        operation: Operation,
        kind: &'static str,
        key: impl Into<String>,
    ) -> reconcile::Error {
        let key = key.into();
        match self.category() {
            ErrorCategory::NotFound => {
                let err = reconcile::Error::not_found(kind, key);
                match self.diagnostics() {
                    Some(diagnostics) => err.with_diagnostics(diagnostics),
                    None => err,
                }
            }
            ErrorCategory::AlreadyExists => {
                let err = reconcile::Error::already_exists(kind, key);
                match self.diagnostics() {
                    Some(diagnostics) => err.with_diagnostics(diagnostics),
                    None => err,
                }
            }
            ErrorCategory::Validation => reconcile::Error::Validation {
                kind,
                message: self.to_string(),
            },
            ErrorCategory::Transport | ErrorCategory::ConfigMismatch => {
                let diagnostics = self.diagnostics().unwrap_or_default();
                log::debug!(
                    "{operation} {kind} '{key}' failed (exit code {:?})\nstdout: {}\nstderr: {}",
                    diagnostics.exit_code,
                    diagnostics.stdout.trim(),
                    diagnostics.stderr.trim()
                );
                reconcile::Error::Transport {
                    operation,
                    kind,
                    key,
                    message: self.to_string(),
                    diagnostics,
                }
            }
        }
    }
}

/// Analyze script output for the not-found and already-exists markers.
///
/// Markers are matched exactly; cmdlet text in any casing is ignored.
pub fn classify_output(diagnostics: &Diagnostics) -> ErrorCategory {
    let text = format!("{}\n{}", diagnostics.stderr, diagnostics.stdout);

    if text.contains(NOT_FOUND_MARKER) {
        ErrorCategory::NotFound
    } else if text.contains(ALREADY_EXISTS_MARKER) {
        ErrorCategory::AlreadyExists
    } else {
        ErrorCategory::Transport
    }
}

/// Result type for host access.
pub type Result<T> = std::result::Result<T, Error>;
