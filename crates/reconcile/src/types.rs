//! Core types for resource reconciliation

use crate::field::FieldChange;
use crate::identity::ResourceIdentity;
use crate::lifecycle::{LifecycleOptions, LifecycleState};
use serde::{Deserialize, Serialize};

/// One managed instance, as persisted by the caller.
///
/// `record` holds the declared configuration until the first successful
/// Read, and the observed configuration afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance<D> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceIdentity>,
    pub record: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleOptions>,
    #[serde(default)]
    pub state: LifecycleState,
}

impl<D> Instance<D> {
    /// A declared instance that has not been reconciled yet.
    pub fn declared(record: D, lifecycle: Option<LifecycleOptions>) -> Self {
        Self {
            id: None,
            record,
            lifecycle,
            state: LifecycleState::default(),
        }
    }

    pub fn is_managed(&self) -> bool {
        self.id.is_some()
    }

    /// Options in effect; an unset option set behaves like all defaults.
    pub fn options(&self) -> LifecycleOptions {
        self.lifecycle.unwrap_or_default()
    }
}

/// Result of a data-source lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceIdentity>,
    pub record: T,
    pub exists: bool,
}

/// How a Create ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The object was created on the host
    Created,
    /// A matching object already existed and was adopted; `reconciled`
    /// lists the free-text fields updated while adopting it
    Imported { reconciled: Vec<FieldChange> },
}

/// How a Read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The record was refreshed from the host
    Found,
    /// The object is missing and `ignore_error_if_not_exists` zeroed the record
    Absent,
    /// The object is missing; the identity was cleared
    NotFound,
}

/// How an Update ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Only lifecycle bookkeeping changed; nothing was sent to the host
    Unchanged,
    /// The listed changes were applied
    Applied(Vec<FieldChange>),
}

/// How a Delete ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    /// Remove reported the object missing; treated as converged
    AlreadyGone,
    /// The object was imported and `destroy_if_imported` is off; only the
    /// local identity was dropped
    Forgotten,
}

/// Result of applying one planned action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Pre-existing resource was adopted
    Imported,
    /// Resource was modified
    Modified,
    /// Resource was removed (or was already gone)
    Removed,
    /// Resource left local bookkeeping without touching the host
    Forgotten,
    /// Apply failed
    Failed { error: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange | Self::Failed { .. })
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub imported: usize,
    pub modified: usize,
    pub removed: usize,
    pub forgotten: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.imported + self.modified + self.removed + self.forgotten
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Imported => self.imported += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Forgotten => self.forgotten += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Number of instances reconciled concurrently
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}
