//! Lifecycle customizations and engine-owned lifecycle state
//!
//! These cover what a plain create/read/update/delete cycle cannot express:
//! adopting an object that already exists, tolerating a missing object on
//! read, and leaving adopted objects in place on delete.

use serde::{Deserialize, Serialize};

/// Read-time option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadLifecycle {
    /// Report a zeroed record instead of failing when the object is missing
    pub ignore_error_if_not_exists: bool,
}

/// Create-time options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateLifecycle {
    /// Adopt a pre-existing object whose settings match the configuration
    pub import_if_exists: bool,
    /// Remove an adopted object on delete; only read when `imported` is set
    pub destroy_if_imported: bool,
}

/// The per-instance option set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleOptions {
    #[serde(flatten)]
    pub read: ReadLifecycle,
    #[serde(flatten)]
    pub create: CreateLifecycle,
}

impl LifecycleOptions {
    pub fn import_if_exists() -> Self {
        Self {
            create: CreateLifecycle {
                import_if_exists: true,
                destroy_if_imported: false,
            },
            ..Self::default()
        }
    }

    pub fn ignore_missing() -> Self {
        Self {
            read: ReadLifecycle {
                ignore_error_if_not_exists: true,
            },
            ..Self::default()
        }
    }

    pub fn with_destroy_if_imported(mut self, destroy: bool) -> Self {
        self.create.destroy_if_imported = destroy;
        self
    }
}

/// Computed lifecycle state, persisted with the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    /// Set by Read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    /// Set by Create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported: Option<bool>,
}

impl LifecycleState {
    pub fn is_imported(&self) -> bool {
        self.imported == Some(true)
    }
}
