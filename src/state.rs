use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::{Applied, Instance, ResourceIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource::VSwitchConfig;

// ============================================================================
// State Structures
// ============================================================================

/// Managed instances, keyed by resource identity
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HvctlState {
    /// Virtual switches under management
    #[serde(default)]
    pub vswitches: BTreeMap<ResourceIdentity, Instance<VSwitchConfig>>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

impl Default for HvctlState {
    fn default() -> Self {
        Self {
            vswitches: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

// ============================================================================
// HvctlState Implementation
// ============================================================================

/// State loaded from a file, remembering where it came from.
#[derive(Debug)]
pub struct StateFile {
    pub path: PathBuf,
    pub state: HvctlState,
}

impl StateFile {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, using default state", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                state: HvctlState::default(),
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: HvctlState = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    /// Save state to disk
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            toml::to_string_pretty(&self.state).context("Failed to serialize state to TOML")?;

        fs::write(&self.path, &content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self) -> Result<()> {
        self.state.last_updated = Utc::now();
        self.save()
    }
}

impl HvctlState {
    /// Switches tracked on `host`.
    pub fn vswitches_on(&self, host: &str) -> BTreeMap<ResourceIdentity, Instance<VSwitchConfig>> {
        self.vswitches
            .iter()
            .filter(|(id, _)| id.parts().is_some_and(|(h, _, _)| h == host))
            .map(|(id, instance)| (id.clone(), instance.clone()))
            .collect()
    }

    /// Identity under which `id` is tracked. Switch names are compared
    /// without regard to case, as the host does.
    pub fn tracked_id(&self, id: &ResourceIdentity) -> Option<ResourceIdentity> {
        if self.vswitches.contains_key(id) {
            return Some(id.clone());
        }
        let folded = id.fold_case();
        self.vswitches
            .keys()
            .find(|tracked| tracked.fold_case() == folded)
            .cloned()
    }

    /// Track an instance under its identity; an unmanaged instance is
    /// dropped instead.
    pub fn track(&mut self, instance: Instance<VSwitchConfig>) -> Option<ResourceIdentity> {
        let id = instance.id.clone()?;
        self.vswitches.insert(id.clone(), instance);
        Some(id)
    }

    /// Record the outcome of one applied action. An instance created again
    /// under a new identity replaces the entry it came from.
    pub fn record(&mut self, applied: Applied<VSwitchConfig>) {
        match applied.instance {
            Some(instance) => {
                let id = instance.id.clone().unwrap_or_else(|| applied.identity.clone());
                if id != applied.identity {
                    self.vswitches.remove(&applied.identity);
                }
                self.vswitches.insert(id, instance);
            }
            None => {
                self.vswitches.remove(&applied.identity);
            }
        }
    }

    /// Stop tracking an identity without touching the host.
    pub fn forget(&mut self, identity: &ResourceIdentity) -> Option<Instance<VSwitchConfig>> {
        self.vswitches.remove(identity)
    }
}

// ============================================================================
// Tests
// ============================================================================
