//! Resource identities
//!
//! An identity is derived from the host, the kind's collection name and the
//! natural key, so the same declared instance always maps to the same
//! identity: `//hv01/vswitches/br0`, or `//hv01/management_os` for a
//! singleton kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identity of one managed instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentity(String);

impl ResourceIdentity {
    /// Build the identity for a natural key. `segment` is `None` for
    /// singleton kinds.
    pub fn new(host: &str, collection: &str, segment: Option<&str>) -> Self {
        match segment {
            Some(key) => Self(format!("//{host}/{collection}/{key}")),
            None => Self(format!("//{host}/{collection}")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into host, collection and key segment.
    ///
    /// The key segment may itself contain `/`; everything after the
    /// collection belongs to it.
    pub fn parts(&self) -> Option<(&str, &str, Option<&str>)> {
        let rest = self.0.strip_prefix("//")?;
        let (host, rest) = rest.split_once('/')?;
        match rest.split_once('/') {
            Some((collection, key)) => Some((host, collection, Some(key))),
            None => Some((host, rest, None)),
        }
    }

    pub fn collection(&self) -> Option<&str> {
        self.parts().map(|(_, c, _)| c)
    }

    /// The same identity with its key segment lower-cased, for kinds whose
    /// keys the host compares case-insensitively.
    pub fn fold_case(&self) -> Self {
        match self.parts() {
            Some((host, collection, Some(key))) => {
                Self::new(host, collection, Some(&key.to_lowercase()))
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}
