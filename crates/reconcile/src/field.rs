//! Field-level diff between two records of the same kind
//!
//! Resources describe their records as a flat list of [`Field`]s. The diff
//! is the same one used by Update and by the import match on Create, so a
//! difference that does not trigger an Update can never fail an import
//! either.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

/// How two values of a field are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Exact,
    /// The host treats the field case-insensitively
    IgnoreCase,
}

/// What a field means to the reconciliation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Part of the natural key
    Key,
    /// Regular setting; a divergence blocks an import
    Setting,
    /// Descriptive text that an import may overwrite
    FreeText,
}

/// A named field of a record.
///
/// `value` is `None` for a computed field the configuration left unset; such
/// a field never produces a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: Option<FieldValue>,
    pub compare: Compare,
    pub role: FieldRole,
}

impl Field {
    pub fn key(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            compare: Compare::Exact,
            role: FieldRole::Key,
        }
    }

    pub fn setting<V: Into<FieldValue>>(name: &'static str, value: Option<V>) -> Self {
        Self {
            name,
            value: value.map(Into::into),
            compare: Compare::Exact,
            role: FieldRole::Setting,
        }
    }

    pub fn free_text(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            compare: Compare::Exact,
            role: FieldRole::FreeText,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.compare = Compare::IgnoreCase;
        self
    }
}

/// A single field that differs between current and desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub role: FieldRole,
    pub from: Option<FieldValue>,
    pub to: Option<FieldValue>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<FieldValue>| match v {
            Some(v) => v.to_string(),
            None => "(unset)".to_string(),
        };
        write!(f, "{}: {} -> {}", self.field, show(&self.from), show(&self.to))
    }
}

/// Render changes as one line, for error messages.
pub fn describe_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn equivalent(a: &FieldValue, b: &FieldValue, compare: Compare) -> bool {
    match (a, b, compare) {
        (FieldValue::Text(a), FieldValue::Text(b), Compare::IgnoreCase) => {
            a.to_lowercase() == b.to_lowercase()
        }
        _ => a == b,
    }
}

/// Compute the changes needed to go from `current` to `desired`.
///
/// Fields are matched by name. A desired field without a value is computed
/// and accepts whatever the host reports.
pub fn diff(current: &[Field], desired: &[Field]) -> Vec<FieldChange> {
    desired
        .iter()
        .filter_map(|want| {
            let to = want.value.as_ref()?;
            let from = current
                .iter()
                .find(|f| f.name == want.name)
                .and_then(|f| f.value.as_ref());

            match from {
                Some(from) if equivalent(from, to, want.compare) => None,
                _ => Some(FieldChange {
                    field: want.name.to_string(),
                    role: want.role,
                    from: from.cloned(),
                    to: Some(to.clone()),
                }),
            }
        })
        .collect()
}

/// Split changes into free-text changes and everything else.
pub fn split_free_text(changes: Vec<FieldChange>) -> (Vec<FieldChange>, Vec<FieldChange>) {
    changes
        .into_iter()
        .partition(|c| c.role == FieldRole::FreeText)
}
