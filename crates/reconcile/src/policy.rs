//! Lifecycle policy evaluator
//!
//! Pure decisions taken from the lifecycle options and the outcome of one
//! gateway call. The engine performs whatever the decision asks for; nothing
//! here talks to a host.

use crate::error::{Error, Result};
use crate::field::{FieldChange, split_free_text};
use crate::lifecycle::{CreateLifecycle, LifecycleState, ReadLifecycle};
use crate::types::DeleteOutcome;

/// What a Fetch result means for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadDecision<T> {
    Present(T),
    /// Missing, tolerated by `ignore_error_if_not_exists`
    Zeroed,
}

/// Read policy.
pub fn on_fetch<T>(result: Result<T>, lifecycle: ReadLifecycle) -> Result<ReadDecision<T>> {
    match result {
        Ok(record) => Ok(ReadDecision::Present(record)),
        Err(err) if err.is_not_found() && lifecycle.ignore_error_if_not_exists => {
            log::info!("{err}; ignore_error_if_not_exists is set, reporting a zeroed record");
            Ok(ReadDecision::Zeroed)
        }
        Err(err) => Err(err),
    }
}

/// What a create Apply result means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDecision {
    Created,
    /// The object already exists and `import_if_exists` allows adopting it
    /// once it matches the configuration
    Adopt,
}

/// Create policy, first half: classify the Apply result.
pub fn on_create(result: Result<()>, lifecycle: CreateLifecycle) -> Result<CreateDecision> {
    match result {
        Ok(()) => Ok(CreateDecision::Created),
        Err(err) if err.is_already_exists() && lifecycle.import_if_exists => {
            log::info!("{err}; import_if_exists is set, comparing before adopting");
            Ok(CreateDecision::Adopt)
        }
        Err(err) => Err(err),
    }
}

/// Outcome of comparing an existing object with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDecision {
    Matches,
    /// Only free-text fields differ; they are overwritten with one Update
    ReconcileFreeText(Vec<FieldChange>),
}

/// Create policy, second half: decide whether an existing object may be
/// adopted. `changes` is the Update diff from the observed record to the
/// desired one.
pub fn on_import_match(
    kind: &'static str,
    key: &str,
    changes: Vec<FieldChange>,
) -> Result<ImportDecision> {
    let (free_text, other) = split_free_text(changes);
    if !other.is_empty() {
        return Err(Error::ConfigMismatch {
            kind,
            key: key.to_string(),
            changes: other,
        });
    }
    if free_text.is_empty() {
        Ok(ImportDecision::Matches)
    } else {
        Ok(ImportDecision::ReconcileFreeText(free_text))
    }
}

/// Whether Delete reaches the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    Remove,
    /// Leave the adopted object alone, only drop the identity
    Forget,
}

/// Delete policy. `destroy_if_imported` is consulted only for imported
/// instances.
pub fn on_delete(state: &LifecycleState, lifecycle: CreateLifecycle) -> DeleteDecision {
    if state.is_imported() && !lifecycle.destroy_if_imported {
        DeleteDecision::Forget
    } else {
        DeleteDecision::Remove
    }
}

/// Delete policy for the Remove result: a missing object is converged.
pub fn on_remove(result: Result<()>) -> Result<DeleteOutcome> {
    match result {
        Ok(()) => Ok(DeleteOutcome::Removed),
        Err(err) if err.is_not_found() => {
            log::info!("{err}; treating as already deleted");
            Ok(DeleteOutcome::AlreadyGone)
        }
        Err(err) => Err(err),
    }
}

/// Whether Update reaches the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    Skip,
    Apply(Vec<FieldChange>),
}

/// Update policy.
pub fn on_update(changes: Vec<FieldChange>) -> UpdateDecision {
    if changes.is_empty() {
        UpdateDecision::Skip
    } else {
        UpdateDecision::Apply(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Diagnostics, ErrorCategory, Operation};
    use crate::field::{FieldRole, FieldValue};

    fn transport() -> Error {
        Error::Transport {
            operation: Operation::Fetch,
            kind: "vswitch",
            key: "br0".into(),
            message: "exit status 255".into(),
            diagnostics: Diagnostics::default(),
        }
    }

    fn change(field: &str, role: FieldRole) -> FieldChange {
        FieldChange {
            field: field.into(),
            role,
            from: Some(FieldValue::Text("a".into())),
            to: Some(FieldValue::Text("b".into())),
        }
    }

    #[test]
    fn test_fetch_not_found_without_flag_is_error() {
        let result: Result<u8> = Err(Error::not_found("vswitch", "br0"));
        let err = on_fetch(result, ReadLifecycle::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fetch_not_found_with_flag_is_zeroed() {
        let result: Result<u8> = Err(Error::not_found("vswitch", "br0"));
        let lifecycle = ReadLifecycle {
            ignore_error_if_not_exists: true,
        };
        assert_eq!(on_fetch(result, lifecycle).unwrap(), ReadDecision::Zeroed);
    }

    #[test]
    fn test_fetch_transport_error_is_never_downgraded() {
        let lifecycle = ReadLifecycle {
            ignore_error_if_not_exists: true,
        };
        let err = on_fetch::<u8>(Err(transport()), lifecycle).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_create_already_exists() {
        let exists = || Err(Error::already_exists("vswitch", "br0"));

        let err = on_create(exists(), CreateLifecycle::default()).unwrap_err();
        assert!(err.is_already_exists());

        let lifecycle = CreateLifecycle {
            import_if_exists: true,
            destroy_if_imported: false,
        };
        assert_eq!(on_create(exists(), lifecycle).unwrap(), CreateDecision::Adopt);
        assert_eq!(on_create(Ok(()), lifecycle).unwrap(), CreateDecision::Created);
    }

    #[test]
    fn test_import_match() {
        assert_eq!(
            on_import_match("vswitch", "br0", vec![]).unwrap(),
            ImportDecision::Matches
        );

        let notes = vec![change("notes", FieldRole::FreeText)];
        assert_eq!(
            on_import_match("vswitch", "br0", notes.clone()).unwrap(),
            ImportDecision::ReconcileFreeText(notes)
        );

        let mixed = vec![
            change("notes", FieldRole::FreeText),
            change("switch_type", FieldRole::Setting),
        ];
        match on_import_match("vswitch", "br0", mixed).unwrap_err() {
            Error::ConfigMismatch { changes, .. } => {
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].field, "switch_type");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_policy() {
        let imported = LifecycleState {
            exists: Some(true),
            imported: Some(true),
        };
        let created = LifecycleState {
            exists: Some(true),
            imported: Some(false),
        };
        let keep = CreateLifecycle {
            import_if_exists: true,
            destroy_if_imported: false,
        };
        let destroy = CreateLifecycle {
            import_if_exists: true,
            destroy_if_imported: true,
        };

        assert_eq!(on_delete(&imported, keep), DeleteDecision::Forget);
        assert_eq!(on_delete(&imported, destroy), DeleteDecision::Remove);
        assert_eq!(on_delete(&created, keep), DeleteDecision::Remove);
        assert_eq!(
            on_delete(&LifecycleState::default(), CreateLifecycle::default()),
            DeleteDecision::Remove
        );
    }

    #[test]
    fn test_remove_not_found_is_converged() {
        assert_eq!(on_remove(Ok(())).unwrap(), DeleteOutcome::Removed);
        assert_eq!(
            on_remove(Err(Error::not_found("vswitch", "br0"))).unwrap(),
            DeleteOutcome::AlreadyGone
        );
        assert!(on_remove(Err(transport())).is_err());
    }

    #[test]
    fn test_update_policy() {
        assert_eq!(on_update(vec![]), UpdateDecision::Skip);
        let changes = vec![change("notes", FieldRole::FreeText)];
        assert_eq!(on_update(changes.clone()), UpdateDecision::Apply(changes));
    }
}
