//! Execution planner - matches declared instances against tracked ones

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::field::{FieldChange, diff};
use crate::identity::ResourceIdentity;
use crate::lifecycle::LifecycleOptions;
use crate::resource::Resource;
use crate::types::Instance;
use std::collections::{BTreeMap, BTreeSet};

/// One declared instance: its configuration and optional lifecycle options.
#[derive(Debug, Clone, PartialEq)]
pub struct Declared<D> {
    pub record: D,
    pub lifecycle: Option<LifecycleOptions>,
}

impl<D> Declared<D> {
    pub fn new(record: D, lifecycle: Option<LifecycleOptions>) -> Self {
        Self { record, lifecycle }
    }
}

/// A planned verb for one instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<D> {
    /// Declared but not tracked
    Create {
        identity: ResourceIdentity,
        instance: Instance<D>,
    },
    /// Declared and tracked; refreshed before it is updated. `changes` is
    /// the diff against the last known record.
    Update {
        identity: ResourceIdentity,
        current: Instance<D>,
        desired: Declared<D>,
        changes: Vec<FieldChange>,
    },
    /// Tracked but no longer declared
    Delete {
        identity: ResourceIdentity,
        instance: Instance<D>,
    },
}

impl<D> Action<D> {
    pub fn identity(&self) -> &ResourceIdentity {
        match self {
            Self::Create { identity, .. }
            | Self::Update { identity, .. }
            | Self::Delete { identity, .. } => identity,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether the last known record already differs from the declaration.
    pub fn has_changes(&self) -> bool {
        match self {
            Self::Update { changes, .. } => !changes.is_empty(),
            Self::Create { .. } | Self::Delete { .. } => true,
        }
    }
}

/// Counts of planned verbs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    /// Updates whose last known record already matches
    pub unchanged: usize,
}

/// Ordered list of actions: deletes first, then updates and creates, each
/// group sorted by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan<D> {
    pub actions: Vec<Action<D>>,
}

impl<D> ExecutionPlan<D> {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for action in &self.actions {
            match action {
                Action::Create { .. } => summary.create += 1,
                Action::Delete { .. } => summary.delete += 1,
                Action::Update { .. } if action.has_changes() => summary.update += 1,
                Action::Update { .. } => summary.unchanged += 1,
            }
        }
        summary
    }

    /// Keep only the actions whose identity matches `target`, a full
    /// identity or a bare natural key.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        let Some(target) = target else {
            return self;
        };
        let actions = self
            .actions
            .into_iter()
            .filter(|action| {
                let id = action.identity();
                id.as_str() == target
                    || id.parts().and_then(|(_, _, key)| key) == Some(target)
            })
            .collect();
        Self { actions }
    }
}

/// Build the plan for one resource kind.
///
/// Every declared record is validated first; a declaration that fails
/// validation, or two declarations mapping to the same identity, fail the
/// whole plan before anything reaches the host. Identities are matched the
/// way the host compares keys, so a tracked `Br0` is updated by a declared
/// `br0`; update and delete actions keep the tracked identity.
pub fn plan<R: Resource>(
    engine: &Engine<'_, R>,
    declared: Vec<Declared<R::Desired>>,
    tracked: BTreeMap<ResourceIdentity, Instance<R::Desired>>,
) -> Result<ExecutionPlan<R::Desired>> {
    let mut remaining: BTreeMap<ResourceIdentity, (ResourceIdentity, Instance<R::Desired>)> =
        BTreeMap::new();
    for (identity, instance) in tracked {
        let key = engine.match_key(&identity);
        if let Some((kept, _)) = remaining.get(&key) {
            log::warn!("{identity} and {kept} name the same object; leaving {identity} alone");
            continue;
        }
        remaining.insert(key, (identity, instance));
    }

    let mut seen = BTreeSet::new();
    let mut creates = Vec::new();
    let mut updates = Vec::new();

    for desired in declared {
        let identity = engine.identity_of(&desired.record)?;
        let key = engine.match_key(&identity);
        if !seen.insert(key.clone()) {
            return Err(Error::validation(
                Engine::<R>::kind(),
                format!("{identity} is declared more than once"),
            ));
        }

        match remaining.remove(&key) {
            Some((identity, current)) => {
                let changes = diff(&R::fields(&current.record), &R::fields(&desired.record));
                updates.push(Action::Update {
                    identity,
                    current,
                    desired,
                    changes,
                });
            }
            None => creates.push(Action::Create {
                identity,
                instance: Instance::declared(desired.record, desired.lifecycle),
            }),
        }
    }

    let mut actions: Vec<_> = remaining
        .into_values()
        .map(|(identity, instance)| Action::Delete { identity, instance })
        .collect();
    actions.sort_by(|a, b| a.identity().cmp(b.identity()));
    updates.sort_by(|a, b| a.identity().cmp(b.identity()));
    creates.sort_by(|a, b| a.identity().cmp(b.identity()));
    actions.extend(updates);
    actions.extend(creates);

    log::debug!(
        "planned {} action(s) for {}",
        actions.len(),
        Engine::<R>::kind()
    );
    Ok(ExecutionPlan { actions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGateway, MockSwitch, SwitchConfig};

    fn tracked(
        engine: &Engine<'_, MockSwitch>,
        configs: &[SwitchConfig],
    ) -> BTreeMap<ResourceIdentity, Instance<SwitchConfig>> {
        configs
            .iter()
            .map(|config| {
                let id = engine.identity_of(config).unwrap();
                let mut instance = Instance::declared(config.clone(), None);
                instance.id = Some(id.clone());
                (id, instance)
            })
            .collect()
    }

    #[test]
    fn test_plan_create_update_delete() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");

        let state = tracked(
            &engine,
            &[
                SwitchConfig::new("br0", "internal"),
                SwitchConfig::new("old", "private"),
            ],
        );
        let declared = vec![
            Declared::new(SwitchConfig::new("br0", "internal").notes("lab"), None),
            Declared::new(SwitchConfig::new("br1", "private"), None),
        ];

        let plan = plan(&engine, declared, state).unwrap();
        let verbs: Vec<_> = plan
            .actions
            .iter()
            .map(|a| (a.verb(), a.identity().to_string()))
            .collect();
        assert_eq!(
            verbs,
            vec![
                ("delete", "//hv01/vswitches/old".to_string()),
                ("update", "//hv01/vswitches/br0".to_string()),
                ("create", "//hv01/vswitches/br1".to_string()),
            ]
        );
        assert_eq!(
            plan.summary(),
            PlanSummary {
                create: 1,
                update: 1,
                delete: 1,
                unchanged: 0,
            }
        );
        assert_eq!(gateway.calls.total(), 0);
    }

    #[test]
    fn test_plan_unchanged_update() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");
        let state = tracked(&engine, &[SwitchConfig::new("br0", "internal")]);
        let declared = vec![Declared::new(SwitchConfig::new("br0", "Internal"), None)];

        let plan = plan(&engine, declared, state).unwrap();
        assert_eq!(plan.summary().unchanged, 1);
        assert!(!plan.actions[0].has_changes());
    }

    #[test]
    fn test_plan_rejects_duplicates_and_invalid_records() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");

        let declared = vec![
            Declared::new(SwitchConfig::new("br0", "internal"), None),
            Declared::new(SwitchConfig::new("br0", "private"), None),
        ];
        let err = plan(&engine, declared, BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("more than once"));

        let declared = vec![Declared::new(SwitchConfig::new("", "internal"), None)];
        assert!(plan(&engine, declared, BTreeMap::new()).is_err());
    }

    #[test]
    fn test_plan_matches_keys_ignoring_case() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");

        let tracked_id = ResourceIdentity::new("hv01", "vswitches", Some("Br0"));
        let mut instance = Instance::declared(SwitchConfig::new("Br0", "internal"), None);
        instance.id = Some(tracked_id.clone());
        let state = BTreeMap::from([(tracked_id.clone(), instance)]);

        let declared = vec![Declared::new(SwitchConfig::new("br0", "internal"), None)];
        let plan = plan(&engine, declared, state).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.actions[0].verb(), "update");
        assert_eq!(plan.actions[0].identity(), &tracked_id);
        assert!(!plan.actions[0].has_changes());
    }

    #[test]
    fn test_plan_rejects_duplicates_differing_in_case() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");

        let declared = vec![
            Declared::new(SwitchConfig::new("br0", "internal"), None),
            Declared::new(SwitchConfig::new("BR0", "internal"), None),
        ];
        let err = plan(&engine, declared, BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("//hv01/vswitches/BR0 is declared more than once"));
    }

    #[test]
    fn test_filter_by_target() {
        let gateway = MockGateway::default();
        let engine = Engine::<MockSwitch>::new(&gateway, "hv01");
        let declared = vec![
            Declared::new(SwitchConfig::new("br0", "internal"), None),
            Declared::new(SwitchConfig::new("br1", "internal"), None),
        ];
        let full = plan(&engine, declared, BTreeMap::new()).unwrap();

        assert_eq!(full.clone().filter_by_target(None).len(), 2);
        assert_eq!(full.clone().filter_by_target(Some("br1")).len(), 1);
        assert_eq!(
            full.filter_by_target(Some("//hv01/vswitches/br0")).len(),
            1
        );
    }
}
