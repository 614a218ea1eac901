//! Reconciliation engine
//!
//! Maps Create / Read / Update / Delete / Import onto gateway calls for one
//! instance at a time and owns the instance's identity. Lifecycle decisions
//! are delegated to [`crate::policy`].

use crate::error::{Error, Result};
use crate::field::{FieldChange, FieldRole, diff};
use crate::gateway::{Fetch, Gateway};
use crate::identity::ResourceIdentity;
use crate::key::NaturalKey;
use crate::lifecycle::{LifecycleOptions, LifecycleState, ReadLifecycle};
use crate::policy::{
    self, CreateDecision, DeleteDecision, ImportDecision, ReadDecision, UpdateDecision,
};
use crate::resource::{KeyOf, Resource};
use crate::types::{CreateOutcome, DeleteOutcome, Instance, Lookup, ReadOutcome, UpdateOutcome};
use std::marker::PhantomData;

/// Drives one resource kind against one host.
pub struct Engine<'g, R: Resource> {
    gateway: &'g R::Gateway,
    host: String,
    _resource: PhantomData<fn() -> R>,
}

impl<'g, R: Resource> Engine<'g, R> {
    /// `host` is the label used in identities; it is never inferred.
    pub fn new(gateway: &'g R::Gateway, host: impl Into<String>) -> Self {
        Self {
            gateway,
            host: host.into(),
            _resource: PhantomData,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn kind() -> &'static str {
        <R::Gateway as Fetch>::TYPE_NAME
    }

    /// Identity of the object behind `key` on this host.
    pub fn identity(&self, key: &KeyOf<R>) -> ResourceIdentity {
        identity_for::<R::Gateway>(&self.host, key)
    }

    /// Form of `id` under which two identities name the same object on the
    /// host.
    pub fn match_key(&self, id: &ResourceIdentity) -> ResourceIdentity {
        if <R::Gateway as Fetch>::KEYS_IGNORE_CASE {
            id.fold_case()
        } else {
            id.clone()
        }
    }

    /// Identity a declared record would receive, after validating it.
    pub fn identity_of(&self, desired: &R::Desired) -> Result<ResourceIdentity> {
        R::validate(desired)?;
        Ok(self.identity(&R::natural_key(desired)?))
    }

    /// Create the object, or adopt an existing one under `import_if_exists`,
    /// then refresh the record from the host.
    pub fn create(&self, instance: &mut Instance<R::Desired>) -> Result<CreateOutcome> {
        R::validate(&instance.record)?;
        let key = R::natural_key(&instance.record)?;
        let id = self.identity(&key);
        let options = instance.options();

        log::info!("creating {} {id}", Self::kind());
        let applied = self.gateway.create(&R::to_gateway(&instance.record));
        let outcome = match policy::on_create(applied, options.create)? {
            CreateDecision::Created => CreateOutcome::Created,
            CreateDecision::Adopt => CreateOutcome::Imported {
                reconciled: self.adopt(&key, &instance.record)?,
            },
        };

        let imported = matches!(outcome, CreateOutcome::Imported { .. });
        if imported {
            log::info!("imported existing {} {id}", Self::kind());
        }
        instance.id = Some(id);
        instance.state.imported = Some(imported);

        self.refresh_after_write(instance, &key)?;
        Ok(outcome)
    }

    /// Compare an existing object with the configuration; overwrite its free
    /// text when nothing else differs.
    fn adopt(&self, key: &KeyOf<R>, desired: &R::Desired) -> Result<Vec<FieldChange>> {
        let observed = R::from_gateway(&self.gateway.fetch(key)?);
        let changes = diff(&R::fields(&observed), &R::fields(desired));

        match policy::on_import_match(Self::kind(), &key.display(), changes)? {
            ImportDecision::Matches => Ok(Vec::new()),
            ImportDecision::ReconcileFreeText(changes) => {
                log::info!(
                    "reconciling {} '{}' on import: {}",
                    Self::kind(),
                    key.display(),
                    crate::field::describe_changes(&changes)
                );
                self.gateway.update(key, &R::to_gateway(desired))?;
                Ok(changes)
            }
        }
    }

    /// Refresh a managed instance from the host.
    ///
    /// A missing object is not an error here: the identity is cleared and
    /// the outcome says why. With `ignore_error_if_not_exists` the record is
    /// replaced by the zeroed record.
    pub fn read(&self, instance: &mut Instance<R::Desired>) -> Result<ReadOutcome> {
        let id = self.managed_identity(instance)?;
        let key = R::natural_key(&instance.record)?;
        log::debug!("reading {} {id}", Self::kind());

        match policy::on_fetch(self.gateway.fetch(&key), instance.options().read) {
            Ok(ReadDecision::Present(observed)) => {
                instance.record = R::from_gateway(&observed);
                instance.state.exists = Some(true);
                Ok(ReadOutcome::Found)
            }
            Ok(ReadDecision::Zeroed) => {
                instance.record = R::zeroed();
                instance.state.exists = Some(false);
                instance.id = None;
                Ok(ReadOutcome::Absent)
            }
            Err(err) if err.is_not_found() => {
                log::warn!("{} {id} no longer exists", Self::kind());
                instance.state.exists = Some(false);
                instance.id = None;
                Ok(ReadOutcome::NotFound)
            }
            Err(err) => Err(err),
        }
    }

    /// Converge a managed instance to `desired`.
    ///
    /// The lifecycle options are always replaced. When only they changed,
    /// no gateway call is made.
    pub fn update(
        &self,
        instance: &mut Instance<R::Desired>,
        desired: R::Desired,
        lifecycle: Option<LifecycleOptions>,
    ) -> Result<UpdateOutcome> {
        let id = self.managed_identity(instance)?;
        R::validate(&desired)?;

        let changes = diff(&R::fields(&instance.record), &R::fields(&desired));
        if let Some(change) = changes.iter().find(|c| c.role == FieldRole::Key) {
            return Err(Error::validation(
                Self::kind(),
                format!("{id} cannot change its key ({change}); delete and create it instead"),
            ));
        }
        instance.lifecycle = lifecycle;

        match policy::on_update(changes) {
            UpdateDecision::Skip => {
                log::debug!("{} {id} is up to date", Self::kind());
                Ok(UpdateOutcome::Unchanged)
            }
            UpdateDecision::Apply(changes) => {
                log::info!("updating {} {id}", Self::kind());
                let key = R::natural_key(&desired)?;
                self.gateway.update(&key, &R::to_gateway(&desired))?;
                instance.record = desired;
                self.refresh_after_write(instance, &key)?;
                Ok(UpdateOutcome::Applied(changes))
            }
        }
    }

    /// Delete a managed instance. The identity is cleared whether or not
    /// the host was touched.
    pub fn delete(&self, instance: &mut Instance<R::Desired>) -> Result<DeleteOutcome> {
        let id = self.managed_identity(instance)?;

        let outcome = match policy::on_delete(&instance.state, instance.options().create) {
            DeleteDecision::Forget => {
                log::info!(
                    "{} {id} was imported and destroy_if_imported is off; leaving it on the host",
                    Self::kind()
                );
                DeleteOutcome::Forgotten
            }
            DeleteDecision::Remove => {
                log::info!("deleting {} {id}", Self::kind());
                let key = R::natural_key(&instance.record)?;
                policy::on_remove(self.gateway.remove(&key))?
            }
        };

        instance.id = None;
        instance.state.exists = Some(false);
        Ok(outcome)
    }

    /// Bring an existing object under management from an externally
    /// supplied key.
    pub fn import(
        &self,
        import_id: &str,
        lifecycle: Option<LifecycleOptions>,
    ) -> Result<Instance<R::Desired>> {
        let seed = R::import_seed(import_id)?;
        let key = R::natural_key(&seed)?;
        let id = self.identity(&key);
        log::info!("importing {} {id}", Self::kind());

        let mut instance = Instance {
            id: Some(id),
            record: seed,
            lifecycle,
            state: LifecycleState {
                exists: None,
                imported: Some(false),
            },
        };
        match self.read(&mut instance)? {
            ReadOutcome::Found => Ok(instance),
            ReadOutcome::Absent | ReadOutcome::NotFound => {
                Err(Error::not_found(Self::kind(), key.display()))
            }
        }
    }

    fn refresh_after_write(
        &self,
        instance: &mut Instance<R::Desired>,
        key: &KeyOf<R>,
    ) -> Result<()> {
        match self.read(instance)? {
            ReadOutcome::Found => Ok(()),
            ReadOutcome::Absent | ReadOutcome::NotFound => {
                Err(Error::not_found(Self::kind(), key.display()))
            }
        }
    }

    fn managed_identity(&self, instance: &Instance<R::Desired>) -> Result<ResourceIdentity> {
        instance.id.clone().ok_or_else(|| {
            Error::validation(
                Self::kind(),
                "instance has no identity; create or import it first",
            )
        })
    }
}

fn identity_for<G: Fetch>(host: &str, key: &G::Key) -> ResourceIdentity {
    ResourceIdentity::new(host, G::COLLECTION, key.segment().as_deref())
}

/// Data-source read: fetch one object without managing it.
///
/// Unlike [`Engine::read`], a missing object is an error unless
/// `ignore_error_if_not_exists` is set, in which case a default record with
/// `exists = false` is returned.
pub fn lookup<G>(
    gateway: &G,
    host: &str,
    key: &G::Key,
    lifecycle: ReadLifecycle,
) -> Result<Lookup<G::Record>>
where
    G: Fetch,
    G::Record: Default,
{
    let id = identity_for::<G>(host, key);
    log::debug!("looking up {} {id}", G::TYPE_NAME);

    match policy::on_fetch(gateway.fetch(key), lifecycle)? {
        ReadDecision::Present(record) => Ok(Lookup {
            id: Some(id),
            record,
            exists: true,
        }),
        ReadDecision::Zeroed => Ok(Lookup {
            id: None,
            record: G::Record::default(),
            exists: false,
        }),
    }
}
