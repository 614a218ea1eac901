//! Execution engine - applies a plan, one instance per worker

use crate::engine::Engine;
use crate::error::Result;
use crate::identity::ResourceIdentity;
use crate::planner::{Action, Declared, ExecutionPlan};
use crate::resource::Resource;
use crate::types::{
    ApplyResult, CreateOutcome, DeleteOutcome, ExecuteOptions, ExecuteSummary, Instance,
    ReadOutcome, UpdateOutcome,
};
use rayon::prelude::*;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called once before any action runs
    fn on_start(&mut self, count: usize);

    /// Called when an action completes
    fn on_action_complete(
        &mut self,
        identity: &ResourceIdentity,
        verb: &str,
        result: &ApplyResult,
    );

    /// Called after the last action
    fn on_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _count: usize) {}
    fn on_action_complete(
        &mut self,
        _identity: &ResourceIdentity,
        _verb: &str,
        _result: &ApplyResult,
    ) {
    }
    fn on_complete(&mut self) {}
}

/// Outcome of one action.
///
/// `instance` is what the caller should persist under `identity`: `None`
/// drops the entry. An instance is kept exactly when it is still managed.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<D> {
    pub identity: ResourceIdentity,
    pub verb: &'static str,
    pub instance: Option<Instance<D>>,
    pub result: ApplyResult,
}

/// Results of a whole plan: deletes first, then the other actions, each in
/// plan order.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution<D> {
    pub applied: Vec<Applied<D>>,
    pub summary: ExecuteSummary,
}

/// Execute a plan
///
/// Deletes run as a phase of their own and finish before any update or
/// create starts, so a create never races the removal it depends on.
/// Within a phase, distinct instances run concurrently on a pool of
/// `opts.jobs` threads. Failures are recorded per action and never stop the
/// other actions.
pub fn execute<R, P>(
    engine: &Engine<'_, R>,
    plan: ExecutionPlan<R::Desired>,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Execution<R::Desired>
where
    R: Resource,
    P: ProgressCallback,
{
    let mut summary = ExecuteSummary::default();
    if plan.is_empty() {
        return Execution {
            applied: Vec::new(),
            summary,
        };
    }

    progress.on_start(plan.len());
    let (deletes, rest): (Vec<_>, Vec<_>) = plan
        .actions
        .into_iter()
        .partition(|action| matches!(action, Action::Delete { .. }));
    let pool = worker_pool(opts.jobs);

    let mut applied = run_phase(engine, deletes, pool.as_ref());
    applied.extend(run_phase(engine, rest, pool.as_ref()));

    for item in &applied {
        summary.add_result(&item.result);
        progress.on_action_complete(&item.identity, item.verb, &item.result);
    }
    progress.on_complete();

    Execution { applied, summary }
}

/// Rayon pool for `jobs` workers; `None` means apply sequentially.
fn worker_pool(jobs: usize) -> Option<rayon::ThreadPool> {
    if jobs <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("cannot start {jobs} workers ({e}); applying sequentially");
            None
        }
    }
}

/// Apply one phase of actions, in parallel when a pool is available
fn run_phase<R: Resource>(
    engine: &Engine<'_, R>,
    actions: Vec<Action<R::Desired>>,
    pool: Option<&rayon::ThreadPool>,
) -> Vec<Applied<R::Desired>> {
    match pool {
        Some(pool) if actions.len() > 1 => pool.install(|| {
            actions
                .into_par_iter()
                .map(|action| apply_action(engine, action))
                .collect()
        }),
        _ => actions
            .into_iter()
            .map(|action| apply_action(engine, action))
            .collect(),
    }
}

/// Apply a single action
fn apply_action<R: Resource>(
    engine: &Engine<'_, R>,
    action: Action<R::Desired>,
) -> Applied<R::Desired> {
    let identity = action.identity().clone();
    let verb = action.verb();

    let (instance, outcome) = match action {
        Action::Create { mut instance, .. } => {
            let outcome = engine.create(&mut instance).map(|o| match o {
                CreateOutcome::Created => ApplyResult::Created,
                CreateOutcome::Imported { .. } => ApplyResult::Imported,
            });
            (instance, outcome)
        }
        Action::Update {
            mut current,
            desired,
            ..
        } => {
            let outcome = converge(engine, &mut current, desired);
            (current, outcome)
        }
        Action::Delete { mut instance, .. } => {
            let outcome = engine.delete(&mut instance).map(|o| match o {
                DeleteOutcome::Removed | DeleteOutcome::AlreadyGone => ApplyResult::Removed,
                DeleteOutcome::Forgotten => ApplyResult::Forgotten,
            });
            (instance, outcome)
        }
    };

    let result = outcome.unwrap_or_else(|e| {
        log::error!("{verb} {identity} failed: {e}");
        ApplyResult::Failed {
            error: e.to_string(),
        }
    });
    Applied {
        identity,
        verb,
        instance: instance.is_managed().then_some(instance),
        result,
    }
}

/// Refresh, then update; an object that vanished from the host is created
/// again.
fn converge<R: Resource>(
    engine: &Engine<'_, R>,
    current: &mut Instance<R::Desired>,
    desired: Declared<R::Desired>,
) -> Result<ApplyResult> {
    match engine.read(current)? {
        ReadOutcome::Found => {
            match engine.update(current, desired.record, desired.lifecycle)? {
                UpdateOutcome::Unchanged => Ok(ApplyResult::NoChange),
                UpdateOutcome::Applied(_) => Ok(ApplyResult::Modified),
            }
        }
        ReadOutcome::Absent | ReadOutcome::NotFound => {
            log::warn!(
                "{} disappeared from the host; creating it again",
                engine.identity_of(&desired.record)?
            );
            *current = Instance::declared(desired.record, desired.lifecycle);
            match engine.create(current)? {
                CreateOutcome::Created => Ok(ApplyResult::Created),
                CreateOutcome::Imported { .. } => Ok(ApplyResult::Imported),
            }
        }
    }
}

/// Simple execution without callbacks
pub fn execute_simple<R: Resource>(
    engine: &Engine<'_, R>,
    plan: ExecutionPlan<R::Desired>,
    opts: &ExecuteOptions,
) -> Execution<R::Desired> {
    execute(engine, plan, opts, &mut NoProgress)
}
