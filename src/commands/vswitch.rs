//! `hvctl vswitch`: one verb against one switch, tracked in the state file.

use anyhow::{Context as AnyhowContext, Result, bail};
use reconcile::{
    CreateOutcome, DeleteOutcome, Engine, Instance, LifecycleOptions, ReadOutcome,
    ResourceIdentity, UpdateOutcome,
};

use crate::Context;
use crate::cli::{VSwitchArgs, VSwitchCommand};
use crate::resource::{VSwitchConfig, VSwitchResource};
use crate::state::HvctlState;
use crate::ui;

type VSwitchEngine<'g> = Engine<'g, VSwitchResource>;

pub fn run(ctx: &Context, cmd: VSwitchCommand) -> Result<()> {
    let client = super::connect(ctx)?;
    let gateway = client.vswitches();
    let engine = VSwitchEngine::new(&gateway, client.host());
    let mut file = super::open_state(ctx)?;

    let instance = match cmd {
        VSwitchCommand::Create { switch, lifecycle } => {
            create(&engine, &mut file.state, &switch, lifecycle.options())?
        }
        VSwitchCommand::Read { name } => read(&engine, &mut file.state, &name)?,
        VSwitchCommand::Update { switch, lifecycle } => {
            update(&engine, &mut file.state, &switch, lifecycle.options())?
        }
        VSwitchCommand::Delete { name } => delete(&engine, &mut file.state, &name)?,
        VSwitchCommand::Import { name, lifecycle } => {
            import(&engine, &mut file.state, &name, lifecycle.options())?
        }
    };

    file.touch()?;
    if !ctx.quiet {
        super::print_json(&instance)?;
    }
    Ok(())
}

/// Create a switch, or adopt it under `import_if_exists`.
pub fn create(
    engine: &VSwitchEngine<'_>,
    state: &mut HvctlState,
    switch: &VSwitchArgs,
    lifecycle: Option<LifecycleOptions>,
) -> Result<Instance<VSwitchConfig>> {
    let desired = merge(VSwitchConfig::new(&switch.name, "internal"), switch);
    let id = engine.identity_of(&desired)?;
    if let Some(tracked) = state.tracked_id(&id) {
        bail!("{tracked} is already tracked; use `hvctl vswitch update` to change it");
    }

    let mut instance = Instance::declared(desired, lifecycle);
    match engine.create(&mut instance)? {
        CreateOutcome::Created => ui::success(&format!("Created {id}")),
        CreateOutcome::Imported { reconciled } => {
            ui::success(&format!("Imported existing {id}"));
            ui::changes(&reconciled);
        }
    }
    state.track(instance.clone());
    Ok(instance)
}

/// Refresh a tracked switch. A switch gone from the host stops being
/// tracked.
pub fn read(
    engine: &VSwitchEngine<'_>,
    state: &mut HvctlState,
    name: &str,
) -> Result<Instance<VSwitchConfig>> {
    let (id, mut instance) = tracked(engine, state, name)?;
    match engine.read(&mut instance)? {
        ReadOutcome::Found => {
            state.track(instance.clone());
        }
        ReadOutcome::Absent | ReadOutcome::NotFound => {
            ui::warn(&format!("{id} no longer exists on the host; no longer tracked"));
            state.forget(&id);
        }
    }
    Ok(instance)
}

/// Change a tracked switch. Flags left unset keep their current value, and
/// lifecycle options are kept unless a lifecycle flag is given.
pub fn update(
    engine: &VSwitchEngine<'_>,
    state: &mut HvctlState,
    switch: &VSwitchArgs,
    lifecycle: Option<LifecycleOptions>,
) -> Result<Instance<VSwitchConfig>> {
    let (id, mut instance) = tracked(engine, state, &switch.name)?;
    let desired = merge(instance.record.clone(), switch);
    let lifecycle = lifecycle.or(instance.lifecycle);

    match engine.update(&mut instance, desired, lifecycle)? {
        UpdateOutcome::Unchanged => ui::info(&format!("{id} is up to date")),
        UpdateOutcome::Applied(changes) => {
            ui::success(&format!("Updated {id}"));
            ui::changes(&changes);
        }
    }
    state.track(instance.clone());
    Ok(instance)
}

/// Delete a tracked switch; it stops being tracked either way.
pub fn delete(
    engine: &VSwitchEngine<'_>,
    state: &mut HvctlState,
    name: &str,
) -> Result<Instance<VSwitchConfig>> {
    let (id, mut instance) = tracked(engine, state, name)?;
    match engine.delete(&mut instance)? {
        DeleteOutcome::Removed => ui::success(&format!("Deleted {id}")),
        DeleteOutcome::AlreadyGone => ui::info(&format!("{id} was already gone")),
        DeleteOutcome::Forgotten => {
            ui::info(&format!("{id} was imported; left on the host and no longer tracked"));
            ui::dim("Set destroy_if_imported to remove imported switches");
        }
    }
    state.forget(&id);
    Ok(instance)
}

/// Start tracking a switch that already exists.
pub fn import(
    engine: &VSwitchEngine<'_>,
    state: &mut HvctlState,
    name: &str,
    lifecycle: Option<LifecycleOptions>,
) -> Result<Instance<VSwitchConfig>> {
    let id = engine.identity(&name.trim().to_string());
    if let Some(tracked) = state.tracked_id(&id) {
        bail!("{tracked} is already tracked");
    }

    let instance = engine.import(name, lifecycle)?;
    ui::success(&format!("Imported {id}"));
    state.track(instance.clone());
    Ok(instance)
}

fn tracked(
    engine: &VSwitchEngine<'_>,
    state: &HvctlState,
    name: &str,
) -> Result<(ResourceIdentity, Instance<VSwitchConfig>)> {
    let wanted = engine.identity(&name.to_string());
    state
        .tracked_id(&wanted)
        .and_then(|id| state.vswitches.get(&id).cloned().map(|instance| (id, instance)))
        .with_context(|| format!("{wanted} is not tracked; create or import it first"))
}

/// Overlay command-line settings on `base`.
///
/// Changing the switch type resets the adapter settings the host computes,
/// unless they are given too.
fn merge(base: VSwitchConfig, switch: &VSwitchArgs) -> VSwitchConfig {
    let mut base = base.into_desired();
    if let Some(switch_type) = &switch.switch_type
        && !switch_type.eq_ignore_ascii_case(&base.switch_type)
    {
        base.switch_type = switch_type.clone();
        base.allow_management_os = None;
        base.net_adapter_name = None;
        base.net_adapter_interface_description = None;
    }
    if let Some(notes) = &switch.notes {
        base.notes = notes.clone();
    }
    if switch.allow_management_os.is_some() {
        base.allow_management_os = switch.allow_management_os;
    }
    if let Some(adapter) = &switch.net_adapter_name {
        base.net_adapter_name = Some(adapter.clone());
        base.net_adapter_interface_description = None;
    }
    if let Some(description) = &switch.net_adapter_interface_description {
        base.net_adapter_interface_description = Some(description.clone());
        base.net_adapter_name = None;
    }
    base
}
