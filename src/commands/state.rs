//! `hvctl state`: inspect and edit tracked instances.

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::ResourceIdentity;

use crate::Context;
use crate::cli::StateCommand;
use crate::config::ProviderConfig;
use crate::state::HvctlState;
use crate::ui;

pub fn run(ctx: &Context, cmd: StateCommand) -> Result<()> {
    let mut file = super::open_state(ctx)?;
    match cmd {
        StateCommand::List => {
            list(&file.state);
            Ok(())
        }
        StateCommand::Forget { target } => {
            let host = ProviderConfig::load(ctx.config.as_deref())?
                .connection()?
                .host()
                .to_string();
            let id = forget(&mut file.state, &host, &target)?;
            file.touch()?;
            ui::success(&format!("No longer tracking {id}"));
            ui::dim("The switch was left on the host");
            Ok(())
        }
    }
}

fn list(state: &HvctlState) {
    ui::header("Tracked switches");
    if state.vswitches.is_empty() {
        ui::dim("Nothing tracked");
        return;
    }

    for (id, instance) in &state.vswitches {
        let imported = if instance.state.is_imported() {
            " (imported)".cyan().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", id, imported);
        ui::kv("type", &instance.record.switch_type);
        if !instance.record.notes.is_empty() {
            ui::kv("notes", &instance.record.notes);
        }
        if let Some(adapter) = &instance.record.net_adapter_name {
            ui::kv("adapter", adapter);
        }
    }
    println!();
    ui::kv("Last updated", &state.last_updated.to_rfc3339());
}

/// Forget a tracked switch by identity, or by name on `host`. Names match
/// without regard to case.
pub fn forget(state: &mut HvctlState, host: &str, target: &str) -> Result<ResourceIdentity> {
    let wanted = if target.starts_with("//") {
        ResourceIdentity::from(target.to_string())
    } else {
        ResourceIdentity::new(host, "vswitches", Some(target))
    };
    let Some(id) = state.tracked_id(&wanted) else {
        bail!("{wanted} is not tracked");
    };
    state.forget(&id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::VSwitchConfig;
    use reconcile::Instance;

    fn state_with(host: &str, name: &str) -> HvctlState {
        let mut instance = Instance::declared(VSwitchConfig::new(name, "internal"), None);
        instance.id = Some(ResourceIdentity::new(host, "vswitches", Some(name)));
        let mut state = HvctlState::default();
        state.track(instance);
        state
    }

    #[test]
    fn test_forget_by_name_uses_current_host() {
        let mut state = state_with("hv01", "br0");
        assert!(forget(&mut state, "hv02", "br0").is_err());

        let id = forget(&mut state, "hv01", "br0").unwrap();
        assert_eq!(id.as_str(), "//hv01/vswitches/br0");
        assert!(state.vswitches.is_empty());
    }

    #[test]
    fn test_forget_by_name_ignores_case() {
        let mut state = state_with("hv01", "Br0");
        let id = forget(&mut state, "hv01", "bR0").unwrap();
        assert_eq!(id.as_str(), "//hv01/vswitches/Br0");
        assert!(state.vswitches.is_empty());
    }

    #[test]
    fn test_forget_by_identity() {
        let mut state = state_with("hv02", "br0");
        forget(&mut state, "hv01", "//hv02/vswitches/br0").unwrap();
        assert!(state.vswitches.is_empty());
    }
}
