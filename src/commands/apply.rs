//! `hvctl plan` and `hvctl apply`: converge declared switches with the host.

use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{
    Action, Engine, ExecuteOptions, ExecuteSummary, ExecutionPlan, ProgressCallback, execute,
};

use crate::Context;
use crate::cli::{ApplyArgs, PlanArgs};
use crate::config::ResourcesFile;
use crate::paths;
use crate::progress::ApplyProgress;
use crate::resource::{VSwitchConfig, VSwitchResource};
use crate::state::HvctlState;
use crate::ui;

type VSwitchEngine<'g> = Engine<'g, VSwitchResource>;

pub fn plan(ctx: &Context, args: PlanArgs) -> Result<()> {
    let resources = load_resources(ctx)?;
    let client = super::connect(ctx)?;
    let gateway = client.vswitches();
    let engine = VSwitchEngine::new(&gateway, client.host());
    let file = super::open_state(ctx)?;

    let plan = build(&engine, &resources, &file.state, args.target.as_deref())?;
    display_plan(&plan);
    Ok(())
}

pub fn apply(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let resources = load_resources(ctx)?;
    let client = super::connect(ctx)?;
    let gateway = client.vswitches();
    let engine = VSwitchEngine::new(&gateway, client.host());
    let mut file = super::open_state(ctx)?;

    let plan = build(&engine, &resources, &file.state, args.target.as_deref())?;
    if plan.is_empty() {
        ui::success("Nothing declared or tracked");
        return Ok(());
    }
    display_plan(&plan);

    let counts = plan.summary();
    let has_changes = counts.create + counts.update + counts.delete > 0;
    if has_changes && !args.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(());
    }

    let mut progress = ApplyProgress::new(ctx.quiet);
    let summary = converge(
        &engine,
        plan,
        &mut file.state,
        &ExecuteOptions { jobs: args.jobs },
        &mut progress,
    );
    file.touch()?;

    print_summary(&summary);
    if !summary.is_success() {
        bail!("{} switch(es) failed to converge", summary.failed);
    }
    Ok(())
}

fn load_resources(ctx: &Context) -> Result<ResourcesFile> {
    let path = paths::resources_file(ctx.resources.as_deref());
    log::debug!("Reading declared resources from {}", path.display());
    ResourcesFile::load(&path)
}

/// Plan the declared switches against those tracked on the engine's host.
pub fn build(
    engine: &VSwitchEngine<'_>,
    resources: &ResourcesFile,
    state: &HvctlState,
    target: Option<&str>,
) -> Result<ExecutionPlan<VSwitchConfig>> {
    let tracked = state.vswitches_on(engine.host());
    let plan = reconcile::plan(engine, resources.vswitches(), tracked)?;
    Ok(plan.filter_by_target(target))
}

/// Run the plan and record every outcome in `state`.
pub fn converge<P: ProgressCallback>(
    engine: &VSwitchEngine<'_>,
    plan: ExecutionPlan<VSwitchConfig>,
    state: &mut HvctlState,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> ExecuteSummary {
    let execution = execute(engine, plan, opts, progress);
    for applied in execution.applied {
        state.record(applied);
    }
    execution.summary
}

fn display_plan(plan: &ExecutionPlan<VSwitchConfig>) {
    ui::header("Plan");
    if plan.is_empty() {
        ui::dim("Nothing declared or tracked");
        return;
    }

    for action in &plan.actions {
        match action {
            Action::Create { identity, .. } => println!("  {} create {}", "+".green(), identity),
            Action::Delete { identity, .. } => println!("  {} delete {}", "-".red(), identity),
            Action::Update {
                identity, changes, ..
            } if !changes.is_empty() => {
                println!("  {} update {}", "~".yellow(), identity);
                ui::changes(changes);
            }
            Action::Update { identity, .. } => {
                println!("  {} refresh {}", "·".dimmed(), identity.to_string().dimmed());
            }
        }
    }

    let counts = plan.summary();
    println!();
    ui::kv(
        "Summary",
        &format!(
            "{} to create, {} to update, {} to delete, {} unchanged",
            counts.create, counts.update, counts.delete, counts.unchanged
        ),
    );
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Switches converged", "✓".green().bold());
    } else {
        println!("  {} Converged with errors", "⚠".yellow().bold());
    }

    let lines = [
        (summary.created, "created"),
        (summary.imported, "imported"),
        (summary.modified, "modified"),
        (summary.removed, "removed"),
        (summary.forgotten, "forgotten"),
        (summary.no_change, "unchanged"),
        (summary.failed, "failed"),
    ];
    for (count, label) in lines.into_iter().filter(|(count, _)| *count > 0) {
        println!("    • {count} {label}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, success};
    use reconcile::{ApplyResult, Instance, NoProgress};

    const BR0: &str = r#"{"Name":"br0","SwitchType":"Internal","Notes":"","AllowManagementOS":true}"#;

    fn tracked(host: &str, name: &str) -> Instance<VSwitchConfig> {
        let mut instance = Instance::declared(VSwitchConfig::new(name, "internal"), None);
        instance.id = Some(reconcile::ResourceIdentity::new(host, "vswitches", Some(name)));
        instance.state.exists = Some(true);
        instance.state.imported = Some(false);
        instance
    }

    fn resources(content: &str) -> ResourcesFile {
        ResourcesFile::parse(content).unwrap()
    }

    #[test]
    fn test_plan_only_sees_this_host() {
        let client = hvkit::Client::with_executor("hv01", Canned::new([])).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let mut state = HvctlState::default();
        state.track(tracked("hv01", "old"));
        state.track(tracked("hv02", "other"));

        let plan = build(
            &engine,
            &resources("[[vswitch]]\nname = \"br0\"\n"),
            &state,
            None,
        )
        .unwrap();
        let verbs: Vec<_> = plan
            .actions
            .iter()
            .map(|a| (a.verb(), a.identity().to_string()))
            .collect();
        assert_eq!(
            verbs,
            vec![
                ("delete", "//hv01/vswitches/old".to_string()),
                ("create", "//hv01/vswitches/br0".to_string()),
            ]
        );
    }

    #[test]
    fn test_tracked_switch_matches_declaration_ignoring_case() {
        let host = Canned::new([success(BR0), success(BR0)]);
        let client = hvkit::Client::with_executor("hv01", host.clone()).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let mut state = HvctlState::default();
        let mut instance = tracked("hv01", "Br0");
        instance.record.allow_management_os = Some(true);
        state.track(instance);

        let plan = build(
            &engine,
            &resources("[[vswitch]]\nname = \"br0\"\n"),
            &state,
            None,
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.actions[0].verb(), "update");
        assert_eq!(plan.actions[0].identity().as_str(), "//hv01/vswitches/Br0");

        let summary = converge(
            &engine,
            plan,
            &mut state,
            &ExecuteOptions { jobs: 4 },
            &mut NoProgress,
        );
        assert_eq!(summary.no_change, 1);
        assert_eq!(state.vswitches.len(), 1);
        assert!(host.scripts().iter().all(|s| !s.contains("Remove-VMSwitch")));
    }

    #[test]
    fn test_duplicate_declarations_fail_the_plan() {
        let client = hvkit::Client::with_executor("hv01", Canned::new([])).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let err = build(
            &engine,
            &resources("[[vswitch]]\nname = \"br0\"\n\n[[vswitch]]\nname = \"br0\"\n"),
            &HvctlState::default(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn test_converge_records_outcomes() {
        let host = Canned::new([success(""), success(""), success(BR0)]);
        let client = hvkit::Client::with_executor("hv01", host.clone()).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let mut state = HvctlState::default();
        state.track(tracked("hv01", "old"));
        let plan = build(
            &engine,
            &resources("[[vswitch]]\nname = \"br0\"\n"),
            &state,
            None,
        )
        .unwrap();

        let summary = converge(
            &engine,
            plan,
            &mut state,
            &ExecuteOptions { jobs: 1 },
            &mut NoProgress,
        );
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.created, 1);
        assert!(summary.is_success());

        let ids: Vec<_> = state.vswitches.keys().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["//hv01/vswitches/br0"]);

        let scripts = host.scripts();
        assert!(scripts[0].contains("Remove-VMSwitch"));
        assert!(scripts[1].contains("New-VMSwitch"));
    }

    #[test]
    fn test_duplicate_declarations_differing_in_case_fail_the_plan() {
        let client = hvkit::Client::with_executor("hv01", Canned::new([])).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let err = build(
            &engine,
            &resources("[[vswitch]]\nname = \"br0\"\n\n[[vswitch]]\nname = \"BR0\"\n"),
            &HvctlState::default(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn test_cmdlet_failure_on_remove_keeps_switch_tracked() {
        let host = Canned::new([crate::testing::failure(
            "Remove-VMSwitch : Cannot find the network adapter with name 'Ethernet 9'.",
        )]);
        let client = hvkit::Client::with_executor("hv01", host).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let mut state = HvctlState::default();
        state.track(tracked("hv01", "old"));
        let plan = build(&engine, &ResourcesFile::default(), &state, None).unwrap();

        let mut progress = RecordingProgress::default();
        let summary = converge(
            &engine,
            plan,
            &mut state,
            &ExecuteOptions { jobs: 1 },
            &mut progress,
        );
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.removed, 0);
        assert_eq!(state.vswitches.len(), 1);
        assert!(matches!(progress.results[0], ApplyResult::Failed { .. }));
    }

    #[test]
    fn test_failed_action_keeps_tracked_instance() {
        let host = Canned::new([crate::testing::failure("access denied")]);
        let client = hvkit::Client::with_executor("hv01", host).unwrap();
        let gateway = client.vswitches();
        let engine = VSwitchEngine::new(&gateway, "hv01");

        let mut state = HvctlState::default();
        state.track(tracked("hv01", "old"));
        let plan = build(&engine, &ResourcesFile::default(), &state, None).unwrap();

        let mut progress = RecordingProgress::default();
        let summary = converge(
            &engine,
            plan,
            &mut state,
            &ExecuteOptions { jobs: 1 },
            &mut progress,
        );
        assert_eq!(summary.failed, 1);
        assert_eq!(state.vswitches.len(), 1);
        assert_eq!(progress.results.len(), 1);
        assert!(matches!(progress.results[0], ApplyResult::Failed { .. }));
    }

    #[derive(Default)]
    struct RecordingProgress {
        results: Vec<ApplyResult>,
    }

    impl ProgressCallback for RecordingProgress {
        fn on_start(&mut self, _count: usize) {}
        fn on_action_complete(
            &mut self,
            _identity: &reconcile::ResourceIdentity,
            _verb: &str,
            result: &ApplyResult,
        ) {
            self.results.push(result.clone());
        }
        fn on_complete(&mut self) {}
    }
}
