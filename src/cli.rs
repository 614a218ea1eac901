use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reconcile::{CreateLifecycle, LifecycleOptions, ReadLifecycle};

#[derive(Parser)]
#[command(name = "hvctl")]
#[command(version)]
#[command(about = "Reconcile Hyper-V virtual switches and inspect host networking", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Provider config file (default: ~/.config/hvctl/config.toml)
    #[arg(long, global = true, env = "HVCTL_CONFIG")]
    pub config: Option<String>,

    /// State file (default: ~/.local/state/hvctl/state.toml)
    #[arg(long, global = true)]
    pub state: Option<String>,

    /// Declared resources (default: ./hvctl.resources.toml)
    #[arg(long, global = true)]
    pub resources: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage a single virtual switch
    #[command(subcommand)]
    Vswitch(VSwitchCommand),

    /// Look up host objects without managing them
    #[command(subcommand)]
    Show(ShowCommand),

    /// Show what apply would change
    Plan(PlanArgs),

    /// Converge declared switches with the host
    Apply(ApplyArgs),

    /// Inspect and edit tracked instances
    #[command(subcommand)]
    State(StateCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Virtual Switch Commands
// ============================================================================

#[derive(Subcommand)]
pub enum VSwitchCommand {
    /// Create a switch and start tracking it
    Create {
        #[command(flatten)]
        switch: VSwitchArgs,

        #[command(flatten)]
        lifecycle: LifecycleArgs,
    },

    /// Refresh a tracked switch from the host
    Read {
        /// Switch name
        name: String,
    },

    /// Change settings of a tracked switch
    Update {
        #[command(flatten)]
        switch: VSwitchArgs,

        #[command(flatten)]
        lifecycle: LifecycleArgs,
    },

    /// Delete a tracked switch
    Delete {
        /// Switch name
        name: String,
    },

    /// Track an existing switch
    Import {
        /// Switch name
        name: String,

        #[command(flatten)]
        lifecycle: LifecycleArgs,
    },
}

/// Switch settings. Unset flags keep the current value on update and the
/// default on create.
#[derive(Args, Debug, Clone, Default)]
pub struct VSwitchArgs {
    /// Switch name
    pub name: String,

    /// Switch type: private, internal or external
    #[arg(short = 't', long = "type")]
    pub switch_type: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Share the adapter with the management OS (external switches)
    #[arg(long)]
    pub allow_management_os: Option<bool>,

    /// Physical adapter to bind, by name (external switches)
    #[arg(long, conflicts_with = "net_adapter_interface_description")]
    pub net_adapter_name: Option<String>,

    /// Physical adapter to bind, by interface description (external switches)
    #[arg(long)]
    pub net_adapter_interface_description: Option<String>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LifecycleArgs {
    /// Adopt a switch that already exists instead of failing
    #[arg(long)]
    pub import_if_exists: bool,

    /// Remove an adopted switch from the host on delete
    #[arg(long)]
    pub destroy_if_imported: bool,

    /// Treat a missing switch as absent instead of an error on read
    #[arg(long)]
    pub ignore_missing: bool,
}

impl LifecycleArgs {
    /// Lifecycle options, or `None` when no flag was given.
    pub fn options(&self) -> Option<LifecycleOptions> {
        if !(self.import_if_exists || self.destroy_if_imported || self.ignore_missing) {
            return None;
        }
        Some(LifecycleOptions {
            read: ReadLifecycle {
                ignore_error_if_not_exists: self.ignore_missing,
            },
            create: CreateLifecycle {
                import_if_exists: self.import_if_exists,
                destroy_if_imported: self.destroy_if_imported,
            },
        })
    }
}

// ============================================================================
// Show Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ShowCommand {
    /// A virtual switch
    Vswitch {
        /// Switch name
        name: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// A physical network adapter of the management OS
    NetworkAdapter {
        /// Adapter name
        name: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// A network interface, by exactly the most specific key given
    Interface {
        #[command(flatten)]
        query: InterfaceArgs,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// A network connection profile
    Network {
        /// Profile name
        name: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// A virtual network adapter
    VnetworkAdapter {
        /// Adapter name
        #[arg(long, default_value = "")]
        name: String,

        /// Owning virtual machine; empty for the management OS
        #[arg(long = "vm", default_value = "")]
        vmachine_name: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Settings of the management OS
    ManagementOs,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LookupArgs {
    /// Print an empty record instead of failing when the object is missing
    #[arg(long)]
    pub ignore_missing: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InterfaceArgs {
    #[arg(long, default_value_t = 0)]
    pub index: u32,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub alias: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub mac_address: String,
    #[arg(long, default_value = "")]
    pub network_adapter_name: String,
    #[arg(long, default_value = "")]
    pub vnetwork_adapter_name: String,
}

// ============================================================================
// Plan / Apply / State
// ============================================================================

#[derive(Args)]
pub struct PlanArgs {
    /// Only plan this switch (name or identity)
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only apply this switch (name or identity)
    pub target: Option<String>,

    /// Number of switches reconciled concurrently
    #[arg(short, long, default_value_t = 4)]
    pub jobs: usize,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum StateCommand {
    /// List tracked instances
    List,

    /// Stop tracking an instance without touching the host
    Forget {
        /// Identity (//host/vswitches/name) or switch name on the current host
        target: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lifecycle_flags() {
        assert_eq!(LifecycleArgs::default().options(), None);

        let cli = Cli::try_parse_from([
            "hvctl",
            "vswitch",
            "create",
            "br0",
            "--import-if-exists",
            "--destroy-if-imported",
        ])
        .unwrap();
        let Command::Vswitch(VSwitchCommand::Create { switch, lifecycle }) = cli.command else {
            panic!("expected vswitch create");
        };
        assert_eq!(switch.name, "br0");
        assert_eq!(switch.switch_type, None);
        let options = lifecycle.options().unwrap();
        assert!(options.create.import_if_exists);
        assert!(options.create.destroy_if_imported);
        assert!(!options.read.ignore_error_if_not_exists);
    }

    #[test]
    fn test_adapter_flags_conflict() {
        let result = Cli::try_parse_from([
            "hvctl",
            "vswitch",
            "create",
            "uplink",
            "--net-adapter-name",
            "Ethernet",
            "--net-adapter-interface-description",
            "Intel",
        ]);
        assert!(result.is_err());
    }
}
