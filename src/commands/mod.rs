// Single-instance verbs
pub mod vswitch;

// Data-source lookups
pub mod show;

// Declarative plan / apply
pub mod apply;

// Tracked instances
pub mod state;

use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;

use crate::Context;
use crate::config::ProviderConfig;
use crate::paths;
use crate::state::StateFile;

/// Open a client for the configured host.
pub fn connect(ctx: &Context) -> Result<hvkit::Client> {
    let config = ProviderConfig::load(ctx.config.as_deref())?;
    let connection = config.connection()?;
    log::info!("Using {connection}");
    hvkit::Client::new(&connection).context("Failed to prepare host scripts")
}

/// Load the state file named on the command line, or the default one.
pub fn open_state(ctx: &Context) -> Result<StateFile> {
    StateFile::load(&paths::state_file(ctx.state.as_deref())?)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    println!("{json}");
    Ok(())
}
