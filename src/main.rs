mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod resource;
mod state;
#[cfg(test)]
mod testing;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<String>,
    pub state: Option<String>,
    pub resources: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        state: cli.state,
        resources: cli.resources,
    };

    let result = match cli.command {
        Command::Vswitch(cmd) => commands::vswitch::run(&ctx, cmd),
        Command::Show(cmd) => commands::show::run(&ctx, cmd),
        Command::Plan(args) => commands::apply::plan(&ctx, args),
        Command::Apply(args) => commands::apply::apply(&ctx, args),
        Command::State(cmd) => commands::state::run(&ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "hvctl", &mut io::stdout());
            Ok(())
        }
    };

    // Reconciliation errors carry a category with advice for the user
    if let Err(err) = &result
        && let Some(reconcile_err) = err.downcast_ref::<reconcile::Error>()
    {
        ui::reconcile_error(reconcile_err, ctx.verbose > 0);
        std::process::exit(1);
    }
    result
}
