//! Local PowerShell executor.

use crate::error::Result;
use crate::executor::{CommandOutput, Executor, POWERSHELL_ARGS, run_with_stdin};
use std::process::Command;

/// Runs scripts with a PowerShell process on this machine.
///
/// Every call starts a fresh process, so calls never share state and need
/// no serialization.
pub struct LocalExecutor {
    program: String,
}

impl LocalExecutor {
    /// Executor using `program`, e.g. `powershell.exe` or `pwsh`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(POWERSHELL_ARGS);
        command
    }
}

impl Executor for LocalExecutor {
    fn execute(&self, script: &str) -> Result<CommandOutput> {
        log::trace!("running script locally with {}", self.program);
        run_with_stdin(self.command(), &self.program, script)
    }

    fn describe(&self) -> String {
        format!("local {}", self.program)
    }
}
