//! Command executors.
//!
//! The [`Executor`] trait runs one rendered PowerShell script and hands back
//! whatever the process printed, allowing for different implementations
//! (local process, SSH, scripted doubles for testing).

pub mod local;
pub mod ssh;

use crate::connection::Connection;
use crate::error::{Error, Result};
use reconcile::Diagnostics;
use std::io::Write;
use std::process::{Command, Stdio};

/// Arguments that make PowerShell read its script from stdin.
pub const POWERSHELL_ARGS: [&str; 4] = ["-NoProfile", "-NonInteractive", "-Command", "-"];

/// Output of one script run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output; one JSON document for read scripts
    pub stdout: String,
    /// Standard error; diagnostics only
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the script exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Keep the output for an error report.
    pub fn into_diagnostics(self) -> Diagnostics {
        Diagnostics {
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Runs rendered scripts against one host.
pub trait Executor: Send + Sync {
    /// Run `script` and capture its output.
    ///
    /// A script that runs and fails is not an error here; only failing to
    /// run it at all is.
    fn execute(&self, script: &str) -> Result<CommandOutput>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Build the executor for a connection descriptor.
pub fn for_connection(connection: &Connection) -> Box<dyn Executor> {
    match connection {
        Connection::Local(local) => Box::new(local::LocalExecutor::new(&local.powershell)),
        Connection::Ssh(ssh) => Box::new(ssh::SshExecutor::new(ssh.clone())),
    }
}

/// Spawn `command`, feed `input` on stdin and collect the output.
pub(crate) fn run_with_stdin(
    mut command: Command,
    program: &str,
    input: &str,
) -> Result<CommandOutput> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    // Write from a separate thread so a chatty child cannot block on a full
    // stdout pipe while we are still writing.
    let stdin = child.stdin.take();
    let output = std::thread::scope(|scope| {
        let writer = scope.spawn(move || -> std::io::Result<()> {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            // blank lines terminate any open multi-line statement
            let written = stdin
                .write_all(input.as_bytes())
                .and_then(|()| stdin.write_all(b"\n\n"));
            match written {
                // the child exited early; its output says why
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        });
        let output = child.wait_with_output();
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
        output.and_then(|output| written.map(|()| output))
    })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}
