//! SSH executor using the system `ssh` client.
//!
//! Passwords go through `sshpass -e`, which reads them from the `SSHPASS`
//! environment variable, so they never appear on a command line.

use crate::connection::SshConnection;
use crate::error::{Error, Result};
use crate::executor::{CommandOutput, Executor, POWERSHELL_ARGS, run_with_stdin};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Mutex, PoisonError};

/// Exit status the ssh client uses for its own failures.
const SSH_FAILURE: i32 = 255;

/// Runs scripts on a remote host through `ssh`.
pub struct SshExecutor {
    connection: SshConnection,
    control_dir: PathBuf,
    /// Held for the duration of a call when the connection is multiplexed.
    session: Mutex<()>,
}

impl SshExecutor {
    /// Executor for `connection`, keeping control sockets in the system
    /// temp directory.
    pub fn new(connection: SshConnection) -> Self {
        Self::with_control_dir(connection, std::env::temp_dir())
    }

    /// Executor keeping multiplexing control sockets in `control_dir`.
    pub fn with_control_dir(connection: SshConnection, control_dir: impl Into<PathBuf>) -> Self {
        Self {
            connection,
            control_dir: control_dir.into(),
            session: Mutex::new(()),
        }
    }

    /// Program that is spawned: `sshpass` when a password is set.
    fn program(&self) -> &'static str {
        if self.connection.password.is_some() {
            "sshpass"
        } else {
            "ssh"
        }
    }

    /// Arguments passed to [`Self::program`].
    pub fn args(&self) -> Vec<String> {
        let conn = &self.connection;
        let mut args = Vec::new();

        if conn.password.is_some() {
            args.extend(["-e".to_string(), "ssh".to_string()]);
        } else {
            // no terminal to prompt on
            args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
        }
        args.extend(["-p".to_string(), conn.port.to_string()]);
        if conn.insecure {
            args.extend([
                "-o".to_string(),
                "StrictHostKeyChecking=no".to_string(),
                "-o".to_string(),
                "UserKnownHostsFile=/dev/null".to_string(),
            ]);
        }
        if conn.multiplex {
            let socket = self.control_dir.join("hvctl-%r@%h:%p");
            args.extend([
                "-o".to_string(),
                "ControlMaster=auto".to_string(),
                "-o".to_string(),
                format!("ControlPath={}", socket.display()),
                "-o".to_string(),
                "ControlPersist=60".to_string(),
            ]);
        }
        args.push(conn.destination());
        args.push(format!("powershell {}", POWERSHELL_ARGS.join(" ")));
        args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.program());
        command.args(self.args());
        if let Some(password) = &self.connection.password {
            command.env("SSHPASS", password);
        }
        command
    }
}

impl Executor for SshExecutor {
    fn execute(&self, script: &str) -> Result<CommandOutput> {
        let _session = self
            .connection
            .multiplex
            .then(|| self.session.lock().unwrap_or_else(PoisonError::into_inner));

        log::trace!("running script on {}", self.connection.destination());
        let output = run_with_stdin(self.command(), self.program(), script)?;

        if output.exit_code == Some(SSH_FAILURE) {
            return Err(Error::Connection {
                host: self.connection.host.clone(),
                diagnostics: output.into_diagnostics(),
            });
        }
        Ok(output)
    }

    fn describe(&self) -> String {
        format!(
            "ssh {}:{}",
            self.connection.destination(),
            self.connection.port
        )
    }
}
