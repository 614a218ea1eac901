//! Connection descriptors.
//!
//! Pure data describing how to reach a host. The host label is always
//! explicit, including for local execution, because it scopes every
//! resource identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default PowerShell program for local execution.
pub const DEFAULT_POWERSHELL: &str = "powershell.exe";

/// How to reach a Hyper-V host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Connection {
    /// Run PowerShell on this machine
    Local(LocalConnection),
    /// Run PowerShell on a remote host through the system `ssh` client
    Ssh(SshConnection),
}

impl Connection {
    /// Label used in resource identities.
    pub fn host(&self) -> &str {
        match self {
            Self::Local(local) => &local.host,
            Self::Ssh(ssh) => &ssh.host,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "local ({})", local.host),
            Self::Ssh(ssh) => write!(f, "ssh://{}@{}:{}", ssh.user, ssh.host, ssh.port),
        }
    }
}

/// Local execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConnection {
    /// Label for this machine, e.g. "localhost"
    pub host: String,
    /// PowerShell program to run
    #[serde(default = "default_powershell")]
    pub powershell: String,
}

impl LocalConnection {
    /// Local connection with the default PowerShell program.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            powershell: default_powershell(),
        }
    }
}

fn default_powershell() -> String {
    DEFAULT_POWERSHELL.to_string()
}

/// Remote execution over SSH.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConnection {
    /// Host name or address
    pub host: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user
    pub user: String,
    /// Password, passed to `sshpass` through the environment
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Skip host key verification
    #[serde(default)]
    pub insecure: bool,
    /// Share one SSH connection between calls; calls are then serialized
    #[serde(default)]
    pub multiplex: bool,
}

impl SshConnection {
    /// Key-based SSH connection on the default port.
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            user: user.into(),
            password: None,
            insecure: false,
            multiplex: false,
        }
    }

    /// `user@host` destination argument.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

// Keeps the password out of log lines.
impl fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("insecure", &self.insecure)
            .field("multiplex", &self.multiplex)
            .finish()
    }
}

fn default_port() -> u16 {
    22
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_is_explicit() {
        let local = Connection::Local(LocalConnection::new("localhost"));
        assert_eq!(local.host(), "localhost");

        let ssh = Connection::Ssh(SshConnection::new("hv01", "admin"));
        assert_eq!(ssh.host(), "hv01");
        assert_eq!(ssh.to_string(), "ssh://admin@hv01:22");
    }

    #[test]
    fn test_debug_hides_password() {
        let mut ssh = SshConnection::new("hv01", "admin");
        ssh.password = Some("hunter2".into());
        let text = format!("{ssh:?}");
        assert!(!text.contains("hunter2"));
        assert!(text.contains("********"));
    }

    #[test]
    fn test_deserialize_tagged() {
        let conn: Connection = serde_json::from_str(
            r#"{"type": "ssh", "host": "hv01", "user": "admin", "insecure": true}"#,
        )
        .unwrap();
        match conn {
            Connection::Ssh(ssh) => {
                assert_eq!(ssh.port, 22);
                assert!(ssh.insecure);
                assert!(!ssh.multiplex);
                assert!(ssh.password.is_none());
            }
            other => panic!("unexpected connection: {other:?}"),
        }

        let conn: Connection =
            serde_json::from_str(r#"{"type": "local", "host": "localhost"}"#).unwrap();
        assert_eq!(
            conn,
            Connection::Local(LocalConnection {
                host: "localhost".into(),
                powershell: DEFAULT_POWERSHELL.into(),
            })
        );
    }
}
