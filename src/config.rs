//! Provider and resource configuration files

use anyhow::{Context, Result, bail};
use hvkit::{Connection, LocalConnection, SshConnection, connection::DEFAULT_POWERSHELL};
use reconcile::Declared;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::paths;
use crate::resource::{VSwitchConfig, VSwitchDeclaration};

// ============================================================================
// Provider Config
// ============================================================================

/// Contents of `config.toml`: how to reach the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectionConfig {
    Local {
        #[serde(default = "default_local_host")]
        host: String,
        #[serde(default = "default_powershell")]
        powershell: String,
    },
    Ssh {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
        user: String,
        /// Name of the environment variable holding the password
        #[serde(default)]
        password_env: Option<String>,
        #[serde(default)]
        insecure: bool,
        #[serde(default)]
        multiplex: bool,
    },
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::Local {
            host: default_local_host(),
            powershell: default_powershell(),
        }
    }
}

fn default_local_host() -> String {
    "localhost".to_string()
}

fn default_powershell() -> String {
    DEFAULT_POWERSHELL.to_string()
}

fn default_port() -> u16 {
    22
}

impl ProviderConfig {
    /// Load the provider config.
    ///
    /// An explicit path must exist. Without one, a missing default file means
    /// local execution on "localhost".
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let path = paths::config_file(explicit)?;
        if !path.exists() {
            if explicit.is_some() {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!(
                "No config at {}, using local execution",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the connection descriptor, reading the password from the
    /// environment.
    pub fn connection(&self) -> Result<Connection> {
        self.connection_with(|name| std::env::var(name).ok())
    }

    fn connection_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Connection> {
        match &self.connection {
            ConnectionConfig::Local { host, powershell } => Ok(Connection::Local(LocalConnection {
                host: host.clone(),
                powershell: powershell.clone(),
            })),
            ConnectionConfig::Ssh {
                host,
                port,
                user,
                password_env,
                insecure,
                multiplex,
            } => {
                let password = match password_env {
                    Some(name) => Some(env(name).with_context(|| {
                        format!("Environment variable {name} (password_env) is not set")
                    })?),
                    None => None,
                };
                let mut ssh = SshConnection::new(host.clone(), user.clone());
                ssh.port = *port;
                ssh.password = password;
                ssh.insecure = *insecure;
                ssh.multiplex = *multiplex;
                Ok(Connection::Ssh(ssh))
            }
        }
    }
}

// ============================================================================
// Resources File
// ============================================================================

/// Contents of `hvctl.resources.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesFile {
    #[serde(default)]
    pub vswitch: Vec<VSwitchDeclaration>,
}

impl ResourcesFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid resources file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Declared switches, in file order.
    pub fn vswitches(&self) -> Vec<Declared<VSwitchConfig>> {
        self.vswitch
            .iter()
            .map(|d| Declared::new(d.config.clone(), d.x_lifecycle))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local() {
        let config = ProviderConfig::parse("").unwrap();
        let connection = config.connection().unwrap();
        assert_eq!(connection.host(), "localhost");
        assert!(matches!(connection, Connection::Local(ref l) if l.powershell == "powershell.exe"));
    }

    #[test]
    fn test_ssh_connection_with_password_env() {
        let config = ProviderConfig::parse(
            r#"
            [connection]
            type = "ssh"
            host = "hv01"
            user = "admin"
            password_env = "HV01_PASSWORD"
            insecure = true
            "#,
        )
        .unwrap();

        let connection = config
            .connection_with(|name| (name == "HV01_PASSWORD").then(|| "hunter2".to_string()))
            .unwrap();
        let Connection::Ssh(ssh) = connection else {
            panic!("expected an ssh connection");
        };
        assert_eq!(ssh.port, 22);
        assert_eq!(ssh.password.as_deref(), Some("hunter2"));
        assert!(ssh.insecure);
        assert!(!ssh.multiplex);
    }

    #[test]
    fn test_missing_password_variable() {
        let config = ProviderConfig::parse(
            r#"
            [connection]
            type = "ssh"
            host = "hv01"
            user = "admin"
            password_env = "HV01_PASSWORD"
            "#,
        )
        .unwrap();
        let err = config.connection_with(|_| None).unwrap_err();
        assert!(err.to_string().contains("HV01_PASSWORD"));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(ProviderConfig::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_resources_file() {
        let resources = ResourcesFile::parse(
            r#"
            [[vswitch]]
            name = "br0"

            [[vswitch]]
            name = "uplink"
            switch_type = "external"
            net_adapter_name = "Ethernet"

            [vswitch.x_lifecycle]
            import_if_exists = true
            destroy_if_imported = true
            "#,
        )
        .unwrap();

        let declared = resources.vswitches();
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].record.switch_type, "internal");
        assert!(declared[0].lifecycle.is_none());
        let lifecycle = declared[1].lifecycle.unwrap();
        assert!(lifecycle.create.import_if_exists);
        assert!(lifecycle.create.destroy_if_imported);
    }

    #[test]
    fn test_resources_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hvctl.resources.toml");
        fs::write(&path, "[[vswitch]]\nname = \"br0\"\nnotes = \"lab\"\n").unwrap();

        let resources = ResourcesFile::load(&path).unwrap();
        assert_eq!(resources.vswitch[0].config.notes, "lab");
    }
}
