//! Host client shared by the gateways.

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::executor::{self, Executor};
use crate::gateway::{
    self, InterfaceGateway, ManagementOsGateway, NetworkAdapterGateway, NetworkGateway,
    VNetworkAdapterGateway, VSwitchGateway,
};
use crate::script::{Script, Scripts};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Cheap to clone handle on one host: an executor plus the compiled
/// script templates.
#[derive(Clone)]
pub struct Client {
    executor: Arc<dyn Executor>,
    scripts: Arc<Scripts>,
    host: String,
}

impl Client {
    /// Client for a connection descriptor.
    pub fn new(connection: &Connection) -> Result<Self> {
        Self::with_executor(
            connection.host(),
            Arc::from(executor::for_connection(connection)),
        )
    }

    /// Client running scripts through `executor`; `host` labels identities.
    pub fn with_executor(host: impl Into<String>, executor: Arc<dyn Executor>) -> Result<Self> {
        let scripts = Scripts::new(&gateway::all_scripts())?;
        Ok(Self {
            executor,
            scripts: Arc::new(scripts),
            host: host.into(),
        })
    }

    /// Host label.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Run a script for its side effect and return its stdout.
    pub fn run<A: Serialize>(&self, script: &Script, args: &A) -> Result<String> {
        let rendered = self.scripts.render(script, args)?;
        log::debug!("running {} via {}", script.name, self.executor.describe());

        let output = self.executor.execute(&rendered)?;
        if !output.success() {
            return Err(Error::Script {
                script: script.name,
                diagnostics: output.into_diagnostics(),
            });
        }
        Ok(output.stdout)
    }

    /// Run a script and decode the JSON document it prints.
    pub fn query<T, A>(&self, script: &Script, args: &A) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize,
    {
        let stdout = self.run(script, args)?;
        serde_json::from_str(stdout.trim()).map_err(|source| Error::Decode {
            script: script.name,
            source,
            stdout,
        })
    }

    pub fn vswitches(&self) -> VSwitchGateway {
        VSwitchGateway::new(self.clone())
    }

    pub fn network_adapters(&self) -> NetworkAdapterGateway {
        NetworkAdapterGateway::new(self.clone())
    }

    pub fn interfaces(&self) -> InterfaceGateway {
        InterfaceGateway::new(self.clone())
    }

    pub fn networks(&self) -> NetworkGateway {
        NetworkGateway::new(self.clone())
    }

    pub fn vnetwork_adapters(&self) -> VNetworkAdapterGateway {
        VNetworkAdapterGateway::new(self.clone())
    }

    pub fn management_os(&self) -> ManagementOsGateway {
        ManagementOsGateway::new(self.clone())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("executor", &self.executor.describe())
            .finish_non_exhaustive()
    }
}
