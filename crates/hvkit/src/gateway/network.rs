//! Network connection profiles.

use crate::client::Client;
use crate::gateway::NameArgs;
use crate::script::Script;
use crate::types::Network;
use reconcile::{Fetch, Operation};

pub const READ: Script = Script::new(
    "read_network",
    r#"$name = '{{name}}'
$connectionProfile = Get-NetConnectionProfile -ErrorAction Ignore |
    Where-Object { $_.Name -eq $name } |
    Select-Object -First 1
if (-not $connectionProfile) {
    throw "HVKIT_NOT_FOUND: cannot find network '$name'"
}
[ordered]@{
    Name = $connectionProfile.Name
    ConnectionProfile = "$($connectionProfile.NetworkCategory)"
} | ConvertTo-Json -Compress"#,
);

#[derive(Debug, Clone)]
pub struct NetworkGateway {
    client: Client,
}

impl NetworkGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for NetworkGateway {
    type Key = String;
    type Record = Network;

    const TYPE_NAME: &'static str = "network";
    const COLLECTION: &'static str = "networks";
    const KEYS_IGNORE_CASE: bool = true;

    fn fetch(&self, key: &String) -> reconcile::Result<Network> {
        self.client
            .query(&READ, &NameArgs { name: key })
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedExecutor, success};

    #[test]
    fn test_fetch_network() {
        let executor =
            ScriptedExecutor::new([success(r#"{"Name":"corp","ConnectionProfile":"DomainAuthenticated"}"#)]);
        let client = Client::with_executor("hv01", executor).unwrap();

        let network = client.networks().fetch(&"corp".to_string()).unwrap();
        assert_eq!(network.connection_profile, "DomainAuthenticated");
    }
}
