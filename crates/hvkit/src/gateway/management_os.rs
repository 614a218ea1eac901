//! Management OS information, a singleton per host.

use crate::client::Client;
use crate::script::Script;
use crate::types::ManagementOs;
use reconcile::{Fetch, Operation};

pub const READ: Script = Script::new(
    "read_management_os",
    r#"$dns = Get-DnsClientGlobalSetting
[ordered]@{
    Name = $env:ComputerName
    DNS_SuffixSearchList = @($dns.SuffixSearchList)
    DNS_EnableDevolution = [bool]$dns.UseDevolution
    DNS_DevolutionLevel = [int]$dns.DevolutionLevel
} | ConvertTo-Json -Compress"#,
);

#[derive(Debug, Clone)]
pub struct ManagementOsGateway {
    client: Client,
}

impl ManagementOsGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for ManagementOsGateway {
    type Key = ();
    type Record = ManagementOs;

    const TYPE_NAME: &'static str = "management_os";
    const COLLECTION: &'static str = "management_os";

    fn fetch(&self, _key: &()) -> reconcile::Result<ManagementOs> {
        self.client
            .query(&READ, &())
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedExecutor, success};

    #[test]
    fn test_fetch_management_os() {
        let executor = ScriptedExecutor::new([success(
            r#"{"Name":"HV01","DNS_SuffixSearchList":["corp.example.com"],"DNS_EnableDevolution":true,"DNS_DevolutionLevel":0}"#,
        )]);
        let client = Client::with_executor("hv01", executor).unwrap();

        let os = client.management_os().fetch(&()).unwrap();
        assert_eq!(os.name, "HV01");
        assert_eq!(os.dns_suffix_search_list, ["corp.example.com"]);
    }
}
