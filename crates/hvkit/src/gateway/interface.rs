//! Network interfaces, located by any of several alternate keys.

use crate::client::Client;
use crate::query::InterfaceKey;
use crate::script::Script;
use crate::types::Interface;
use reconcile::{Fetch, NaturalKey, Operation};
use serde::Serialize;

pub const READ: Script = Script::new(
    "read_interface",
    r#"$by = '{{by}}'
$value = '{{value}}'
$candidates = switch ($by) {
    'index' { Get-NetAdapter | Where-Object { $_.ifIndex -eq [int]$value } }
    'name' { Get-NetAdapter | Where-Object { $_.InterfaceName -eq $value } }
    'alias' { Get-NetAdapter | Where-Object { $_.InterfaceAlias -eq $value } }
    'description' { Get-NetAdapter | Where-Object { $_.InterfaceDescription -eq $value } }
    'mac_address' {
        $mac = $value -replace '[-:]', ''
        Get-NetAdapter | Where-Object { ($_.MacAddress -replace '[-:]', '') -eq $mac }
    }
    'network_adapter_name' { Get-NetAdapter | Where-Object { $_.Name -eq $value } }
    'vnetwork_adapter_name' {
        Get-NetAdapter | Where-Object { $_.Name -eq "vEthernet ($value)" }
    }
}
$adapter = $candidates | Select-Object -First 1
if (-not $adapter) {
    throw "HVKIT_NOT_FOUND: cannot find interface with $by '$value'"
}

$vnic = Get-VMNetworkAdapter -ManagementOS -ErrorAction Ignore |
    Where-Object { "vEthernet ($($_.Name))" -eq $adapter.Name } |
    Select-Object -First 1
$connectionProfile = Get-NetConnectionProfile -InterfaceIndex $adapter.ifIndex -ErrorAction Ignore |
    Select-Object -First 1

[ordered]@{
    Index = $adapter.ifIndex
    Name = $adapter.InterfaceName
    Alias = $adapter.InterfaceAlias
    Description = $adapter.InterfaceDescription
    MACAddress = $adapter.MacAddress
    NetworkAdapterName = $adapter.Name
    VNetworkAdapterName = if ($vnic) { $vnic.Name } else { '' }
    NetworkName = if ($connectionProfile) { $connectionProfile.Name } else { '' }
    ComputerName = $adapter.SystemName
} | ConvertTo-Json -Compress"#,
);

#[derive(Serialize)]
struct KeyArgs {
    by: &'static str,
    value: String,
}

#[derive(Debug, Clone)]
pub struct InterfaceGateway {
    client: Client,
}

impl InterfaceGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for InterfaceGateway {
    type Key = InterfaceKey;
    type Record = Interface;

    const TYPE_NAME: &'static str = "interface";
    const COLLECTION: &'static str = "interfaces";

    fn fetch(&self, key: &InterfaceKey) -> reconcile::Result<Interface> {
        let args = KeyArgs {
            by: key.by(),
            value: key.value(),
        };
        self.client
            .query(&READ, &args)
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, key.display()))
    }
}
