//! Hyper-V virtual network adapters.
//!
//! Lookup rules:
//! - name and machine: the adapter of that machine
//! - machine only: the machine's single adapter
//! - name only: the management OS adapter, else the single adapter with
//!   that name on any machine
//!
//! More than one match is an error asking for a machine name.

use crate::client::Client;
use crate::query::VNetworkAdapterKey;
use crate::script::Script;
use crate::types::VNetworkAdapter;
use reconcile::{Fetch, NaturalKey, Operation};

pub const READ: Script = Script::new(
    "read_vnetwork_adapter",
    r#"$name = '{{name}}'
$vmName = '{{vmachine_name}}'
if ($vmName) {
    $candidates = @(Get-VMNetworkAdapter -VMName $vmName -ErrorAction Ignore)
    if ($name) {
        $candidates = @($candidates | Where-Object { $_.Name -eq $name })
    }
} else {
    $candidates = @(Get-VMNetworkAdapter -ManagementOS -ErrorAction Ignore | Where-Object { $_.Name -eq $name })
    if ($candidates.Count -eq 0) {
        $candidates = @(Get-VMNetworkAdapter -All -ErrorAction Ignore | Where-Object { $_.Name -eq $name })
    }
}
if ($candidates.Count -eq 0) {
    throw "HVKIT_NOT_FOUND: cannot find vnetwork_adapter '$name' (vmachine '$vmName')"
}
if ($candidates.Count -gt 1) {
    throw "$($candidates.Count) virtual network adapters match '$name', set vmachine_name"
}

$vnic = $candidates[0]
$mac = "$($vnic.MacAddress)"
if ($mac -match '^0*$') {
    $mac = ''
}
[ordered]@{
    Name = $vnic.Name
    VMachineName = if ($vnic.IsManagementOs) { '' } else { $vnic.VMName }
    MACAddress = ($mac -split '(\w{2})' | Where-Object { $_ }) -join '-'
    AllowMACAddressSpoofing = "$($vnic.MacAddressSpoofing)" -eq 'On'
    VSwitchName = "$($vnic.SwitchName)"
} | ConvertTo-Json -Compress"#,
);

#[derive(Debug, Clone)]
pub struct VNetworkAdapterGateway {
    client: Client,
}

impl VNetworkAdapterGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for VNetworkAdapterGateway {
    type Key = VNetworkAdapterKey;
    type Record = VNetworkAdapter;

    const TYPE_NAME: &'static str = "vnetwork_adapter";
    const COLLECTION: &'static str = "vnetwork_adapters";
    const KEYS_IGNORE_CASE: bool = true;

    fn fetch(&self, key: &VNetworkAdapterKey) -> reconcile::Result<VNetworkAdapter> {
        key.check()
            .and_then(|()| self.client.query(&READ, key))
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, key.display()))
    }
}
