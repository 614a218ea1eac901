//! Virtual switches.

use crate::client::Client;
use crate::gateway::NameArgs;
use crate::script::{Script, json_argument};
use crate::types::VSwitch;
use reconcile::{Fetch, Gateway, Operation};
use serde::Serialize;

pub const READ: Script = Script::new(
    "read_vswitch",
    r#"$name = '{{name}}'
$vmSwitch = Get-VMSwitch | Where-Object { $_.Name -eq $name } | Select-Object -First 1
if (-not $vmSwitch) {
    throw "HVKIT_NOT_FOUND: cannot find vswitch '$name'"
}

$result = [ordered]@{
    Name = $vmSwitch.Name
    SwitchType = "$($vmSwitch.SwitchType)".ToLowerInvariant()
    Notes = $vmSwitch.Notes
    AllowManagementOS = $vmSwitch.AllowManagementOS
}
if ($vmSwitch.NetAdapterInterfaceDescription) {
    $adapter = Get-NetAdapter -InterfaceDescription $vmSwitch.NetAdapterInterfaceDescription -ErrorAction Ignore
    $result.NetAdapterInterfaceDescription = $vmSwitch.NetAdapterInterfaceDescription
    $result.NetAdapterName = $adapter.Name
}
$result | ConvertTo-Json -Depth 4 -Compress"#,
);

/// Parameters shared by create and update. Adapter settings only apply to
/// external switches.
macro_rules! switch_parameters {
    () => {
        r#"if ($vswitch.SwitchType -ne 'external') {
    $params.SwitchType = $vswitch.SwitchType
} else {
    if ($null -ne $vswitch.AllowManagementOS) {
        $params.AllowManagementOS = $vswitch.AllowManagementOS
    }
    if ($vswitch.NetAdapterName) {
        $params.NetAdapterName = $vswitch.NetAdapterName
    } elseif ($vswitch.NetAdapterInterfaceDescription) {
        $params.NetAdapterInterfaceDescription = $vswitch.NetAdapterInterfaceDescription
    }
}
"#
    };
}

pub const CREATE: Script = Script::new(
    "create_vswitch",
    concat!(
        r#"$vswitch = '{{vswitch}}' | ConvertFrom-Json
if (Get-VMSwitch | Where-Object { $_.Name -eq $vswitch.Name }) {
    throw "HVKIT_ALREADY_EXISTS: vswitch '$($vswitch.Name)' already exists"
}

$params = @{
    Name = $vswitch.Name
    Notes = $vswitch.Notes
}
"#,
        switch_parameters!(),
        "New-VMSwitch @params | Out-Null"
    ),
);

pub const UPDATE: Script = Script::new(
    "update_vswitch",
    concat!(
        r#"$name = '{{name}}'
$vswitch = '{{vswitch}}' | ConvertFrom-Json
$vmSwitch = Get-VMSwitch | Where-Object { $_.Name -eq $name } | Select-Object -First 1
if (-not $vmSwitch) {
    throw "HVKIT_NOT_FOUND: cannot find vswitch '$name'"
}

$params = @{
    VMSwitch = $vmSwitch
    Notes = $vswitch.Notes
}
"#,
        switch_parameters!(),
        "Set-VMSwitch @params"
    ),
);

pub const DELETE: Script = Script::new(
    "delete_vswitch",
    r#"$name = '{{name}}'
$vmSwitch = Get-VMSwitch | Where-Object { $_.Name -eq $name }
if (-not $vmSwitch) {
    throw "HVKIT_NOT_FOUND: cannot find vswitch '$name'"
}
$vmSwitch | Remove-VMSwitch -Force"#,
);

pub const SCRIPTS: [Script; 4] = [READ, CREATE, UPDATE, DELETE];

#[derive(Serialize)]
struct UpdateArgs<'a> {
    name: &'a str,
    vswitch: String,
}

#[derive(Serialize)]
struct CreateArgs {
    vswitch: String,
}

/// Fetch, create, update and remove virtual switches.
#[derive(Debug, Clone)]
pub struct VSwitchGateway {
    client: Client,
}

impl VSwitchGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for VSwitchGateway {
    type Key = String;
    type Record = VSwitch;

    const TYPE_NAME: &'static str = "vswitch";
    const COLLECTION: &'static str = "vswitches";
    const KEYS_IGNORE_CASE: bool = true;

    fn fetch(&self, key: &String) -> reconcile::Result<VSwitch> {
        self.client
            .query(&READ, &NameArgs { name: key })
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, key.as_str()))
    }
}

impl Gateway for VSwitchGateway {
    fn create(&self, record: &VSwitch) -> reconcile::Result<()> {
        let fail = |e: crate::Error| {
            e.into_reconcile(Operation::Create, Self::TYPE_NAME, record.name.as_str())
        };
        let args = CreateArgs {
            vswitch: json_argument(record).map_err(fail)?,
        };
        self.client.run(&CREATE, &args).map_err(fail)?;
        Ok(())
    }

    fn update(&self, key: &String, record: &VSwitch) -> reconcile::Result<()> {
        let fail =
            |e: crate::Error| e.into_reconcile(Operation::Update, Self::TYPE_NAME, key.as_str());
        let args = UpdateArgs {
            name: key,
            vswitch: json_argument(record).map_err(fail)?,
        };
        self.client.run(&UPDATE, &args).map_err(fail)?;
        Ok(())
    }

    fn remove(&self, key: &String) -> reconcile::Result<()> {
        self.client
            .run(&DELETE, &NameArgs { name: key })
            .map_err(|e| e.into_reconcile(Operation::Remove, Self::TYPE_NAME, key.as_str()))?;
        Ok(())
    }
}
