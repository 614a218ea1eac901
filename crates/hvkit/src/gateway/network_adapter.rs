//! Network adapters of the management OS.

use crate::client::Client;
use crate::gateway::NameArgs;
use crate::script::Script;
use crate::types::NetworkAdapter;
use reconcile::{Fetch, Operation};

pub const READ: Script = Script::new(
    "read_network_adapter",
    r#"$name = '{{name}}'
$adapter = Get-NetAdapter | Where-Object { $_.Name -eq $name } | Select-Object -First 1
if (-not $adapter) {
    throw "HVKIT_NOT_FOUND: cannot find network_adapter '$name'"
}
$index = $adapter.ifIndex

$ipv4 = Get-NetAdapterBinding -Name $adapter.Name -ComponentID ms_tcpip -ErrorAction Ignore
$ipv6 = Get-NetAdapterBinding -Name $adapter.Name -ComponentID ms_tcpip6 -ErrorAction Ignore
$ipv4Interface = Get-NetIPInterface -InterfaceIndex $index -AddressFamily IPv4 -ErrorAction Ignore
$ipv6Interface = Get-NetIPInterface -InterfaceIndex $index -AddressFamily IPv6 -ErrorAction Ignore
$dnsClient = Get-DnsClient -InterfaceIndex $index -ErrorAction Ignore

$addresses = @(Get-NetIPAddress -InterfaceIndex $index -AddressState Preferred -ErrorAction Ignore | ForEach-Object {
    [ordered]@{
        Address = $_.IPAddress
        PrefixLength = $_.PrefixLength
        SkipAsSource = $_.SkipAsSource
    }
})
$gateways = @(Get-NetRoute -InterfaceIndex $index -ErrorAction Ignore |
    Where-Object { $_.DestinationPrefix -in '0.0.0.0/0', '::/0' } |
    ForEach-Object {
        [ordered]@{
            Address = $_.NextHop
            RouteMetric = $_.RouteMetric
        }
    })
$dnsServers = @(Get-DnsClientServerAddress -InterfaceIndex $index -ErrorAction Ignore |
    ForEach-Object { $_.ServerAddresses })

[ordered]@{
    Name = $adapter.Name
    MACAddress = $adapter.MacAddress
    IPv4InterfaceDisabled = -not $ipv4.Enabled
    IPv4InterfaceMetric = $ipv4Interface.InterfaceMetric
    IPv6InterfaceDisabled = -not $ipv6.Enabled
    IPv6InterfaceMetric = $ipv6Interface.InterfaceMetric
    RegisterConnectionAddress = $dnsClient.RegisterThisConnectionsAddress
    RegisterConnectionSuffix = $dnsClient.ConnectionSpecificSuffix
    IPAddresses = $addresses
    Gateways = $gateways
    DNServers = $dnsServers
    AdminStatus = "$($adapter.AdminStatus)"
    OperationalStatus = "$($adapter.ifOperStatus)"
    ConnectionStatus = "$($adapter.MediaConnectionState)"
    ConnectionSpeed = $adapter.LinkSpeed
    IsPhysical = [bool]$adapter.ConnectorPresent
} | ConvertTo-Json -Depth 4 -Compress"#,
);

#[derive(Debug, Clone)]
pub struct NetworkAdapterGateway {
    client: Client,
}

impl NetworkAdapterGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for NetworkAdapterGateway {
    type Key = String;
    type Record = NetworkAdapter;

    const TYPE_NAME: &'static str = "network_adapter";
    const COLLECTION: &'static str = "network_adapters";
    const KEYS_IGNORE_CASE: bool = true;

    fn fetch(&self, key: &String) -> reconcile::Result<NetworkAdapter> {
        self.client
            .query(&READ, &NameArgs { name: key })
            .map_err(|e| e.into_reconcile(Operation::Fetch, Self::TYPE_NAME, key.as_str()))
    }
}
