//! Records exchanged with the host.
//!
//! Field names follow the JSON documents the scripts print. PowerShell
//! serializes unset properties as `null`, so most fields accept `null` and
//! fall back to their default.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Hyper-V virtual switch.
///
/// The adapter fields and `AllowManagementOS` are only meaningful for
/// external switches and are omitted from the JSON when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VSwitch {
    /// Switch name; Hyper-V compares it case-insensitively
    pub name: String,
    /// `private`, `internal` or `external`, lower-case
    #[serde(default, deserialize_with = "nullable")]
    pub switch_type: String,
    /// Free-text notes
    #[serde(default, deserialize_with = "nullable")]
    pub notes: String,
    /// Whether the management OS shares the switch
    #[serde(
        rename = "AllowManagementOS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_management_os: Option<bool>,
    /// Name of the physical adapter bound to an external switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_adapter_name: Option<String>,
    /// Interface description of the physical adapter bound to an external switch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_adapter_interface_description: Option<String>,
}

/// An IP address assigned to a network adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddress {
    /// Address without prefix
    #[serde(default, deserialize_with = "nullable")]
    pub address: String,
    /// Prefix length in bits
    #[serde(default, deserialize_with = "nullable")]
    pub prefix_length: u8,
    /// Excluded from source address selection
    #[serde(default, deserialize_with = "nullable")]
    pub skip_as_source: bool,
}

/// A default gateway of a network adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefaultGateway {
    /// Next hop
    #[serde(default, deserialize_with = "nullable")]
    pub address: String,
    /// Route metric
    #[serde(default, deserialize_with = "nullable")]
    pub route_metric: u16,
}

/// A network adapter of the management OS (read-only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAdapter {
    /// Adapter name
    pub name: String,
    /// MAC address as reported by Windows
    #[serde(rename = "MACAddress", default, deserialize_with = "nullable")]
    pub mac_address: String,

    /// IPv4 binding disabled
    #[serde(rename = "IPv4InterfaceDisabled", default, deserialize_with = "nullable")]
    pub ipv4_interface_disabled: bool,
    /// IPv4 interface metric
    #[serde(rename = "IPv4InterfaceMetric", default, deserialize_with = "nullable")]
    pub ipv4_interface_metric: u32,
    /// IPv6 binding disabled
    #[serde(rename = "IPv6InterfaceDisabled", default, deserialize_with = "nullable")]
    pub ipv6_interface_disabled: bool,
    /// IPv6 interface metric
    #[serde(rename = "IPv6InterfaceMetric", default, deserialize_with = "nullable")]
    pub ipv6_interface_metric: u32,
    /// Register this connection's address in DNS
    #[serde(default, deserialize_with = "nullable")]
    pub register_connection_address: bool,
    /// Connection-specific DNS suffix used when registering
    #[serde(default, deserialize_with = "nullable")]
    pub register_connection_suffix: String,

    /// Preferred IPv4 and IPv6 addresses
    #[serde(rename = "IPAddresses", default, deserialize_with = "nullable")]
    pub ip_addresses: Vec<IpAddress>,
    /// Default gateways
    #[serde(default, deserialize_with = "nullable")]
    pub gateways: Vec<DefaultGateway>,
    /// DNS server addresses
    #[serde(rename = "DNServers", default, deserialize_with = "nullable")]
    pub dn_servers: Vec<String>,

    /// Administrative status, e.g. "Up"
    #[serde(default, deserialize_with = "nullable")]
    pub admin_status: String,
    /// Operational status
    #[serde(default, deserialize_with = "nullable")]
    pub operational_status: String,
    /// Media connection state
    #[serde(default, deserialize_with = "nullable")]
    pub connection_status: String,
    /// Link speed, e.g. "1 Gbps"
    #[serde(default, deserialize_with = "nullable")]
    pub connection_speed: String,
    /// Whether a physical connector is present
    #[serde(default, deserialize_with = "nullable")]
    pub is_physical: bool,
}

/// A network interface (read-only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Interface {
    /// Interface index
    #[serde(default, deserialize_with = "nullable")]
    pub index: u32,
    /// Interface name, e.g. "ethernet_32777"
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Interface alias, e.g. "Ethernet"
    #[serde(default, deserialize_with = "nullable")]
    pub alias: String,
    /// Interface description
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// MAC address
    #[serde(rename = "MACAddress", default, deserialize_with = "nullable")]
    pub mac_address: String,
    /// Name of the network adapter behind the interface
    #[serde(default, deserialize_with = "nullable")]
    pub network_adapter_name: String,
    /// Name of the virtual network adapter, for Hyper-V virtual adapters
    #[serde(rename = "VNetworkAdapterName", default, deserialize_with = "nullable")]
    pub vnetwork_adapter_name: String,
    /// Connection profile name
    #[serde(default, deserialize_with = "nullable")]
    pub network_name: String,
    /// Computer the interface belongs to
    #[serde(default, deserialize_with = "nullable")]
    pub computer_name: String,
}

/// A network connection profile (read-only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    /// Profile name
    pub name: String,
    /// Network category, e.g. "Private"
    #[serde(default, deserialize_with = "nullable")]
    pub connection_profile: String,
}

/// A Hyper-V virtual network adapter (read-only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VNetworkAdapter {
    /// Adapter name; not unique across virtual machines
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Owning virtual machine, empty for the management OS
    #[serde(rename = "VMachineName", default, deserialize_with = "nullable")]
    pub vmachine_name: String,
    /// MAC address, dash separated; empty while a dynamic adapter is unconnected
    #[serde(rename = "MACAddress", default, deserialize_with = "nullable")]
    pub mac_address: String,
    /// MAC address spoofing enabled
    #[serde(rename = "AllowMACAddressSpoofing", default, deserialize_with = "nullable")]
    pub allow_mac_address_spoofing: bool,
    /// Connected switch, empty when unconnected
    #[serde(rename = "VSwitchName", default, deserialize_with = "nullable")]
    pub vswitch_name: String,
}

/// Management OS information (read-only singleton).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementOs {
    /// Computer name
    #[serde(rename = "Name", default, deserialize_with = "nullable")]
    pub name: String,
    /// DNS suffix search list
    #[serde(rename = "DNS_SuffixSearchList", default, deserialize_with = "nullable")]
    pub dns_suffix_search_list: Vec<String>,
    /// DNS devolution enabled
    #[serde(rename = "DNS_EnableDevolution", default, deserialize_with = "nullable")]
    pub dns_enable_devolution: bool,
    /// DNS devolution level
    #[serde(rename = "DNS_DevolutionLevel", default, deserialize_with = "nullable")]
    pub dns_devolution_level: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vswitch_from_script_output() {
        let json = r#"{
            "Name": "br0",
            "SwitchType": "internal",
            "Notes": null,
            "AllowManagementOS": true
        }"#;
        let vswitch: VSwitch = serde_json::from_str(json).unwrap();
        assert_eq!(vswitch.name, "br0");
        assert_eq!(vswitch.notes, "");
        assert_eq!(vswitch.allow_management_os, Some(true));
        assert_eq!(vswitch.net_adapter_name, None);
    }

    #[test]
    fn test_vswitch_omits_unset_adapter_fields() {
        let vswitch = VSwitch {
            name: "br0".into(),
            switch_type: "private".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&vswitch).unwrap();
        assert_eq!(json, r#"{"Name":"br0","SwitchType":"private","Notes":""}"#);
    }

    #[test]
    fn test_network_adapter_with_lists() {
        let json = r#"{
            "Name": "Ethernet",
            "MACAddress": "00-15-5D-01-02-03",
            "IPv4InterfaceMetric": 25,
            "IPAddresses": [{"Address": "10.0.0.5", "PrefixLength": 24, "SkipAsSource": false}],
            "Gateways": [{"Address": "10.0.0.1", "RouteMetric": 0}],
            "DNServers": ["10.0.0.1"],
            "RegisterConnectionSuffix": null,
            "IsPhysical": true
        }"#;
        let adapter: NetworkAdapter = serde_json::from_str(json).unwrap();
        assert_eq!(adapter.ipv4_interface_metric, 25);
        assert_eq!(adapter.ip_addresses[0].prefix_length, 24);
        assert_eq!(adapter.gateways[0].address, "10.0.0.1");
        assert_eq!(adapter.dn_servers, ["10.0.0.1"]);
        assert_eq!(adapter.register_connection_suffix, "");
        assert!(adapter.is_physical);
        assert!(!adapter.ipv6_interface_disabled);
    }

    #[test]
    fn test_management_os_null_search_list() {
        let json = r#"{"Name": "HV01", "DNS_SuffixSearchList": null, "DNS_EnableDevolution": true, "DNS_DevolutionLevel": 0}"#;
        let os: ManagementOs = serde_json::from_str(json).unwrap();
        assert_eq!(os.name, "HV01");
        assert!(os.dns_suffix_search_list.is_empty());
        assert!(os.dns_enable_devolution);
    }
}
