//! Lookup keys for the kinds that are not addressed by a plain name.

use crate::error::{Error, Result};
use reconcile::NaturalKey;
use reconcile::key::{Alternative, field_names, non_empty, resolve};
use serde::{Deserialize, Serialize};

/// Interface lookup as supplied by a caller; any subset may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceQuery {
    pub index: u32,
    pub name: String,
    pub alias: String,
    pub description: String,
    pub mac_address: String,
    pub network_adapter_name: String,
    pub vnetwork_adapter_name: String,
}

/// The single key an interface lookup runs with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceKey {
    Index(u32),
    Name(String),
    Alias(String),
    Description(String),
    MacAddress(String),
    NetworkAdapterName(String),
    VNetworkAdapterName(String),
}

/// Interface keys in priority order.
pub const INTERFACE_KEYS: &[Alternative<InterfaceQuery, InterfaceKey>] = &[
    Alternative {
        field: "index",
        extract: |q| (q.index != 0).then_some(InterfaceKey::Index(q.index)),
    },
    Alternative {
        field: "name",
        extract: |q| non_empty(&q.name).map(InterfaceKey::Name),
    },
    Alternative {
        field: "alias",
        extract: |q| non_empty(&q.alias).map(InterfaceKey::Alias),
    },
    Alternative {
        field: "description",
        extract: |q| non_empty(&q.description).map(InterfaceKey::Description),
    },
    Alternative {
        field: "mac_address",
        extract: |q| non_empty(&q.mac_address).map(InterfaceKey::MacAddress),
    },
    Alternative {
        field: "network_adapter_name",
        extract: |q| non_empty(&q.network_adapter_name).map(InterfaceKey::NetworkAdapterName),
    },
    Alternative {
        field: "vnetwork_adapter_name",
        extract: |q| non_empty(&q.vnetwork_adapter_name).map(InterfaceKey::VNetworkAdapterName),
    },
];

impl InterfaceQuery {
    /// Resolve the highest-priority populated key.
    pub fn key(&self) -> Result<InterfaceKey> {
        resolve(self, INTERFACE_KEYS).ok_or_else(|| Error::InvalidQuery {
            kind: "interface",
            message: format!("one of {} is required", field_names(INTERFACE_KEYS)),
        })
    }
}

impl InterfaceKey {
    /// Lookup strategy name understood by the read script.
    pub fn by(&self) -> &'static str {
        match self {
            Self::Index(_) => "index",
            Self::Name(_) => "name",
            Self::Alias(_) => "alias",
            Self::Description(_) => "description",
            Self::MacAddress(_) => "mac_address",
            Self::NetworkAdapterName(_) => "network_adapter_name",
            Self::VNetworkAdapterName(_) => "vnetwork_adapter_name",
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Index(index) => index.to_string(),
            Self::Name(v)
            | Self::Alias(v)
            | Self::Description(v)
            | Self::MacAddress(v)
            | Self::NetworkAdapterName(v)
            | Self::VNetworkAdapterName(v) => v.clone(),
        }
    }
}

impl NaturalKey for InterfaceKey {
    fn segment(&self) -> Option<String> {
        Some(format!("{}={}", self.by(), self.value()))
    }

    fn display(&self) -> String {
        format!("{} {}", self.by(), self.value())
    }
}

/// Virtual network adapter key. Adapter names repeat across virtual
/// machines, so the owning machine narrows the lookup; an empty machine name
/// means the management OS or any machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VNetworkAdapterKey {
    pub name: String,
    pub vmachine_name: String,
}

impl VNetworkAdapterKey {
    pub fn new(name: impl Into<String>, vmachine_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vmachine_name: vmachine_name.into(),
        }
    }

    /// Reject a key with neither part set.
    pub fn check(&self) -> Result<()> {
        if self.name.is_empty() && self.vmachine_name.is_empty() {
            return Err(Error::InvalidQuery {
                kind: "vnetwork_adapter",
                message: "one of name, vmachine_name is required".into(),
            });
        }
        Ok(())
    }
}

impl NaturalKey for VNetworkAdapterKey {
    fn segment(&self) -> Option<String> {
        Some(if self.vmachine_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}@{}", self.name, self.vmachine_name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_beats_alias() {
        let query = InterfaceQuery {
            name: "ethernet_32777".into(),
            alias: "Ethernet".into(),
            ..Default::default()
        };
        assert_eq!(query.key().unwrap(), InterfaceKey::Name("ethernet_32777".into()));
    }

    #[test]
    fn test_index_beats_everything() {
        let query = InterfaceQuery {
            index: 12,
            name: "ethernet_32777".into(),
            vnetwork_adapter_name: "Default Switch".into(),
            ..Default::default()
        };
        let key = query.key().unwrap();
        assert_eq!(key, InterfaceKey::Index(12));
        assert_eq!(key.by(), "index");
        assert_eq!(key.value(), "12");
        assert_eq!(key.segment().as_deref(), Some("index=12"));
    }

    #[test]
    fn test_last_resort_key() {
        let query = InterfaceQuery {
            vnetwork_adapter_name: "Default Switch".into(),
            ..Default::default()
        };
        assert_eq!(
            query.key().unwrap(),
            InterfaceKey::VNetworkAdapterName("Default Switch".into())
        );
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let err = InterfaceQuery::default().key().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { kind: "interface", .. }));
        assert!(err.to_string().contains("index, name, alias"));
    }

    #[test]
    fn test_vnetwork_adapter_segment() {
        assert_eq!(
            VNetworkAdapterKey::new("nic0", "vm1").segment().as_deref(),
            Some("nic0@vm1")
        );
        assert_eq!(
            VNetworkAdapterKey::new("vEthernet", "").segment().as_deref(),
            Some("vEthernet")
        );
        assert!(VNetworkAdapterKey::new("", "vm1").check().is_ok());
        assert!(VNetworkAdapterKey::default().check().is_err());
    }
}
