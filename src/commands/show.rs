//! `hvctl show`: data-source lookups, printed as JSON.

use anyhow::Result;
use hvkit::{Client, InterfaceQuery, VNetworkAdapterKey};
use reconcile::{Fetch, ReadLifecycle, lookup};
use serde::Serialize;
use serde_json::Value;

use crate::Context;
use crate::cli::{InterfaceArgs, LookupArgs, ShowCommand};

pub fn run(ctx: &Context, cmd: ShowCommand) -> Result<()> {
    let client = super::connect(ctx)?;
    let value = show(&client, cmd)?;
    super::print_json(&value)
}

/// Look up one object. A missing object is an error unless
/// `--ignore-missing` was given.
pub fn show(client: &Client, cmd: ShowCommand) -> Result<Value> {
    match cmd {
        ShowCommand::Vswitch { name, lookup } => find(client, &client.vswitches(), &name, lookup),
        ShowCommand::NetworkAdapter { name, lookup } => {
            find(client, &client.network_adapters(), &name, lookup)
        }
        ShowCommand::Interface { query, lookup } => {
            let key = InterfaceQuery::from(query).key()?;
            find(client, &client.interfaces(), &key, lookup)
        }
        ShowCommand::Network { name, lookup } => find(client, &client.networks(), &name, lookup),
        ShowCommand::VnetworkAdapter {
            name,
            vmachine_name,
            lookup,
        } => {
            let key = VNetworkAdapterKey::new(name, vmachine_name);
            key.check()?;
            find(client, &client.vnetwork_adapters(), &key, lookup)
        }
        ShowCommand::ManagementOs => {
            find(client, &client.management_os(), &(), LookupArgs::default())
        }
    }
}

fn find<G>(client: &Client, gateway: &G, key: &G::Key, args: LookupArgs) -> Result<Value>
where
    G: Fetch,
    G::Record: Default + Serialize,
{
    let lifecycle = ReadLifecycle {
        ignore_error_if_not_exists: args.ignore_missing,
    };
    let found = lookup(gateway, client.host(), key, lifecycle)?;
    Ok(serde_json::to_value(found)?)
}

impl From<InterfaceArgs> for InterfaceQuery {
    fn from(args: InterfaceArgs) -> Self {
        Self {
            index: args.index,
            name: args.name,
            alias: args.alias,
            description: args.description,
            mac_address: args.mac_address,
            network_adapter_name: args.network_adapter_name,
            vnetwork_adapter_name: args.vnetwork_adapter_name,
        }
    }
}
