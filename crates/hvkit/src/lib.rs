//! # hvkit
//!
//! Hyper-V host access for the [`reconcile`] engine: connection descriptors,
//! PowerShell executors (local and SSH), script templates, the records the
//! host exchanges, and one gateway per object kind.
//!
//! ```ignore
//! use hvkit::{Client, Connection, SshConnection};
//! use reconcile::Fetch;
//!
//! let client = Client::new(&Connection::Ssh(SshConnection::new("hv01", "admin")))?;
//! let vswitch = client.vswitches().fetch(&"br0".to_string())?;
//! println!("{} is {}", vswitch.name, vswitch.switch_type);
//! ```
//!
//! Scripts print one JSON document on stdout. A script that cannot find its
//! object, or collides with an existing one, throws a message the error
//! classifier recognizes; see [`error`].

pub mod client;
pub mod connection;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod query;
pub mod script;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::Client;
pub use connection::{Connection, LocalConnection, SshConnection};
pub use error::{Error, Result};
pub use executor::{CommandOutput, Executor};
pub use gateway::{
    InterfaceGateway, ManagementOsGateway, NetworkAdapterGateway, NetworkGateway,
    VNetworkAdapterGateway, VSwitchGateway,
};
pub use query::{InterfaceKey, InterfaceQuery, VNetworkAdapterKey};
pub use types::{
    DefaultGateway, Interface, IpAddress, ManagementOs, Network, NetworkAdapter, VNetworkAdapter,
    VSwitch,
};
