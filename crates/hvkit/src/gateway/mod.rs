//! Gateways for the six Hyper-V object kinds.
//!
//! Each gateway owns a [`Client`](crate::Client) clone and one set of
//! script templates. Only virtual switches are mutable; the other kinds
//! implement [`reconcile::Fetch`] alone.

pub mod interface;
pub mod management_os;
pub mod network;
pub mod network_adapter;
pub mod vnetwork_adapter;
pub mod vswitch;

pub use interface::InterfaceGateway;
pub use management_os::ManagementOsGateway;
pub use network::NetworkGateway;
pub use network_adapter::NetworkAdapterGateway;
pub use vnetwork_adapter::VNetworkAdapterGateway;
pub use vswitch::VSwitchGateway;

use crate::script::Script;
use serde::Serialize;

/// Every script template the gateways render.
pub fn all_scripts() -> Vec<Script> {
    vswitch::SCRIPTS
        .iter()
        .chain([
            &network_adapter::READ,
            &interface::READ,
            &network::READ,
            &vnetwork_adapter::READ,
            &management_os::READ,
        ])
        .copied()
        .collect()
}

/// Arguments of scripts addressed by name.
#[derive(Debug, Serialize)]
pub(crate) struct NameArgs<'a> {
    pub name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Scripts;

    #[test]
    fn test_all_scripts_compile_with_unique_names() {
        let scripts = all_scripts();
        assert_eq!(scripts.len(), 9);

        let mut names: Vec<_> = scripts.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), scripts.len());

        assert!(Scripts::new(&scripts).is_ok());
    }

    #[test]
    fn test_missing_object_throws_carry_marker() {
        for script in all_scripts() {
            for line in script.body.lines().filter(|l| l.contains("throw")) {
                if line.contains("cannot find") {
                    assert!(line.contains(crate::error::NOT_FOUND_MARKER), "{}", script.name);
                }
                if line.contains("already exists") {
                    assert!(
                        line.contains(crate::error::ALREADY_EXISTS_MARKER),
                        "{}",
                        script.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_scripts_only_interpolate_inside_quotes() {
        for script in all_scripts() {
            let mut rest = script.body;
            while let Some(start) = rest.find("{{") {
                assert!(
                    rest[..start].ends_with('\''),
                    "{}: unquoted argument",
                    script.name
                );
                let end = rest[start..].find("}}").unwrap() + start + 2;
                assert!(
                    rest[end..].starts_with('\''),
                    "{}: unquoted argument",
                    script.name
                );
                rest = &rest[end..];
            }
        }
    }
}
