//! Virtual switch resource

use hvkit::{VSwitch, VSwitchGateway};
use reconcile::{Error, Field, LifecycleOptions, Resource, Result};
use serde::{Deserialize, Serialize};

const KIND: &str = "vswitch";

/// Switch types accepted by Hyper-V.
pub const SWITCH_TYPES: [&str; 3] = ["private", "internal", "external"];

/// Declared configuration of a virtual switch.
///
/// `allow_management_os` and the two adapter fields are computed: left
/// unset, they take whatever the host reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VSwitchConfig {
    pub name: String,
    #[serde(default = "default_switch_type")]
    pub switch_type: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_management_os: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_adapter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_adapter_interface_description: Option<String>,
}

fn default_switch_type() -> String {
    "internal".to_string()
}

impl VSwitchConfig {
    pub fn new(name: impl Into<String>, switch_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            switch_type: switch_type.into(),
            notes: String::new(),
            allow_management_os: None,
            net_adapter_name: None,
            net_adapter_interface_description: None,
        }
    }

    /// Reuse an observed record as a desired one. The host reports both
    /// adapter settings of an external switch, but only one may be set.
    pub fn into_desired(mut self) -> Self {
        if self.net_adapter_name.is_some() {
            self.net_adapter_interface_description = None;
        }
        self
    }

    fn normalized_type(&self) -> String {
        self.switch_type.to_lowercase()
    }

    fn is_external(&self) -> bool {
        self.normalized_type() == "external"
    }
}

/// One `[[vswitch]]` entry of the resources file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VSwitchDeclaration {
    #[serde(flatten)]
    pub config: VSwitchConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_lifecycle: Option<LifecycleOptions>,
}

pub struct VSwitchResource;

impl Resource for VSwitchResource {
    type Gateway = VSwitchGateway;
    type Desired = VSwitchConfig;

    fn natural_key(desired: &VSwitchConfig) -> Result<String> {
        if desired.name.trim().is_empty() {
            return Err(Error::validation(KIND, "name is required"));
        }
        Ok(desired.name.clone())
    }

    fn validate(desired: &VSwitchConfig) -> Result<()> {
        Self::natural_key(desired)?;

        let switch_type = desired.normalized_type();
        if !SWITCH_TYPES.contains(&switch_type.as_str()) {
            return Err(Error::validation(
                KIND,
                format!(
                    "switch_type must be one of {}, got '{}'",
                    SWITCH_TYPES.join(", "),
                    desired.switch_type
                ),
            ));
        }

        let has_adapter =
            desired.net_adapter_name.is_some() || desired.net_adapter_interface_description.is_some();
        if desired.net_adapter_name.is_some() && desired.net_adapter_interface_description.is_some() {
            return Err(Error::validation(
                KIND,
                "net_adapter_name conflicts with net_adapter_interface_description",
            ));
        }

        match (switch_type.as_str(), has_adapter, desired.allow_management_os) {
            ("external", false, _) => Err(Error::validation(
                KIND,
                "an external switch requires net_adapter_name or net_adapter_interface_description",
            )),
            ("private" | "internal", true, _) => Err(Error::validation(
                KIND,
                format!("a {switch_type} switch cannot be bound to a network adapter"),
            )),
            ("private", _, Some(true)) => Err(Error::validation(
                KIND,
                "a private switch cannot allow the management OS",
            )),
            ("internal", _, Some(false)) => Err(Error::validation(
                KIND,
                "an internal switch always allows the management OS",
            )),
            _ => Ok(()),
        }
    }

    fn to_gateway(desired: &VSwitchConfig) -> VSwitch {
        let external = desired.is_external();
        VSwitch {
            name: desired.name.clone(),
            switch_type: desired.normalized_type(),
            notes: desired.notes.clone(),
            allow_management_os: desired.allow_management_os.filter(|_| external),
            net_adapter_name: desired.net_adapter_name.clone().filter(|_| external),
            net_adapter_interface_description: desired
                .net_adapter_interface_description
                .clone()
                .filter(|_| external),
        }
    }

    fn from_gateway(record: &VSwitch) -> VSwitchConfig {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        VSwitchConfig {
            name: record.name.clone(),
            switch_type: record.switch_type.to_lowercase(),
            notes: record.notes.clone(),
            allow_management_os: record.allow_management_os,
            net_adapter_name: non_empty(&record.net_adapter_name),
            net_adapter_interface_description: non_empty(&record.net_adapter_interface_description),
        }
    }

    fn zeroed() -> VSwitchConfig {
        VSwitchConfig::new("", "")
    }

    fn fields(desired: &VSwitchConfig) -> Vec<Field> {
        vec![
            Field::key("name", &desired.name).ignore_case(),
            Field::setting("switch_type", Some(desired.normalized_type())),
            Field::free_text("notes", &desired.notes),
            Field::setting("allow_management_os", desired.allow_management_os),
            Field::setting("net_adapter_name", desired.net_adapter_name.as_ref()).ignore_case(),
            Field::setting(
                "net_adapter_interface_description",
                desired.net_adapter_interface_description.as_ref(),
            ),
        ]
    }

    fn import_seed(import_id: &str) -> Result<VSwitchConfig> {
        let name = import_id.trim();
        if name.is_empty() {
            return Err(Error::validation(KIND, "import id must be a switch name"));
        }
        Ok(VSwitchConfig::new(name, default_switch_type()))
    }
}
