//! In-memory switch gateway with call counters, shared by the unit tests.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::gateway::{Fetch, Gateway};
use crate::resource::Resource;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchRecord {
    pub name: String,
    pub switch_type: String,
    pub notes: String,
    pub allow_management_os: Option<bool>,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub fetch: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub remove: AtomicUsize,
}

impl Calls {
    pub fn fetches(&self) -> usize {
        self.fetch.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.update.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.remove.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.fetches() + self.creates() + self.updates() + self.removes()
    }

    pub fn mutating(&self) -> usize {
        self.creates() + self.updates() + self.removes()
    }
}

/// Behaves like the host: names are case-insensitive, switch types are
/// reported lower-case, and internal switches always allow the management OS.
#[derive(Debug, Default)]
pub struct MockGateway {
    switches: Mutex<BTreeMap<String, SwitchRecord>>,
    history: Mutex<Vec<String>>,
    pub calls: Calls,
}

impl MockGateway {
    /// Seed an object without counting a call.
    pub fn with_switch(self, record: SwitchRecord) -> Self {
        self.switches
            .lock()
            .unwrap()
            .insert(record.name.to_lowercase(), record);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.switches
            .lock()
            .unwrap()
            .contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<SwitchRecord> {
        self.switches
            .lock()
            .unwrap()
            .get(&name.to_lowercase())
            .cloned()
    }

    /// Mutating calls in the order they reached the gateway, e.g. `remove old`.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    fn log(&self, verb: &str, name: &str) {
        self.history.lock().unwrap().push(format!("{verb} {name}"));
    }

    /// Drop an object behind the engine's back.
    pub fn forget(&self, name: &str) {
        self.switches.lock().unwrap().remove(&name.to_lowercase());
    }

    fn stored(record: &SwitchRecord) -> SwitchRecord {
        let switch_type = record.switch_type.to_lowercase();
        let allow_management_os = match switch_type.as_str() {
            "internal" => Some(true),
            "private" => Some(false),
            _ => record.allow_management_os.or(Some(true)),
        };
        SwitchRecord {
            switch_type,
            allow_management_os,
            ..record.clone()
        }
    }
}

impl Fetch for MockGateway {
    type Key = String;
    type Record = SwitchRecord;

    const TYPE_NAME: &'static str = "vswitch";
    const COLLECTION: &'static str = "vswitches";
    const KEYS_IGNORE_CASE: bool = true;

    fn fetch(&self, key: &String) -> Result<SwitchRecord> {
        self.calls.fetch.fetch_add(1, Ordering::SeqCst);
        self.get(key)
            .ok_or_else(|| Error::not_found(Self::TYPE_NAME, key.clone()))
    }
}

impl Gateway for MockGateway {
    fn create(&self, record: &SwitchRecord) -> Result<()> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.log("create", &record.name);
        let mut switches = self.switches.lock().unwrap();
        let slot = record.name.to_lowercase();
        if switches.contains_key(&slot) {
            return Err(Error::already_exists(Self::TYPE_NAME, record.name.clone()));
        }
        switches.insert(slot, Self::stored(record));
        Ok(())
    }

    fn update(&self, key: &String, record: &SwitchRecord) -> Result<()> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.log("update", key);
        let mut switches = self.switches.lock().unwrap();
        match switches.get_mut(&key.to_lowercase()) {
            Some(existing) => {
                *existing = Self::stored(record);
                Ok(())
            }
            None => Err(Error::not_found(Self::TYPE_NAME, key.clone())),
        }
    }

    fn remove(&self, key: &String) -> Result<()> {
        self.calls.remove.fetch_add(1, Ordering::SeqCst);
        self.log("remove", key);
        match self.switches.lock().unwrap().remove(&key.to_lowercase()) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(Self::TYPE_NAME, key.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchConfig {
    pub name: String,
    pub switch_type: String,
    pub notes: String,
    pub allow_management_os: Option<bool>,
}

impl SwitchConfig {
    pub fn new(name: &str, switch_type: &str) -> Self {
        Self {
            name: name.into(),
            switch_type: switch_type.into(),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.into();
        self
    }
}

pub struct MockSwitch;

impl Resource for MockSwitch {
    type Gateway = MockGateway;
    type Desired = SwitchConfig;

    fn natural_key(desired: &SwitchConfig) -> Result<String> {
        if desired.name.is_empty() {
            return Err(Error::validation("vswitch", "name is required"));
        }
        Ok(desired.name.clone())
    }

    fn validate(desired: &SwitchConfig) -> Result<()> {
        match desired.switch_type.to_lowercase().as_str() {
            "private" | "internal" | "external" => Ok(()),
            other => Err(Error::validation(
                "vswitch",
                format!("unknown switch_type '{other}'"),
            )),
        }
    }

    fn to_gateway(desired: &SwitchConfig) -> SwitchRecord {
        SwitchRecord {
            name: desired.name.clone(),
            switch_type: desired.switch_type.to_lowercase(),
            notes: desired.notes.clone(),
            allow_management_os: desired.allow_management_os,
        }
    }

    fn from_gateway(record: &SwitchRecord) -> SwitchConfig {
        SwitchConfig {
            name: record.name.clone(),
            switch_type: record.switch_type.to_lowercase(),
            notes: record.notes.clone(),
            allow_management_os: record.allow_management_os,
        }
    }

    fn zeroed() -> SwitchConfig {
        SwitchConfig::default()
    }

    fn fields(desired: &SwitchConfig) -> Vec<Field> {
        vec![
            Field::key("name", &desired.name).ignore_case(),
            Field::setting("switch_type", Some(&desired.switch_type)).ignore_case(),
            Field::free_text("notes", &desired.notes),
            Field::setting("allow_management_os", desired.allow_management_os),
        ]
    }

    fn import_seed(import_id: &str) -> Result<SwitchConfig> {
        Ok(SwitchConfig {
            name: import_id.to_string(),
            ..SwitchConfig::default()
        })
    }
}
