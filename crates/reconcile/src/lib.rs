//! # Reconcile
//!
//! A per-resource state machine that maps the declarative verbs Create,
//! Read, Update, Delete and Import onto a stateful host, plus the lifecycle
//! policies that decide what happens when the configuration and the host
//! disagree.
//!
//! ## Core Concepts
//!
//! - **Gateway**: Fetch / Apply / Remove for one object kind ([`Fetch`], [`Gateway`])
//! - **Resource**: the record mapper between declared configuration and
//!   gateway records ([`Resource`])
//! - **Engine**: runs the verbs for one instance and owns its identity ([`Engine`])
//! - **Policies**: pure lifecycle decisions ([`policy`])
//! - **Plan / Execute**: compare declared and tracked instances, then apply
//!   the result concurrently ([`plan`], [`execute`])
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{Engine, Instance, LifecycleOptions};
//!
//! let engine = Engine::<VSwitchResource>::new(&gateway, "hv01");
//! let mut instance = Instance::declared(config, Some(LifecycleOptions::import_if_exists()));
//! engine.create(&mut instance)?;
//! assert!(instance.is_managed());
//! ```
//!
//! The engine holds no host knowledge; everything that talks to a host sits
//! behind the gateway traits.

pub mod engine;
pub mod error;
pub mod executor;
pub mod field;
pub mod gateway;
pub mod identity;
pub mod key;
pub mod lifecycle;
pub mod planner;
pub mod policy;
pub mod resource;
pub mod types;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use engine::{Engine, lookup};
pub use error::{Diagnostics, Error, ErrorCategory, Operation, Result};
pub use executor::{Applied, Execution, NoProgress, ProgressCallback, execute, execute_simple};
pub use field::{Compare, Field, FieldChange, FieldRole, FieldValue, describe_changes, diff};
pub use gateway::{Fetch, Gateway};
pub use identity::ResourceIdentity;
pub use key::{Alternative, NaturalKey};
pub use lifecycle::{CreateLifecycle, LifecycleOptions, LifecycleState, ReadLifecycle};
pub use planner::{Action, Declared, ExecutionPlan, PlanSummary, plan};
pub use resource::{KeyOf, RecordOf, Resource};
pub use types::{
    ApplyResult, CreateOutcome, DeleteOutcome, ExecuteOptions, ExecuteSummary, Instance, Lookup,
    ReadOutcome, UpdateOutcome,
};
