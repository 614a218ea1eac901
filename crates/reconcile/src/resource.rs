//! Resource trait: the record mapper between declared configuration and the
//! gateway record
//!
//! A Resource ties a [`Gateway`] to the shape users declare. All methods are
//! pure; the engine performs every side effect.

use crate::error::{Error, Result};
use crate::field::Field;
use crate::gateway::{Fetch, Gateway};
use std::fmt;

/// Natural key type of a resource's gateway.
pub type KeyOf<R> = <<R as Resource>::Gateway as Fetch>::Key;

/// Record type of a resource's gateway.
pub type RecordOf<R> = <<R as Resource>::Gateway as Fetch>::Record;

/// Core trait for managed resources
///
/// # Example
///
/// ```ignore
/// impl Resource for VSwitchResource {
///     type Gateway = VSwitchGateway;
///     type Desired = VSwitchConfig;
///
///     fn natural_key(desired: &VSwitchConfig) -> Result<String> {
///         Ok(desired.name.clone())
///     }
///     // ...
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    type Gateway: Gateway;

    /// Declared configuration. Computed fields are `Option`s.
    type Desired: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Extract the natural key. Fails when the key field is missing.
    fn natural_key(desired: &Self::Desired) -> Result<KeyOf<Self>>;

    /// Local validation, run before any remote call.
    fn validate(_desired: &Self::Desired) -> Result<()> {
        Ok(())
    }

    /// Desired configuration to gateway input, normalized.
    fn to_gateway(desired: &Self::Desired) -> RecordOf<Self>;

    /// Gateway record to configuration, with every computed field filled.
    fn from_gateway(record: &RecordOf<Self>) -> Self::Desired;

    /// Configuration reported for a missing object under
    /// `ignore_error_if_not_exists`.
    fn zeroed() -> Self::Desired;

    /// The fields compared by Update and by the import match.
    fn fields(desired: &Self::Desired) -> Vec<Field>;

    /// Seed configuration for Import from an externally supplied key.
    fn import_seed(import_id: &str) -> Result<Self::Desired> {
        Err(Error::validation(
            <Self::Gateway as Fetch>::TYPE_NAME,
            format!("import is not supported (import id '{import_id}')"),
        ))
    }
}
