//! Gateway traits
//!
//! A gateway performs Fetch/Apply/Remove for one object kind against the
//! host. These traits keep the engine free of any transport so it can be
//! driven by a real command executor or by a test double.
//!
//! Gateways perform exactly one attempt per call and classify failures into
//! the [`Error`](crate::Error) taxonomy. In particular a missing object must
//! surface as [`Error::NotFound`](crate::Error::NotFound) and a create
//! collision as [`Error::AlreadyExists`](crate::Error::AlreadyExists).

use crate::error::Result;
use crate::key::NaturalKey;

/// Read access to one object kind.
pub trait Fetch: Send + Sync {
    /// Natural key accepted by [`Fetch::fetch`]
    type Key: NaturalKey;

    /// Record exchanged with the host
    type Record: Clone + std::fmt::Debug + Send + Sync;

    /// Singular name used in messages, e.g. "vswitch"
    const TYPE_NAME: &'static str;

    /// Collection segment of identities, e.g. "vswitches"
    const COLLECTION: &'static str;

    /// Whether the host compares natural keys case-insensitively, so
    /// `br0` and `BR0` name the same object
    const KEYS_IGNORE_CASE: bool = false;

    /// Look up the object. Must not mutate the host.
    fn fetch(&self, key: &Self::Key) -> Result<Self::Record>;
}

/// Full create/update/remove access to one object kind.
pub trait Gateway: Fetch {
    /// Create the object described by `record`.
    fn create(&self, record: &Self::Record) -> Result<()>;

    /// Apply `record` to the existing object at `key`.
    fn update(&self, key: &Self::Key, record: &Self::Record) -> Result<()>;

    /// Remove the object at `key`.
    fn remove(&self, key: &Self::Key) -> Result<()>;
}
