//! Record mappers between declared configuration and host records
//!
//! Only virtual switches are managed; the read-only kinds are shown through
//! `hvctl show` using the host records directly.

pub mod vswitch;

pub use vswitch::{VSwitchConfig, VSwitchDeclaration, VSwitchResource};
