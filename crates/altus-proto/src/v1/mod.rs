//! The `altus.v1` API surface.
//!
//! Messages are re-exported flat, mirroring the protobuf package namespace;
//! client stubs live in [`clients`] and the transport-agnostic service traits
//! in [`services`].

mod messages;

pub mod clients;
pub mod services;

pub use messages::*;
