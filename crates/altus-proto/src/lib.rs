//! Wire-level bindings for the Altus AI Platform API.
//!
//! This crate models the subset of the `altus.v1` protocol surface the SDK
//! consumes: the messages, the per-service client stubs, and trait seams the
//! SDK programs against so transports can be swapped in tests.
//!
//! Message structs follow the prost wire shape exactly (field tags, oneof
//! modules, enumeration accessors), so they interoperate with any other
//! `altus.v1` binding byte-for-byte.

pub mod v1;
