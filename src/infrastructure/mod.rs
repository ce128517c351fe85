//! Adapters for the domain ports: fee entry stores, the actor provider and clocks.

pub mod actor;
pub mod clock;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
