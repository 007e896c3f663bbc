//! Adapters for the domain ports: counter storage backends, clocks and the
//! built-in dummy gateway.

pub mod clock;
pub mod dummy;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
