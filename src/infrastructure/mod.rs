//! Storage adapters implementing the wallet ports.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod row_lock;

pub use row_lock::StoreConfig;
