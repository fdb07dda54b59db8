//! Storage adapters implementing the domain ports.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::{LoanStoreBox, UserStoreBox};
use crate::error::Result;
use std::path::Path;

/// Opens the user and loan stores.
///
/// With a `db_path` and the `storage-rocksdb` feature the stores persist to
/// RocksDB; otherwise they live in memory.
pub fn open_stores(db_path: Option<&Path>) -> Result<(UserStoreBox, LoanStoreBox)> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = self::rocksdb::RocksDBStore::open(path)?;
            tracing::info!(path = %path.display(), "using RocksDB storage");
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

fn in_memory_stores() -> (UserStoreBox, LoanStoreBox) {
    (
        Box::new(in_memory::InMemoryUserStore::new()),
        Box::new(in_memory::InMemoryLoanStore::new()),
    )
}
