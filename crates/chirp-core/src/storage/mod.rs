//! Key/blob persistence backends.
//!
//! Every store in this crate persists through [`Storage`], so the bookkeeping
//! logic can run against the real data directory ([`FsStorage`]) or an
//! in-process map ([`MemoryStorage`]) in tests.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use crate::Result;

/// Persistence backend for whole records addressed by key.
///
/// Keys are flat names (no path separators). Writers are assumed to be a
/// single process; no locking is performed.
pub trait Storage: Send + Sync {
    /// Read a record, `None` when it does not exist
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a record so that readers never observe a partial value
    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Keys starting with `prefix`, sorted lexically
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete a record. Deleting a missing record is a no-op.
    fn remove(&self, key: &str) -> Result<()>;
}
