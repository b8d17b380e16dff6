//! Persistence of the scheduler state
//!
//! The catalog, weekly template, date overrides and appointments are saved as
//! a single JSON snapshot after every change and read back at startup.

pub mod error;
pub mod snapshot;

pub use error::{StorageError, StorageResult};
pub use snapshot::{Snapshot, SnapshotStore};
