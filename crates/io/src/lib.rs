// File I/O operations

pub mod export;
pub mod roster;
pub mod snapshot;

pub use snapshot::{SnapshotInfo, SnapshotStore, StoreError};

/// Snapshot store schema version.
/// Increment when the schema changes in a way old versions can't read.
pub const STORE_FORMAT_VERSION: u32 = 1;
