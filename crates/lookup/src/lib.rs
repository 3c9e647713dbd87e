//! `permitscreen-lookup` — the code lookup service.
//!
//! Resolves a facility permit identifier to the industry classification
//! codes on file for it, against either a local registry CSV or a remote
//! registry endpoint. Lookups are cacheable and batch enrichment runs in
//! a bounded worker pool (rate-limit bound, not CPU bound).

pub mod cache;
pub mod enrich;
pub mod error;
pub mod registry;
pub mod remote;

pub use cache::CachedSource;
pub use enrich::enrich_roster;
pub use error::LookupError;
pub use registry::CodeRegistry;
pub use remote::RemoteRegistry;

use permitscreen_engine::model::CodeSet;

/// A source of classification codes for permit identifiers.
///
/// Implementations must be pure reads against an immutable registry:
/// repeated lookups for the same identifier return the same code set.
/// Malformed identifiers yield `CodeSet::NoMatch`, never an error.
pub trait CodeSource: Send + Sync {
    fn lookup(&self, permit_id: &str) -> Result<CodeSet, LookupError>;
}
