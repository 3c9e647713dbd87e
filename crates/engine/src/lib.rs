//! `permitscreen-engine` — permit roster screening engine.
//!
//! Pure engine crate: receives pre-loaded facility records, returns
//! screening dispositions. No file IO, no network.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod review;
pub mod roster;
pub mod summary;

pub use config::{PotwRule, ScreenConfig};
pub use error::ScreenError;
pub use model::{CodeSet, EnrichedFacility, EnrichedRoster, FacilityRecord, ScreenResult, Verdict};
pub use pipeline::run;
pub use reconcile::diff_runs;
pub use review::ReviewMap;
