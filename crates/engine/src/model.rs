use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PotwRule;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single facility row from the permitted roster.
///
/// `permit_id` is the unique permit key (`<2-letter jurisdiction><alnum>`,
/// e.g. `TX0125709`). `obligation` is the free-text reporting-obligation
/// descriptor; it may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub permit_id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub obligation: String,
}

// ---------------------------------------------------------------------------
// Code sets
// ---------------------------------------------------------------------------

/// Industry classification codes on file for one facility.
///
/// `Codes` is an ordered multiset: repeated codes reflect repeated registry
/// entries and are never deduplicated (all rule checks are membership-based,
/// so duplicates cannot change a verdict). `NoMatch` is the explicit
/// "lookup found nothing" sentinel, serialized as `NO_MATCH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSet {
    Codes(Vec<String>),
    NoMatch,
}

impl CodeSet {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }

    /// Membership test. `NoMatch` contains nothing.
    pub fn contains(&self, code: &str) -> bool {
        match self {
            Self::Codes(codes) => codes.iter().any(|c| c == code),
            Self::NoMatch => false,
        }
    }

    /// True if any code here appears in `other`.
    pub fn intersects<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match self {
            Self::Codes(codes) => other.into_iter().any(|o| codes.iter().any(|c| c == o)),
            Self::NoMatch => false,
        }
    }
}

impl fmt::Display for CodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codes(codes) => write!(f, "{}", codes.join(";")),
            Self::NoMatch => write!(f, "NO_MATCH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Coarse category derived from a facility's code set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    SewerSystem,
    OtherSystem,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SewerSystem => write!(f, "sewer_system"),
            Self::OtherSystem => write!(f, "other_system"),
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// A roster record with its looked-up codes and verdict attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedFacility {
    pub record: FacilityRecord,
    pub codes: CodeSet,
    pub verdict: Verdict,
}

/// Per-record lookup failure, kept for audit. The affected facility is
/// enriched as `NO_MATCH` / `other_system` rather than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFailure {
    pub permit_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedRoster {
    pub facilities: Vec<EnrichedFacility>,
    pub failures: Vec<LookupFailure>,
}

// ---------------------------------------------------------------------------
// Screening output
// ---------------------------------------------------------------------------

/// Which pipeline rule decided a facility's disposition.
///
/// The first four are retention rules (facility kept on the roster); the
/// last two flag removal candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTag {
    SewerCode,
    PotwSelfReport,
    NoMatchDefault,
    ReviewKeep,
    RemovalCode,
    ReviewRemove,
}

impl RuleTag {
    pub fn is_retention(&self) -> bool {
        !matches!(self, Self::RemovalCode | Self::ReviewRemove)
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SewerCode => write!(f, "sewer_code"),
            Self::PotwSelfReport => write!(f, "potw_self_report"),
            Self::NoMatchDefault => write!(f, "no_match_default"),
            Self::ReviewKeep => write!(f, "review_keep"),
            Self::RemovalCode => write!(f, "removal_code"),
            Self::ReviewRemove => write!(f, "review_remove"),
        }
    }
}

/// One facility's final disposition, with the evidence that justified it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenedFacility {
    pub record: FacilityRecord,
    pub codes: CodeSet,
    pub verdict: Verdict,
    pub rule: RuleTag,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub total_facilities: usize,
    pub retained: usize,
    pub candidates: usize,
    pub rule_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenMeta {
    pub config_name: String,
    pub potw_rule: PotwRule,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResult {
    pub meta: ScreenMeta,
    pub summary: ScreenSummary,
    /// Facilities flagged as likely not treatment plants.
    pub candidates: Vec<ScreenedFacility>,
    /// Facilities kept on the roster, tagged with the retention rule.
    pub retained: Vec<ScreenedFacility>,
}
