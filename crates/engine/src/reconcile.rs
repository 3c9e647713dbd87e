use std::collections::HashSet;

use serde::Serialize;

use crate::model::ScreenedFacility;

// ---------------------------------------------------------------------------
// Run key
// ---------------------------------------------------------------------------

/// Equality key for cross-run comparison.
///
/// Deliberately excludes the derived code set and verdict: those can
/// legitimately differ between runs taken at different enrichment
/// snapshots, and must not make the same facility look changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    pub permit_id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub obligation: String,
}

impl RunKey {
    pub fn of(f: &ScreenedFacility) -> Self {
        Self {
            permit_id: f.record.permit_id.clone(),
            name: f.record.name.clone(),
            city: f.record.city.clone(),
            state: f.record.state.clone(),
            obligation: f.record.obligation.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunDiff {
    /// Candidates present in run B but absent from run A.
    pub added: Vec<ScreenedFacility>,
    /// Candidates present in run A but absent from run B.
    pub removed: Vec<ScreenedFacility>,
}

/// Set difference of two removal-candidate runs under the fixed key tuple.
/// Order-independent over inputs; output preserves each run's order.
pub fn diff_runs(run_a: &[ScreenedFacility], run_b: &[ScreenedFacility]) -> RunDiff {
    let keys_a: HashSet<RunKey> = run_a.iter().map(RunKey::of).collect();
    let keys_b: HashSet<RunKey> = run_b.iter().map(RunKey::of).collect();

    let added = run_b
        .iter()
        .filter(|f| !keys_a.contains(&RunKey::of(f)))
        .cloned()
        .collect();
    let removed = run_a
        .iter()
        .filter(|f| !keys_b.contains(&RunKey::of(f)))
        .cloned()
        .collect();

    RunDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeSet, FacilityRecord, RuleTag, Verdict};

    fn candidate(permit_id: &str, codes: &[&str]) -> ScreenedFacility {
        ScreenedFacility {
            record: FacilityRecord {
                permit_id: permit_id.into(),
                name: format!("{permit_id} PLANT"),
                city: "AUSTIN".into(),
                state: "TX".into(),
                obligation: String::new(),
            },
            codes: CodeSet::Codes(codes.iter().map(|s| s.to_string()).collect()),
            verdict: Verdict::OtherSystem,
            rule: RuleTag::RemovalCode,
        }
    }

    #[test]
    fn added_and_removed() {
        let a = vec![candidate("TX1", &["4941"]), candidate("TX2", &["8211"])];
        let b = vec![candidate("TX2", &["8211"]), candidate("TX3", &["7011"])];
        let diff = diff_runs(&a, &b);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].record.permit_id, "TX3");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].record.permit_id, "TX1");
    }

    #[test]
    fn derived_fields_do_not_affect_equality() {
        // Same key tuple, different enrichment snapshot → not a change.
        let a = vec![candidate("TX1", &["4941"])];
        let b = vec![candidate("TX1", &["4941", "4941", "8211"])];
        let diff = diff_runs(&a, &b);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn symmetry() {
        let a = vec![candidate("TX1", &[]), candidate("TX2", &[])];
        let b = vec![candidate("TX2", &[]), candidate("TX4", &[])];
        let ab = diff_runs(&a, &b);
        let ba = diff_runs(&b, &a);
        assert_eq!(ab.added, ba.removed);
        assert_eq!(ab.removed, ba.added);
    }

    #[test]
    fn identical_runs_diff_empty() {
        let a = vec![candidate("TX1", &["4941"])];
        let diff = diff_runs(&a, &a);
        assert!(diff.added.is_empty() && diff.removed.is_empty());
    }
}
