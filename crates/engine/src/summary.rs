use std::collections::HashMap;

use crate::model::{ScreenSummary, ScreenedFacility};

/// Compute per-rule counts from screened dispositions.
pub fn compute_summary(
    total_facilities: usize,
    candidates: &[ScreenedFacility],
    retained: &[ScreenedFacility],
) -> ScreenSummary {
    let mut rule_counts: HashMap<String, usize> = HashMap::new();

    for f in candidates.iter().chain(retained.iter()) {
        *rule_counts.entry(f.rule.to_string()).or_insert(0) += 1;
    }

    ScreenSummary {
        total_facilities,
        retained: retained.len(),
        candidates: candidates.len(),
        rule_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeSet, FacilityRecord, RuleTag, Verdict};

    fn screened(permit_id: &str, rule: RuleTag) -> ScreenedFacility {
        ScreenedFacility {
            record: FacilityRecord {
                permit_id: permit_id.into(),
                name: "F".into(),
                city: "C".into(),
                state: "TX".into(),
                obligation: String::new(),
            },
            codes: CodeSet::NoMatch,
            verdict: Verdict::OtherSystem,
            rule,
        }
    }

    #[test]
    fn counts() {
        let candidates = vec![
            screened("A", RuleTag::RemovalCode),
            screened("B", RuleTag::RemovalCode),
            screened("C", RuleTag::ReviewRemove),
        ];
        let retained = vec![
            screened("D", RuleTag::SewerCode),
            screened("E", RuleTag::NoMatchDefault),
        ];
        let summary = compute_summary(5, &candidates, &retained);
        assert_eq!(summary.total_facilities, 5);
        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.retained, 2);
        assert_eq!(summary.rule_counts["removal_code"], 2);
        assert_eq!(summary.rule_counts["review_remove"], 1);
        assert_eq!(summary.rule_counts["sewer_code"], 1);
    }
}
