use crate::config::{PotwRule, ScreenConfig};
use crate::model::{
    EnrichedFacility, EnrichedRoster, RuleTag, ScreenMeta, ScreenResult, ScreenedFacility, Verdict,
};
use crate::review::{ReviewDecision, ReviewMap};
use crate::summary::compute_summary;

/// Run the screening pipeline over an enriched roster.
///
/// A facility is retained as soon as any retention rule matches; only
/// facilities matching none become removal candidates. Deterministic and
/// idempotent: the same enriched roster always yields the same result
/// (modulo the `run_at` timestamp in meta).
pub fn run(config: &ScreenConfig, roster: &EnrichedRoster, review: &ReviewMap) -> ScreenResult {
    let mut candidates = Vec::new();
    let mut retained = Vec::new();

    for facility in &roster.facilities {
        let rule = disposition(config, facility, review);
        let screened = ScreenedFacility {
            record: facility.record.clone(),
            codes: facility.codes.clone(),
            verdict: facility.verdict,
            rule,
        };
        if rule.is_retention() {
            retained.push(screened);
        } else {
            candidates.push(screened);
        }
    }

    let summary = compute_summary(roster.facilities.len(), &candidates, &retained);

    ScreenResult {
        meta: ScreenMeta {
            config_name: config.name.clone(),
            potw_rule: config.potw_rule,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        candidates,
        retained,
    }
}

/// Apply the ordered retention rules to one facility.
fn disposition(config: &ScreenConfig, facility: &EnrichedFacility, review: &ReviewMap) -> RuleTag {
    // Rule 1: sewer-code retention.
    if facility.verdict == Verdict::SewerSystem {
        return RuleTag::SewerCode;
    }

    // Rule 2: POTW self-report retention. Exact, case-sensitive substring
    // per source convention; near-variants ("potw", "P.O.T.W.") do not
    // match. Under the revised rule, a water-supply code overrides the
    // retention and the facility proceeds to further filtering.
    if facility.record.obligation.contains("POTW") {
        let overridden = config.potw_rule == PotwRule::Revised
            && facility.codes.contains(&config.taxonomy.water_supply);
        if !overridden {
            return RuleTag::PotwSelfReport;
        }
    }

    // Rule 3: no-match retention. Absent classification data keeps the
    // facility rather than removing it.
    if facility.codes.is_no_match() {
        return RuleTag::NoMatchDefault;
    }

    // Rule 4: removal-set exclusion.
    if facility.codes.intersects(&config.taxonomy.removal) {
        return RuleTag::RemovalCode;
    }

    // Rule 5: review-set adjudication. The hand-curated mapping decides;
    // identifiers absent from it default to keep.
    match review.decision(&facility.record.permit_id) {
        ReviewDecision::Remove => RuleTag::ReviewRemove,
        ReviewDecision::Keep => RuleTag::ReviewKeep,
    }
}
