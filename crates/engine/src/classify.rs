use crate::config::TaxonomyConfig;
use crate::model::{CodeSet, Verdict};

/// Classify a code set against the sewer-related taxonomy subset.
///
/// Total over every possible code set: at least one sewer-related code
/// yields `SewerSystem`; anything else — including `NO_MATCH` and the
/// empty set — yields `OtherSystem`. Absence of evidence is not evidence
/// of sewer association.
pub fn classify(codes: &CodeSet, taxonomy: &TaxonomyConfig) -> Verdict {
    if codes.intersects(&taxonomy.sewer) {
        Verdict::SewerSystem
    } else {
        Verdict::OtherSystem
    }
}
