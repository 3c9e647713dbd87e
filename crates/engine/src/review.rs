use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

/// Disposition recorded by a human reviewer for one facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Keep,
    Remove,
}

/// The hand-curated review mapping: permit id → keep/remove.
///
/// An external, human-authored artifact treated as ground truth — never
/// recomputed here. Identifiers absent from the mapping default to keep.
#[derive(Debug, Clone, Default)]
pub struct ReviewMap {
    decisions: HashMap<String, ReviewDecision>,
}

impl ReviewMap {
    /// Parse `permit_id,decision` CSV rows. An unrecognized decision value
    /// indicates a corrupted curation artifact and fails the whole run.
    pub fn from_csv(csv_data: &str) -> Result<Self, ScreenError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let mut decisions = HashMap::new();

        for record in reader.records() {
            let record = record.map_err(|e| ScreenError::CsvParse {
                table: "review".into(),
                detail: e.to_string(),
            })?;

            let permit_id = record.get(0).unwrap_or("").trim().to_string();
            if permit_id.is_empty() {
                continue;
            }

            let raw = record.get(1).unwrap_or("").trim();
            let decision = match raw {
                "keep" => ReviewDecision::Keep,
                "remove" => ReviewDecision::Remove,
                other => {
                    return Err(ScreenError::ReviewDecision {
                        permit_id,
                        value: other.to_string(),
                    })
                }
            };

            decisions.insert(permit_id, decision);
        }

        Ok(Self { decisions })
    }

    /// Decision for a permit id; absent identifiers default to keep.
    pub fn decision(&self, permit_id: &str) -> ReviewDecision {
        self.decisions
            .get(permit_id)
            .copied()
            .unwrap_or(ReviewDecision::Keep)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
