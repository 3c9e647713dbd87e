use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScreenConfig {
    pub name: String,
    /// Which POTW self-report rule the pipeline applies. Both variants are
    /// kept selectable so original and revised runs can be diffed.
    #[serde(default = "default_potw_rule")]
    pub potw_rule: PotwRule,
    pub roster: RosterConfig,
    pub taxonomy: TaxonomyConfig,
    #[serde(default)]
    pub review: Option<ReviewConfig>,
    #[serde(default)]
    pub lookup: LookupConfig,
}

// ---------------------------------------------------------------------------
// POTW rule
// ---------------------------------------------------------------------------

/// The POTW self-report retention rule exists in two documented versions.
///
/// `Original`: any obligation text containing the literal `POTW` retains
/// the facility. `Revised`: the same, unless the facility's code set
/// contains the water-supply code — self-described POTWs that are actually
/// drinking-water plants fall through to the later rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotwRule {
    Original,
    Revised,
}

fn default_potw_rule() -> PotwRule {
    PotwRule::Revised
}

impl fmt::Display for PotwRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Revised => write!(f, "revised"),
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    pub file: String,
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub permit_id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub obligation: String,
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Reference taxonomy. Static, versioned by edit, never derived from data.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyConfig {
    /// Codes that classify a facility as a sewer/treatment system.
    #[serde(default = "default_sewer_codes")]
    pub sewer: Vec<String>,
    /// The water-supply code driving the revised POTW override.
    #[serde(default = "default_water_supply")]
    pub water_supply: String,
    /// Codes strongly associated with non-treatment facilities.
    pub removal: Vec<String>,
    /// Ambiguous codes routed to the hand-curated review bucket.
    #[serde(default)]
    pub review: Vec<String>,
}

fn default_sewer_codes() -> Vec<String> {
    // SIC 4952 "Sewerage Systems"
    vec!["4952".to_string()]
}

fn default_water_supply() -> String {
    // SIC 4941 "Water Supply"
    "4941".to_string()
}

// ---------------------------------------------------------------------------
// Review + Lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// CSV of `permit_id,decision` rows; decisions are `keep` or `remove`.
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Local registry CSV (`registry_id,code` rows in registry order).
    #[serde(default)]
    pub registry: Option<String>,
    /// Remote registry endpoint; queried when no local registry is given.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bounded lookup parallelism. Rate-limit bound, not CPU bound.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self { registry: None, endpoint: None, workers: default_workers() }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ScreenConfig {
    pub fn from_toml(input: &str) -> Result<Self, ScreenError> {
        let config: ScreenConfig =
            toml::from_str(input).map_err(|e| ScreenError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScreenError> {
        if self.taxonomy.sewer.is_empty() {
            return Err(ScreenError::ConfigValidation(
                "taxonomy.sewer must list at least one code".into(),
            ));
        }

        if self.taxonomy.removal.is_empty() {
            return Err(ScreenError::ConfigValidation(
                "taxonomy.removal must list at least one code".into(),
            ));
        }

        // Removal and review sets are disjoint by definition
        for code in &self.taxonomy.review {
            if self.taxonomy.removal.contains(code) {
                return Err(ScreenError::ConfigValidation(format!(
                    "code '{code}' appears in both taxonomy.removal and taxonomy.review"
                )));
            }
        }

        if self.lookup.workers == 0 {
            return Err(ScreenError::ConfigValidation(
                "lookup.workers must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Biosolids roster screen"
potw_rule = "revised"

[roster]
file = "roster.csv"

[roster.columns]
permit_id  = "EXTERNAL_PERMIT_NMBR"
name       = "FACILITY_NAME"
city       = "CITY"
state      = "STATE"
obligation = "REPORTING_OBLIGATION_DESC"

[taxonomy]
sewer        = ["4952"]
water_supply = "4941"
removal      = ["4941", "8211", "7011"]
review       = ["6515", "9711"]

[review]
file = "curated_review.csv"

[lookup]
registry = "sic_registry.csv"
workers  = 4
"#;

    #[test]
    fn parse_valid() {
        let config = ScreenConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Biosolids roster screen");
        assert_eq!(config.potw_rule, PotwRule::Revised);
        assert_eq!(config.roster.columns.permit_id, "EXTERNAL_PERMIT_NMBR");
        assert_eq!(config.taxonomy.removal.len(), 3);
        assert_eq!(config.taxonomy.review.len(), 2);
        assert_eq!(config.review.as_ref().unwrap().file, "curated_review.csv");
        assert_eq!(config.lookup.workers, 4);
    }

    #[test]
    fn potw_rule_defaults_to_revised() {
        let input = VALID.replace("potw_rule = \"revised\"\n", "");
        let config = ScreenConfig::from_toml(&input).unwrap();
        assert_eq!(config.potw_rule, PotwRule::Revised);
    }

    #[test]
    fn parse_original_rule() {
        let input = VALID.replace("\"revised\"", "\"original\"");
        let config = ScreenConfig::from_toml(&input).unwrap();
        assert_eq!(config.potw_rule, PotwRule::Original);
    }

    #[test]
    fn reject_unknown_potw_rule() {
        let input = VALID.replace("\"revised\"", "\"rev2\"");
        assert!(ScreenConfig::from_toml(&input).is_err());
    }

    #[test]
    fn sewer_and_water_supply_have_defaults() {
        let input = VALID
            .replace("sewer        = [\"4952\"]\n", "")
            .replace("water_supply = \"4941\"\n", "");
        let config = ScreenConfig::from_toml(&input).unwrap();
        assert_eq!(config.taxonomy.sewer, vec!["4952"]);
        assert_eq!(config.taxonomy.water_supply, "4941");
    }

    #[test]
    fn reject_empty_removal_set() {
        let input = VALID.replace("removal      = [\"4941\", \"8211\", \"7011\"]", "removal = []");
        let err = ScreenConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("taxonomy.removal"));
    }

    #[test]
    fn reject_removal_review_overlap() {
        let input = VALID.replace("review       = [\"6515\", \"9711\"]", "review = [\"8211\"]");
        let err = ScreenConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("8211"));
    }

    #[test]
    fn reject_zero_workers() {
        let input = VALID.replace("workers  = 4", "workers = 0");
        let err = ScreenConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn review_section_is_optional() {
        let input = VALID.replace("[review]\nfile = \"curated_review.csv\"\n", "");
        let config = ScreenConfig::from_toml(&input).unwrap();
        assert!(config.review.is_none());
    }
}
