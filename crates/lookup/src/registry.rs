use permitscreen_engine::model::CodeSet;

use crate::error::LookupError;
use crate::CodeSource;

// ---------------------------------------------------------------------------
// Identifier normalization
// ---------------------------------------------------------------------------

/// Canonical form used for registry matching: whitespace-trimmed, uppercase.
pub fn normalize(permit_id: &str) -> String {
    permit_id.trim().to_ascii_uppercase()
}

/// A well-formed permit identifier is a 2-letter jurisdiction prefix
/// followed by at least one alphanumeric character (`TX0125709`).
/// Anything else cannot appear in the registry and short-circuits to
/// `NO_MATCH` without a scan.
pub fn is_well_formed(normalized: &str) -> bool {
    if normalized.len() < 3 {
        return false;
    }
    let mut chars = normalized.chars();
    let prefix_ok = chars.by_ref().take(2).all(|c| c.is_ascii_alphabetic());
    prefix_ok && chars.all(|c| c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Local registry
// ---------------------------------------------------------------------------

/// One registry entry: a permit key and a single classification code.
/// Facilities with several codes on file appear as several rows.
#[derive(Debug, Clone)]
struct RegistryRow {
    key: String,
    code: String,
}

/// An in-memory classification registry loaded from CSV.
///
/// Matching is by key prefix: a query hits every row whose key begins
/// with the normalized identifier. Hits concatenate in registry order,
/// duplicates preserved, so the resulting code set mirrors the registry
/// exactly. No hits (or a malformed identifier) yields `NO_MATCH`.
#[derive(Debug)]
pub struct CodeRegistry {
    rows: Vec<RegistryRow>,
}

impl CodeRegistry {
    /// Parse a registry CSV with `registry_id` and `code` columns.
    /// Extra columns are ignored. Rows with a blank key or code are
    /// skipped rather than treated as errors.
    pub fn from_csv(csv_data: &str) -> Result<Self, LookupError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| LookupError::Registry(format!("unreadable header row: {e}")))?
            .clone();

        let idx = |name: &str| -> Result<usize, LookupError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LookupError::Registry(format!("missing column {name:?}")))
        };
        let key_col = idx("registry_id")?;
        let code_col = idx("code")?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| LookupError::Registry(format!("unreadable row: {e}")))?;
            let key = normalize(record.get(key_col).unwrap_or(""));
            let code = record.get(code_col).unwrap_or("").trim().to_string();
            if key.is_empty() || code.is_empty() {
                continue;
            }
            rows.push(RegistryRow { key, code });
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CodeSource for CodeRegistry {
    fn lookup(&self, permit_id: &str) -> Result<CodeSet, LookupError> {
        let query = normalize(permit_id);
        if !is_well_formed(&query) {
            return Ok(CodeSet::NoMatch);
        }

        let codes: Vec<String> = self
            .rows
            .iter()
            .filter(|row| row.key.starts_with(&query))
            .map(|row| row.code.clone())
            .collect();

        if codes.is_empty() {
            Ok(CodeSet::NoMatch)
        } else {
            Ok(CodeSet::Codes(codes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "\
registry_id,code,source
TX0125709,4941,sic
TX0125709,4941,sic
TX0047163,4952,sic
TX0000647A,9711,sic
tx0000647b,4952,sic
,9999,sic
";

    fn registry() -> CodeRegistry {
        CodeRegistry::from_csv(REGISTRY).unwrap()
    }

    #[test]
    fn exact_match_preserves_duplicates() {
        let codes = registry().lookup("TX0125709").unwrap();
        assert_eq!(codes, CodeSet::Codes(vec!["4941".into(), "4941".into()]));
    }

    #[test]
    fn prefix_match_concatenates_in_registry_order() {
        // Both outfall suffixes of TX0000647 hit; keys were normalized
        // to uppercase at load time.
        let codes = registry().lookup("tx0000647").unwrap();
        assert_eq!(codes, CodeSet::Codes(vec!["9711".into(), "4952".into()]));
    }

    #[test]
    fn no_hit_is_no_match() {
        assert_eq!(registry().lookup("TX0999999").unwrap(), CodeSet::NoMatch);
    }

    #[test]
    fn malformed_identifiers_short_circuit() {
        let reg = registry();
        assert_eq!(reg.lookup("").unwrap(), CodeSet::NoMatch);
        assert_eq!(reg.lookup("TX").unwrap(), CodeSet::NoMatch);
        assert_eq!(reg.lookup("0125709").unwrap(), CodeSet::NoMatch);
        assert_eq!(reg.lookup("TX-0125709").unwrap(), CodeSet::NoMatch);
    }

    #[test]
    fn blank_rows_are_skipped() {
        assert_eq!(registry().len(), 5);
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = CodeRegistry::from_csv("permit,code\nTX1,4952\n").unwrap_err();
        assert!(err.to_string().contains("registry_id"));
    }

    #[test]
    fn repeated_lookups_are_stable() {
        let reg = registry();
        assert_eq!(reg.lookup("TX0047163").unwrap(), reg.lookup("TX0047163").unwrap());
    }
}
