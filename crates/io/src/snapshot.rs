// Run snapshot store, SQLite-backed

use std::fmt;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use permitscreen_engine::model::{EnrichedRoster, ScreenResult};

use crate::STORE_FORMAT_VERSION;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS runs (
    label TEXT PRIMARY KEY,
    kind TEXT NOT NULL,          -- 'enrichment' or 'screen'
    created_at TEXT NOT NULL,
    fingerprint TEXT NOT NULL,   -- sha256 of payload
    payload TEXT NOT NULL        -- JSON
);
"#;

const KIND_ENRICHMENT: &str = "enrichment";
const KIND_SCREEN: &str = "screen";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StoreError {
    Sqlite(String),
    /// Stored payload failed fingerprint or JSON validation.
    Corrupt { label: String, detail: String },
    /// No snapshot under this label (or the wrong kind stored there).
    UnknownLabel { label: String, expected_kind: String },
    /// Store written by an incompatible schema version.
    Version { found: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(msg) => write!(f, "snapshot store error: {msg}"),
            Self::Corrupt { label, detail } => {
                write!(f, "snapshot {label:?} is corrupt: {detail}")
            }
            Self::UnknownLabel { label, expected_kind } => {
                write!(f, "no {expected_kind} snapshot labeled {label:?}")
            }
            Self::Version { found } => {
                write!(
                    f,
                    "snapshot store format {found} not supported (expected {STORE_FORMAT_VERSION})"
                )
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// One row of `pscreen runs` output.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub label: String,
    pub kind: String,
    pub created_at: String,
    pub fingerprint: String,
}

/// Labeled snapshots of enrichment and screening runs.
///
/// Payloads are serialized JSON, fingerprinted with SHA-256 at save time
/// and re-verified at load time so a corrupted store surfaces as an error
/// instead of a silently different diff. Saving under an existing label
/// replaces that snapshot.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        let version: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'format_version'", [], |row| {
                row.get(0)
            })
            .optional()?;

        match version {
            None => {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('format_version', ?1)",
                    params![STORE_FORMAT_VERSION.to_string()],
                )?;
            }
            Some(v) if v == STORE_FORMAT_VERSION.to_string() => {}
            Some(v) => return Err(StoreError::Version { found: v }),
        }

        Ok(Self { conn })
    }

    pub fn save_enrichment(&self, label: &str, roster: &EnrichedRoster) -> Result<(), StoreError> {
        let payload = serde_json::to_string(roster)
            .map_err(|e| StoreError::Sqlite(format!("serializing enrichment: {e}")))?;
        self.put(label, KIND_ENRICHMENT, &payload)
    }

    pub fn load_enrichment(&self, label: &str) -> Result<EnrichedRoster, StoreError> {
        let payload = self.get(label, KIND_ENRICHMENT)?;
        serde_json::from_str(&payload).map_err(|e| StoreError::Corrupt {
            label: label.to_string(),
            detail: e.to_string(),
        })
    }

    pub fn save_screen(&self, label: &str, result: &ScreenResult) -> Result<(), StoreError> {
        let payload = serde_json::to_string(result)
            .map_err(|e| StoreError::Sqlite(format!("serializing screen run: {e}")))?;
        self.put(label, KIND_SCREEN, &payload)
    }

    pub fn load_screen(&self, label: &str) -> Result<ScreenResult, StoreError> {
        let payload = self.get(label, KIND_SCREEN)?;
        serde_json::from_str(&payload).map_err(|e| StoreError::Corrupt {
            label: label.to_string(),
            detail: e.to_string(),
        })
    }

    /// All snapshots, newest first.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT label, kind, created_at, fingerprint FROM runs ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SnapshotInfo {
                label: row.get(0)?,
                kind: row.get(1)?,
                created_at: row.get(2)?,
                fingerprint: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn put(&self, label: &str, kind: &str, payload: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO runs (label, kind, created_at, fingerprint, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                label,
                kind,
                Utc::now().to_rfc3339(),
                fingerprint(payload),
                payload,
            ],
        )?;
        Ok(())
    }

    fn get(&self, label: &str, expected_kind: &str) -> Result<String, StoreError> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT kind, fingerprint, payload FROM runs WHERE label = ?1",
                params![label],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (kind, stored_fp, payload) = row.ok_or_else(|| StoreError::UnknownLabel {
            label: label.to_string(),
            expected_kind: expected_kind.to_string(),
        })?;

        if kind != expected_kind {
            return Err(StoreError::UnknownLabel {
                label: label.to_string(),
                expected_kind: expected_kind.to_string(),
            });
        }

        let actual_fp = fingerprint(&payload);
        if actual_fp != stored_fp {
            return Err(StoreError::Corrupt {
                label: label.to_string(),
                detail: format!("fingerprint mismatch (stored {stored_fp}, actual {actual_fp})"),
            });
        }

        Ok(payload)
    }
}

fn fingerprint(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use permitscreen_engine::model::{
        CodeSet, EnrichedFacility, FacilityRecord, ScreenMeta, ScreenSummary, Verdict,
    };
    use permitscreen_engine::PotwRule;
    use tempfile::tempdir;

    fn sample_roster() -> EnrichedRoster {
        EnrichedRoster {
            facilities: vec![EnrichedFacility {
                record: FacilityRecord {
                    permit_id: "TX0047163".into(),
                    name: "CITY OF HOUSTON 69TH ST".into(),
                    city: "HOUSTON".into(),
                    state: "TX".into(),
                    obligation: String::new(),
                },
                codes: CodeSet::Codes(vec!["4952".into()]),
                verdict: Verdict::SewerSystem,
            }],
            failures: vec![],
        }
    }

    fn sample_screen() -> ScreenResult {
        ScreenResult {
            meta: ScreenMeta {
                config_name: "Test".into(),
                potw_rule: PotwRule::Revised,
                engine_version: "0.0.0".into(),
                run_at: Utc::now().to_rfc3339(),
            },
            summary: ScreenSummary::default(),
            candidates: vec![],
            retained: vec![],
        }
    }

    #[test]
    fn enrichment_round_trip() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("runs.db")).unwrap();

        store.save_enrichment("baseline", &sample_roster()).unwrap();
        let loaded = store.load_enrichment("baseline").unwrap();
        assert_eq!(loaded.facilities.len(), 1);
        assert_eq!(loaded.facilities[0].record.permit_id, "TX0047163");
        assert_eq!(loaded.facilities[0].codes, CodeSet::Codes(vec!["4952".into()]));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("runs.db")).unwrap();
        let err = store.load_screen("missing").unwrap_err();
        assert!(matches!(err, StoreError::UnknownLabel { .. }));
    }

    #[test]
    fn kind_mismatch_is_an_unknown_label() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("runs.db")).unwrap();
        store.save_enrichment("baseline", &sample_roster()).unwrap();
        let err = store.load_screen("baseline").unwrap_err();
        assert!(matches!(err, StoreError::UnknownLabel { .. }));
    }

    #[test]
    fn save_replaces_existing_label() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("runs.db")).unwrap();

        store.save_screen("weekly", &sample_screen()).unwrap();
        let mut second = sample_screen();
        second.meta.config_name = "Updated".into();
        store.save_screen("weekly", &second).unwrap();

        let loaded = store.load_screen("weekly").unwrap();
        assert_eq!(loaded.meta.config_name, "Updated");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn tampered_payload_fails_the_fingerprint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runs.db");
        {
            let store = SnapshotStore::open(&path).unwrap();
            store.save_enrichment("baseline", &sample_roster()).unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE runs SET payload = replace(payload, '4952', '4941') WHERE label = 'baseline'",
            [],
        )
        .unwrap();
        drop(conn);

        let store = SnapshotStore::open(&path).unwrap();
        let err = store.load_enrichment("baseline").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn list_reports_kind_and_fingerprint() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("runs.db")).unwrap();
        store.save_enrichment("baseline", &sample_roster()).unwrap();
        store.save_screen("weekly", &sample_screen()).unwrap();

        let infos = store.list().unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().any(|i| i.label == "baseline" && i.kind == "enrichment"));
        assert!(infos.iter().all(|i| i.fingerprint.len() == 64));
    }
}
