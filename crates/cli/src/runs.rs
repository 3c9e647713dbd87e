// `pscreen runs` - list store snapshots

use std::path::PathBuf;

use permitscreen_io::SnapshotStore;

use crate::CliError;

pub(crate) fn cmd_runs(store_path: PathBuf, json: bool) -> Result<(), CliError> {
    let store = SnapshotStore::open(&store_path)?;
    let infos = store.list()?;

    if json {
        let entries: Vec<serde_json::Value> = infos
            .iter()
            .map(|info| {
                serde_json::json!({
                    "label": info.label,
                    "kind": info.kind,
                    "created_at": info.created_at,
                    "fingerprint": info.fingerprint,
                })
            })
            .collect();
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::args(format!("serializing run list: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    if infos.is_empty() {
        eprintln!("no snapshots in {}", store_path.display());
        return Ok(());
    }

    for info in infos {
        println!(
            "{:<20} {:<12} {}  {}",
            info.label,
            info.kind,
            info.created_at,
            &info.fingerprint[..info.fingerprint.len().min(12)],
        );
    }
    Ok(())
}
