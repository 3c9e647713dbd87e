// `pscreen screen` - run the retention rules over an enrichment snapshot

use std::path::PathBuf;

use permitscreen_engine::{run, ReviewMap};
use permitscreen_io::export::export_screened;
use permitscreen_io::roster::import_review;
use permitscreen_io::SnapshotStore;

use crate::validate::{load_config, resolve_path};
use crate::CliError;

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_screen(
    config_path: PathBuf,
    enrichment: String,
    label: String,
    store_path: PathBuf,
    review: Option<PathBuf>,
    out: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let store = SnapshotStore::open(&store_path)?;
    let roster = store.load_enrichment(&enrichment)?;

    // Flag beats config; no review artifact means every decision defaults
    // to keep.
    let review_path = review.or_else(|| {
        config
            .review
            .as_ref()
            .map(|r| resolve_path(&config_path, &r.file))
    });
    let review_map = match review_path {
        Some(path) => import_review(&path)?,
        None => ReviewMap::default(),
    };

    let result = run(&config, &roster, &review_map);
    store.save_screen(&label, &result)?;

    if let Some(out) = out {
        let out_label = export_screened(&result.candidates, &Some(out))?;
        if !quiet {
            eprintln!("wrote {} candidates to {}", result.candidates.len(), out_label);
        }
    }

    if json {
        let payload = serde_json::json!({
            "meta": result.meta,
            "summary": result.summary,
        });
        let rendered = serde_json::to_string_pretty(&payload)
            .map_err(|e| CliError::args(format!("serializing summary: {e}")))?;
        println!("{rendered}");
    } else if !quiet {
        eprintln!(
            "screen {:?}: {} facilities, {} retained, {} removal candidates ({} rule)",
            label,
            result.summary.total_facilities,
            result.summary.retained,
            result.summary.candidates,
            result.meta.potw_rule,
        );
        let mut counts: Vec<(&String, &usize)> = result.summary.rule_counts.iter().collect();
        counts.sort();
        for (rule, count) in counts {
            eprintln!("  {rule}: {count}");
        }
    }
    Ok(())
}
