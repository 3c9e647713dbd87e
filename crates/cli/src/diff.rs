// `pscreen diff` - reconcile two screen runs

use std::io::Write;
use std::path::PathBuf;

use permitscreen_engine::diff_runs;
use permitscreen_engine::model::ScreenedFacility;
use permitscreen_io::SnapshotStore;

use crate::exit_codes::EXIT_DIFF_DIFFS;
use crate::{CliError, DiffOutputFormat};

pub(crate) fn cmd_diff(
    left: String,
    right: String,
    store_path: PathBuf,
    out: DiffOutputFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let store = SnapshotStore::open(&store_path)?;
    let run_a = store.load_screen(&left)?;
    let run_b = store.load_screen(&right)?;

    let diff = diff_runs(&run_a.candidates, &run_b.candidates);

    let rendered = match out {
        DiffOutputFormat::Json => serde_json::to_string_pretty(&diff)
            .map_err(|e| CliError::args(format!("serializing diff: {e}")))?,
        DiffOutputFormat::Csv => render_csv(&diff.added, &diff.removed)?,
    };

    match &output {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .map_err(|e| CliError::args(format!("cannot write {}: {e}", path.display())))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{rendered}")
                .map_err(|e| CliError::args(format!("writing diff: {e}")))?;
        }
    }

    if !quiet {
        eprintln!(
            "{} added, {} removed ({:?} -> {:?})",
            diff.added.len(),
            diff.removed.len(),
            left,
            right,
        );
    }

    if diff.added.is_empty() && diff.removed.is_empty() {
        Ok(())
    } else {
        Err(CliError::exit(EXIT_DIFF_DIFFS))
    }
}

fn render_csv(added: &[ScreenedFacility], removed: &[ScreenedFacility]) -> Result<String, CliError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let map_err = |e: csv::Error| CliError::args(format!("CSV write error: {e}"));

    writer
        .write_record([
            "change", "permit_id", "name", "city", "state", "obligation", "codes", "verdict",
            "rule",
        ])
        .map_err(map_err)?;

    for (change, rows) in [("added", added), ("removed", removed)] {
        for row in rows {
            writer
                .write_record([
                    change,
                    row.record.permit_id.as_str(),
                    row.record.name.as_str(),
                    row.record.city.as_str(),
                    row.record.state.as_str(),
                    row.record.obligation.as_str(),
                    &row.codes.to_string(),
                    &row.verdict.to_string(),
                    &row.rule.to_string(),
                ])
                .map_err(map_err)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::args(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CliError::args(format!("CSV encoding error: {e}")))
}
