// `pscreen export` - write a screen snapshot to delimited text

use std::path::PathBuf;

use permitscreen_io::export::export_screened_with_delimiter;
use permitscreen_io::SnapshotStore;

use crate::{CliError, ExportSet};

pub(crate) fn cmd_export(
    label: String,
    store_path: PathBuf,
    set: ExportSet,
    delimiter: char,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    if !delimiter.is_ascii() {
        return Err(CliError::args(format!(
            "delimiter must be a single ASCII character, got {delimiter:?}"
        )));
    }

    let store = SnapshotStore::open(&store_path)?;
    let result = store.load_screen(&label)?;

    let rows = match set {
        ExportSet::Candidates => result.candidates,
        ExportSet::Retained => result.retained,
        ExportSet::All => {
            // Roster order within each disposition, candidates first.
            let mut rows = result.candidates;
            rows.extend(result.retained);
            rows
        }
    };

    let out_label = export_screened_with_delimiter(&rows, &output, delimiter as u8)?;
    eprintln!("wrote {} rows to {}", rows.len(), out_label);
    Ok(())
}
