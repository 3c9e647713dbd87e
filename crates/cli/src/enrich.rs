// `pscreen enrich` - roster lookup against a code source

use std::path::PathBuf;

use permitscreen_io::roster::{import_roster, read_file_as_utf8};
use permitscreen_io::SnapshotStore;
use permitscreen_lookup::{enrich_roster, CachedSource, CodeRegistry, CodeSource, RemoteRegistry};

use crate::validate::{load_config, resolve_path};
use crate::CliError;

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_enrich(
    config_path: PathBuf,
    label: String,
    store_path: PathBuf,
    registry: Option<PathBuf>,
    endpoint: Option<String>,
    api_key: Option<String>,
    workers: Option<usize>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    let roster_path = resolve_path(&config_path, &config.roster.file);
    let records = import_roster(&roster_path, &config.roster.columns)?;
    if !quiet {
        eprintln!("loaded {} roster records from {}", records.len(), roster_path.display());
    }

    // Flag beats config; a local registry beats a remote endpoint.
    let registry_path = registry.or_else(|| {
        config
            .lookup
            .registry
            .as_ref()
            .map(|file| resolve_path(&config_path, file))
    });

    let source: Box<dyn CodeSource> = match registry_path {
        Some(path) => {
            let csv_data = read_file_as_utf8(&path)
                .map_err(|e| CliError::args(format!("cannot read {}: {e}", path.display())))?;
            let registry = CodeRegistry::from_csv(&csv_data)?;
            if !quiet {
                eprintln!("registry {} ({} rows)", path.display(), registry.len());
            }
            Box::new(CachedSource::new(registry))
        }
        None => match endpoint.or_else(|| config.lookup.endpoint.clone()) {
            Some(endpoint) => Box::new(CachedSource::new(RemoteRegistry::new(&endpoint, api_key)?)),
            None => {
                return Err(CliError::args(
                    "no code source configured (set [lookup] registry or endpoint, \
                     or pass --registry / --endpoint)",
                ))
            }
        },
    };

    let workers = workers.unwrap_or(config.lookup.workers);
    if workers == 0 {
        return Err(CliError::args("--workers must be at least 1"));
    }

    let roster = enrich_roster(&records, source.as_ref(), &config.taxonomy, workers, quiet);

    for failure in &roster.failures {
        eprintln!("warning: lookup failed for {}: {}", failure.permit_id, failure.reason);
    }

    let store = SnapshotStore::open(&store_path)?;
    store.save_enrichment(&label, &roster)?;

    if !quiet {
        eprintln!(
            "enriched {} facilities ({} lookup failures) -> snapshot {:?} in {}",
            roster.facilities.len(),
            roster.failures.len(),
            label,
            store_path.display(),
        );
    }
    Ok(())
}
