use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use permitscreen_engine::classify::classify;
use permitscreen_engine::config::TaxonomyConfig;
use permitscreen_engine::model::{
    CodeSet, EnrichedFacility, EnrichedRoster, FacilityRecord, LookupFailure,
};

use crate::CodeSource;

const PROGRESS_EVERY: usize = 250;

/// Batch enrichment: look up every roster record against `source`,
/// classify, and collect the results in roster order.
///
/// Lookups run on a bounded worker pool; the work is rate-limit bound,
/// not CPU bound, so `workers` caps concurrent in-flight requests. A
/// failed lookup never aborts the batch: the facility is enriched as
/// `NO_MATCH` and the failure recorded for audit.
pub fn enrich_roster(
    records: &[FacilityRecord],
    source: &dyn CodeSource,
    taxonomy: &TaxonomyConfig,
    workers: usize,
    quiet: bool,
) -> EnrichedRoster {
    let total = records.len();
    let workers = workers.clamp(1, total.max(1));

    let next = AtomicUsize::new(0);
    let done = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<EnrichedFacility>>> = Mutex::new(vec![None; total]);
    let failures: Mutex<Vec<(usize, LookupFailure)>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::SeqCst);
                if i >= total {
                    break;
                }
                let record = &records[i];

                let codes = match source.lookup(&record.permit_id) {
                    Ok(codes) => codes,
                    Err(e) => {
                        if let Ok(mut failures) = failures.lock() {
                            failures.push((
                                i,
                                LookupFailure {
                                    permit_id: record.permit_id.clone(),
                                    reason: e.to_string(),
                                },
                            ));
                        }
                        CodeSet::NoMatch
                    }
                };
                let verdict = classify(&codes, taxonomy);

                if let Ok(mut slots) = slots.lock() {
                    slots[i] = Some(EnrichedFacility {
                        record: record.clone(),
                        codes,
                        verdict,
                    });
                }

                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                if !quiet && (finished % PROGRESS_EVERY == 0 || finished == total) {
                    eprintln!("  looked up {finished}/{total} facilities");
                }
            });
        }
    });

    let facilities = slots
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .into_iter()
        .flatten()
        .collect();

    let mut failures = failures
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    failures.sort_by_key(|(i, _)| *i);
    let failures = failures.into_iter().map(|(_, f)| f).collect();

    EnrichedRoster { facilities, failures }
}
