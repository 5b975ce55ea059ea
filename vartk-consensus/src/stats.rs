use fxhash::FxHashMap;

use vartk_core::models::{CallingMode, SpecimenStats};

use crate::ingest::CallSet;

/// Builds per-specimen summary statistics over all raw calls, independent
/// of the merge pass. Accumulates first, derives the means at the end, and
/// synthesizes an all-zero bucket for every known specimen that never
/// produced a call, so the report always lists every specimen.
pub fn build_specimen_stats(call_set: &CallSet, mode: CallingMode) -> Vec<SpecimenStats> {
    let mut buckets: FxHashMap<String, SpecimenStats> = FxHashMap::default();

    for call in call_set.all_calls() {
        buckets
            .entry(call.specimen.clone())
            .or_insert_with(|| SpecimenStats::zeroed(&call.specimen))
            .observe(call);
    }

    call_set
        .specimen_names
        .iter()
        .map(|name| {
            let mut stats = buckets
                .remove(name)
                .unwrap_or_else(|| SpecimenStats::zeroed(name));
            stats.finalize(mode);
            stats
        })
        .collect()
}
