use fxhash::{FxHashMap, FxHashSet};

use vartk_core::models::{CallingMode, MergedVariantSite, RawVariantCall, SiteKey};

use crate::consts::{
    ALT_SEPARATOR, CRITICAL_BALANCE_HIGH, CRITICAL_BALANCE_LOW, MISSING_FIELD, NO_CALL,
    SHARED_ALT_SEPARATOR,
};
use crate::coverage::CoverageIndex;

/// Grouping state for one site: the site record under construction plus
/// the two specimen sets the final reference-call counter is derived from.
struct SiteAccumulator {
    site: MergedVariantSite,
    /// Specimens tentatively marked confident-reference at creation.
    baseline_refs: FxHashSet<String>,
    /// Specimens that submitted at least one call for this site.
    callers: FxHashSet<String>,
    /// Every raw call folded in, multi-allelic repeats included.
    calls: Vec<RawVariantCall>,
}

impl SiteAccumulator {
    /// Creates the site for a freshly observed key and baseline-initializes
    /// the per-specimen maps for every known specimen: confident reference
    /// where the coverage index shows mean depth over the event span above
    /// the threshold, no-call otherwise. Without a coverage index every
    /// specimen starts as no-call.
    fn baseline(
        call: &RawVariantCall,
        contig: &str,
        specimen_names: &[String],
        coverage: Option<&CoverageIndex>,
        min_cov_for_ref: u32,
        mode: CallingMode,
    ) -> Self {
        let mut site = MergedVariantSite::new(
            call.position,
            call.class,
            call.length,
            call.ref_allele.clone(),
            mode,
        );
        let mut baseline_refs = FxHashSet::default();

        for name in specimen_names {
            let depth = coverage
                .and_then(|c| c.rounded_mean_depth(name, contig, call.position, call.length));
            match depth {
                Some(depth) if depth > min_cov_for_ref => {
                    site.specimen_alts
                        .insert(name.clone(), call.ref_allele.clone());
                    site.specimen_mapping_cov.insert(name.clone(), Some(depth));
                    baseline_refs.insert(name.clone());
                }
                _ => {
                    site.specimen_alts.insert(name.clone(), NO_CALL.to_string());
                    site.specimen_mapping_cov.insert(name.clone(), None);
                }
            }
        }

        SiteAccumulator {
            site,
            baseline_refs,
            callers: FxHashSet::default(),
            calls: Vec::new(),
        }
    }

    /// Folds one raw call into the site. The first call from a specimen
    /// overwrites its baseline entry; later calls from the same specimen
    /// are multi-allelic and only extend the alt string.
    fn fold(&mut self, call: &RawVariantCall) {
        if self.callers.contains(&call.specimen) {
            if let Some(alt) = self.site.specimen_alts.get_mut(&call.specimen) {
                alt.push(ALT_SEPARATOR);
                alt.push_str(&call.alt_allele);
            }
        } else {
            self.site
                .specimen_alts
                .insert(call.specimen.clone(), call.alt_allele.clone());
            self.site
                .specimen_zygs
                .insert(call.specimen.clone(), call.zygosity);
            if let Some(coverage) = call.raw_coverage() {
                self.site.specimen_covs.insert(call.specimen.clone(), coverage);
            }
            if let Some(frequency) = call.frequency() {
                self.site
                    .specimen_freqs
                    .insert(call.specimen.clone(), frequency);
            }
            self.site
                .specimen_mapping_cov
                .insert(call.specimen.clone(), call.mapping_coverage);
            self.callers.insert(call.specimen.clone());
        }

        self.site.number_of_alts += 1;
        self.calls.push(call.clone());
    }

    /// Derives the counters and aggregates once grouping is complete.
    fn finish(mut self, specimen_names: &[String]) -> MergedVariantSite {
        // confidently reference and never overridden by a call
        self.site.number_of_called_refs =
            self.baseline_refs.difference(&self.callers).count() as u32;

        let nof_calls = self.calls.len();
        if nof_calls > 0 {
            let frequencies: Vec<f64> = self.calls.iter().filter_map(|c| c.frequency()).collect();
            if !frequencies.is_empty() {
                self.site.avg_frequency =
                    Some(frequencies.iter().sum::<f64>() / frequencies.len() as f64);
            }

            let balances: Vec<f64> = self.calls.iter().filter_map(|c| c.balance()).collect();
            if !balances.is_empty() {
                let avg = balances.iter().sum::<f64>() / balances.len() as f64;
                self.site.avg_balance = Some(avg);
                self.site.critical_balance =
                    avg < CRITICAL_BALANCE_LOW || avg > CRITICAL_BALANCE_HIGH;
            }

            // only calls that actually carry mapping coverage qualify; with
            // none the average stays unavailable rather than dividing by zero
            let covered: Vec<u32> = self
                .calls
                .iter()
                .filter_map(|c| c.mapping_coverage)
                .collect();
            if !covered.is_empty() {
                self.site.avg_mapping_coverage =
                    Some(covered.iter().map(|&c| c as f64).sum::<f64>() / covered.len() as f64);
            }
        }

        self.site.shared_alt = specimen_names
            .iter()
            .map(|name| {
                self.site
                    .specimen_alts
                    .get(name)
                    .map(String::as_str)
                    .unwrap_or(MISSING_FIELD)
            })
            .collect::<Vec<_>>()
            .join(SHARED_ALT_SEPARATOR);

        self.site
    }
}

/// Groups the raw calls of one contig into merged sites keyed by
/// (position, class, length), in first-observation order.
pub fn group_calls(
    contig: &str,
    calls: &[RawVariantCall],
    specimen_names: &[String],
    coverage: Option<&CoverageIndex>,
    min_cov_for_ref: u32,
    mode: CallingMode,
) -> Vec<MergedVariantSite> {
    let mut order: Vec<SiteKey> = Vec::new();
    let mut accumulators: FxHashMap<SiteKey, SiteAccumulator> = FxHashMap::default();

    for call in calls {
        let key = SiteKey {
            position: call.position,
            class: call.class,
            length: call.length,
        };

        let accumulator = match accumulators.entry(key) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                order.push(key);
                entry.insert(SiteAccumulator::baseline(
                    call,
                    contig,
                    specimen_names,
                    coverage,
                    min_cov_for_ref,
                    mode,
                ))
            }
        };
        accumulator.fold(call);
    }

    order
        .into_iter()
        .filter_map(|key| accumulators.remove(&key))
        .map(|accumulator| accumulator.finish(specimen_names))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use vartk_core::models::{CallMetrics, VariantClass, Zygosity};

    fn snp_call(specimen: &str, position: u64, alt: &str, mapping_coverage: Option<u32>) -> RawVariantCall {
        RawVariantCall {
            specimen: specimen.to_string(),
            position,
            class: VariantClass::Snv,
            length: 1,
            ref_allele: "A".to_string(),
            alt_allele: alt.to_string(),
            zygosity: Zygosity::Heterozygous,
            metrics: CallMetrics::Snp {
                count: 27,
                coverage: 30,
                frequency: 0.9,
                balance: 0.5,
                quality: 40.0,
            },
            mapping_coverage,
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[rstest]
    fn test_single_call_without_coverage_leaves_others_no_call() {
        let calls = vec![snp_call("sample_a", 500, "G", None)];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a", "sample_b"]),
            None,
            3,
            CallingMode::Snp,
        );

        assert_eq!(sites.len(), 1);
        let site = &sites[0];
        assert_eq!(site.position, 500);
        assert_eq!(site.class, VariantClass::Snv);
        assert_eq!(site.number_of_alts, 1);
        assert_eq!(site.number_of_called_refs, 0);
        assert_eq!(site.specimen_alts["sample_a"], "G");
        assert_eq!(site.specimen_alts["sample_b"], NO_CALL);
        assert_eq!(site.specimen_mapping_cov["sample_b"], None);
        assert_eq!(site.shared_alt, "G|nc");
        assert_eq!(site.avg_frequency, Some(0.9));
        assert_eq!(site.avg_balance, Some(0.5));
        assert!(!site.critical_balance);
        assert_eq!(site.avg_mapping_coverage, None);
    }

    #[rstest]
    fn test_different_specimens_same_site_merge() {
        let calls = vec![
            snp_call("sample_a", 100, "A", None),
            snp_call("sample_b", 100, "T", None),
        ];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a", "sample_b"]),
            None,
            3,
            CallingMode::Snp,
        );

        assert_eq!(sites.len(), 1);
        let site = &sites[0];
        assert_eq!(site.number_of_alts, 2);
        // each specimen keeps its own single-letter allele
        assert_eq!(site.specimen_alts["sample_a"], "A");
        assert_eq!(site.specimen_alts["sample_b"], "T");
    }

    #[rstest]
    fn test_same_specimen_multi_allelic_joins_alts() {
        let calls = vec![
            snp_call("sample_a", 100, "A", None),
            snp_call("sample_a", 100, "T", None),
        ];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a"]),
            None,
            3,
            CallingMode::Snp,
        );

        assert_eq!(sites.len(), 1);
        let site = &sites[0];
        assert_eq!(site.specimen_alts["sample_a"], "A/T");
        assert_eq!(site.number_of_alts, 2);
        // the second allele counts twice in the frequency average
        assert_eq!(site.avg_frequency, Some(0.9));
    }

    #[rstest]
    fn test_sites_with_distinct_keys_stay_separate() {
        let mut deletion = snp_call("sample_a", 100, "-", None);
        deletion.class = VariantClass::Deletion;
        deletion.length = 3;

        let calls = vec![snp_call("sample_a", 100, "T", None), deletion];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a"]),
            None,
            3,
            CallingMode::Snp,
        );

        assert_eq!(sites.len(), 2);
        let keys: HashSet<SiteKey> = sites.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), 2);
    }

    fn coverage_fixture(dir: &Path, specimen: &str, depth_at_500: u32) {
        let mut file = std::fs::File::create(dir.join(format!("{specimen}.csv"))).unwrap();
        let mut fields = vec!["contig1".to_string(), "500".to_string()];
        fields.extend(std::iter::repeat_n("0".to_string(), 8));
        fields.push(depth_at_500.to_string());
        writeln!(file, "{}", fields.join("\t")).unwrap();
    }

    #[rstest]
    fn test_covered_specimen_without_call_counts_as_reference() {
        let dir = tempfile::tempdir().unwrap();
        coverage_fixture(dir.path(), "sample_a", 30);
        coverage_fixture(dir.path(), "sample_b", 25);
        let coverage = CoverageIndex::from_dir(dir.path()).unwrap();

        let calls = vec![snp_call("sample_a", 500, "G", Some(30))];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a", "sample_b"]),
            Some(&coverage),
            3,
            CallingMode::Snp,
        );

        let site = &sites[0];
        // sample_b is confidently reference; sample_a submitted the alt and
        // must not be double counted
        assert_eq!(site.number_of_alts, 1);
        assert_eq!(site.number_of_called_refs, 1);
        assert_eq!(site.specimen_alts["sample_a"], "G");
        assert_eq!(site.specimen_alts["sample_b"], "A");
        assert_eq!(site.specimen_mapping_cov["sample_b"], Some(25));
        assert_eq!(site.avg_mapping_coverage, Some(30.0));
    }

    #[rstest]
    fn test_below_threshold_specimen_is_no_call() {
        let dir = tempfile::tempdir().unwrap();
        coverage_fixture(dir.path(), "sample_a", 30);
        coverage_fixture(dir.path(), "sample_b", 2);
        let coverage = CoverageIndex::from_dir(dir.path()).unwrap();

        let calls = vec![snp_call("sample_a", 500, "G", Some(30))];
        let sites = group_calls(
            "contig1",
            &calls,
            &names(&["sample_a", "sample_b"]),
            Some(&coverage),
            3,
            CallingMode::Snp,
        );

        let site = &sites[0];
        assert_eq!(site.number_of_called_refs, 0);
        assert_eq!(site.specimen_alts["sample_b"], NO_CALL);
        assert_eq!(site.specimen_mapping_cov["sample_b"], None);
    }

    #[rstest]
    fn test_critical_balance_flag() {
        let mut skewed = snp_call("sample_a", 10, "G", None);
        if let CallMetrics::Snp { balance, .. } = &mut skewed.metrics {
            *balance = 0.1;
        }
        let sites = group_calls(
            "contig1",
            &[skewed],
            &names(&["sample_a"]),
            None,
            3,
            CallingMode::Snp,
        );
        assert!(sites[0].critical_balance);
    }
}
