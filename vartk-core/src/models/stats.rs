use fxhash::FxHashMap;

use crate::models::variant::{CallMetrics, CallingMode, RawVariantCall, VariantClass};

/// Running min/max/sum/count for one tracked metric. Accumulate first,
/// derive the mean once at the end, so the result does not depend on
/// visit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningMetric {
    pub min: f64,
    pub max: f64,
    sum: f64,
    count: u64,
    pub avg: f64,
}

impl RunningMetric {
    pub fn observe(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn finalize(&mut self) {
        if self.count > 0 {
            self.avg = self.sum / self.count as f64;
        }
    }
}

/// Per-specimen summary over all raw calls, independent of merging.
#[derive(Debug, Clone)]
pub struct SpecimenStats {
    pub specimen: String,
    pub nof_variants: u64,
    pub class_counts: FxHashMap<VariantClass, u64>,
    // SNP track
    pub coverage: RunningMetric,
    pub frequency: RunningMetric,
    pub quality: RunningMetric,
    // INDEL track
    pub nof_reads: RunningMetric,
}

impl SpecimenStats {
    /// An empty bucket; also the synthetic all-zero row for specimens with
    /// no observed calls.
    pub fn zeroed(specimen: &str) -> Self {
        SpecimenStats {
            specimen: specimen.to_string(),
            nof_variants: 0,
            class_counts: FxHashMap::default(),
            coverage: RunningMetric::default(),
            frequency: RunningMetric::default(),
            quality: RunningMetric::default(),
            nof_reads: RunningMetric::default(),
        }
    }

    pub fn observe(&mut self, call: &RawVariantCall) {
        match &call.metrics {
            CallMetrics::Snp {
                coverage,
                frequency,
                quality,
                ..
            } => {
                self.coverage.observe(*coverage as f64);
                self.frequency.observe(*frequency);
                self.quality.observe(*quality);
            }
            CallMetrics::Indel { nof_reads, .. } => {
                self.nof_reads.observe(*nof_reads as f64);
            }
        }
        *self.class_counts.entry(call.class).or_insert(0) += 1;
        self.nof_variants += 1;
    }

    pub fn finalize(&mut self, mode: CallingMode) {
        match mode {
            CallingMode::Snp => {
                self.coverage.finalize();
                self.frequency.finalize();
                self.quality.finalize();
            }
            CallingMode::Indel => {
                self.nof_reads.finalize();
            }
        }
    }

    pub fn class_count(&self, class: VariantClass) -> u64 {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }
}
