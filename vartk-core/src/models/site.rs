use fxhash::FxHashMap;

use crate::models::variant::{CallingMode, VariantClass, Zygosity};

/// The merge key: one site per unique (position, class, length) tuple per
/// contig. A structured key, so `1‖23` and `12‖3` can never collide the
/// way concatenated text keys can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteKey {
    pub position: u64,
    pub class: VariantClass,
    pub length: u64,
}

/// A multi-specimen consensus record for one merged site.
///
/// Per-specimen maps hold one entry per *known* specimen for alts and
/// mapping coverage (baseline entries are the reference allele or the
/// `"nc"` no-call sentinel), while zygosity, raw coverage and frequency
/// only carry entries for specimens that actually submitted a call.
#[derive(Debug, Clone)]
pub struct MergedVariantSite {
    pub position: u64,
    pub class: VariantClass,
    pub length: u64,
    pub ref_allele: String,
    pub mode: CallingMode,

    /// specimen -> alt allele(s); same-specimen multi-allelic calls are
    /// joined with `/`.
    pub specimen_alts: FxHashMap<String, String>,
    pub specimen_zygs: FxHashMap<String, Zygosity>,
    pub specimen_covs: FxHashMap<String, u32>,
    /// specimen -> rounded mean depth over the event span; `None` means no
    /// confident reference-call data (rendered as `-1` in reports).
    pub specimen_mapping_cov: FxHashMap<String, Option<u32>>,
    pub specimen_freqs: FxHashMap<String, f64>,

    /// Raw calls folded into this site (a multi-allelic specimen counts
    /// once per allele).
    pub number_of_alts: u32,
    /// Specimens confidently called reference that never submitted an alt.
    pub number_of_called_refs: u32,

    pub avg_frequency: Option<f64>,
    pub avg_balance: Option<f64>,
    pub critical_balance: bool,
    /// `None` when no folded call carried mapping coverage.
    pub avg_mapping_coverage: Option<f64>,

    pub dist_left: i64,
    pub dist_right: i64,
    pub left_flank: Option<String>,
    pub right_flank: Option<String>,

    /// Every specimen's alt in ingestion order, `|`-separated. Report
    /// readability only.
    pub shared_alt: String,
}

impl MergedVariantSite {
    pub fn new(
        position: u64,
        class: VariantClass,
        length: u64,
        ref_allele: String,
        mode: CallingMode,
    ) -> Self {
        MergedVariantSite {
            position,
            class,
            length,
            ref_allele,
            mode,
            specimen_alts: FxHashMap::default(),
            specimen_zygs: FxHashMap::default(),
            specimen_covs: FxHashMap::default(),
            specimen_mapping_cov: FxHashMap::default(),
            specimen_freqs: FxHashMap::default(),
            number_of_alts: 0,
            number_of_called_refs: 0,
            avg_frequency: None,
            avg_balance: None,
            critical_balance: false,
            avg_mapping_coverage: None,
            dist_left: 0,
            dist_right: 0,
            left_flank: None,
            right_flank: None,
            shared_alt: String::new(),
        }
    }

    pub fn key(&self) -> SiteKey {
        SiteKey {
            position: self.position,
            class: self.class,
            length: self.length,
        }
    }

    pub fn effective_length(&self) -> u64 {
        self.class.effective_length(self.length)
    }
}
