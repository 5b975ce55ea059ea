/// Alt-map sentinel for a specimen without enough depth data to assert
/// either a variant or a reference genotype.
pub const NO_CALL: &str = "nc";

/// Separator for multiple alleles from the same specimen at one site.
pub const ALT_SEPARATOR: char = '/';

/// Separator between specimens in the shared-alt display string.
pub const SHARED_ALT_SEPARATOR: &str = "|";

/// Placeholder for absent report cells.
pub const MISSING_FIELD: &str = "-";

/// Mean depth over the event span must exceed this for a specimen without
/// a call to count as confidently reference.
pub const DEFAULT_MIN_COV_FOR_REF: u32 = 3;

pub const DEFAULT_STATS_OUT: &str = "stats.tsv";
pub const DEFAULT_REPORT_OUT: &str = "consensus.tsv";

/// Both input table kinds are discovered with this pattern, one file per
/// specimen; the specimen name is the file stem.
pub const TABLE_GLOB: &str = "*.csv";

/// Average strand balance outside [low, high] flags a site as critically
/// imbalanced.
pub const CRITICAL_BALANCE_LOW: f64 = 0.2;
pub const CRITICAL_BALANCE_HIGH: f64 = 0.8;

/// Column names of the caller's variant table exports.
pub mod columns {
    pub const TYPE: &str = "Type";
    pub const LENGTH: &str = "Length";
    pub const REFERENCE: &str = "Reference";
    pub const ALLELE: &str = "Allele";
    pub const ZYGOSITY: &str = "Zygosity";
    pub const REFERENCE_POSITION: &str = "Reference Position";
    pub const REGION: &str = "Region";
    /// Contig column of SNP-track tables.
    pub const MAPPING: &str = "Mapping";
    /// Contig column of INDEL-track tables.
    pub const CHROMOSOME: &str = "Chromosome";
    // SNP track
    pub const COUNT: &str = "Count";
    pub const COVERAGE: &str = "Coverage";
    pub const FREQUENCY: &str = "Frequency";
    pub const FORWARD_REVERSE_BALANCE: &str = "Forward/reverse balance";
    pub const AVERAGE_QUALITY: &str = "Average quality";
    // INDEL track
    pub const REPEAT: &str = "Repeat";
    pub const NOF_READS: &str = "Number of reads";
    pub const SEQ_COMPLEXITY: &str = "Sequence complexity";
}

/// Per-base coverage tables are tab-separated with these column indices.
pub const COVERAGE_CONTIG_COL: usize = 0;
pub const COVERAGE_POSITION_COL: usize = 1;
pub const COVERAGE_DEPTH_COL: usize = 10;
