use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::VariantError;

/// The closed set of event classes the upstream caller reports. Distance
/// and flank computations match on this exhaustively, so a new class is a
/// compile-time change rather than a stringly-typed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantClass {
    Snv,
    Mnp,
    Insertion,
    Deletion,
}

impl VariantClass {
    /// Reference bases an event of this class occupies when measuring
    /// distances to its neighbors. Insertions sit between two reference
    /// bases and occupy none.
    pub fn effective_length(&self, length: u64) -> u64 {
        match self {
            VariantClass::Insertion => 0,
            _ => length,
        }
    }
}

impl FromStr for VariantClass {
    type Err = VariantError;

    // The caller exports `SNV`/`MNV`; older tables carry the normalized
    // `SNP`/`MNP` spellings. Both are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SNV" | "SNP" => Ok(VariantClass::Snv),
            "MNV" | "MNP" => Ok(VariantClass::Mnp),
            "Insertion" => Ok(VariantClass::Insertion),
            "Deletion" => Ok(VariantClass::Deletion),
            _ => Err(VariantError::UnknownVariantClass(s.to_string())),
        }
    }
}

impl Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VariantClass::Snv => "SNV",
            VariantClass::Mnp => "MNP",
            VariantClass::Insertion => "Insertion",
            VariantClass::Deletion => "Deletion",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zygosity {
    Homozygous,
    Heterozygous,
}

impl FromStr for Zygosity {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Homozygous" => Ok(Zygosity::Homozygous),
            "Heterozygous" => Ok(Zygosity::Heterozygous),
            _ => Err(VariantError::UnknownZygosity(s.to_string())),
        }
    }
}

impl Display for Zygosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zygosity::Homozygous => "Homozygous",
            Zygosity::Heterozygous => "Heterozygous",
        };
        write!(f, "{}", label)
    }
}

/// SNP-track vs INDEL-track processing. The two tracks come from different
/// caller tools with different column schemas and different statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingMode {
    Snp,
    Indel,
}

impl FromStr for CallingMode {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snp" => Ok(CallingMode::Snp),
            "indel" => Ok(CallingMode::Indel),
            _ => Err(VariantError::UnknownCallingMode(s.to_string())),
        }
    }
}

impl Display for CallingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingMode::Snp => write!(f, "SNP"),
            CallingMode::Indel => write!(f, "INDEL"),
        }
    }
}

/// Caller-class specific quality metrics attached to a raw call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallMetrics {
    Snp {
        count: u32,
        coverage: u32,
        /// Allele frequency, 0-1.
        frequency: f64,
        /// Forward/reverse strand balance, 0-1.
        balance: f64,
        quality: f64,
    },
    Indel {
        nof_reads: u32,
        repeat: Option<String>,
        seq_complexity: Option<f64>,
    },
}

/// One detected event in one specimen, exactly as ingested. Immutable after
/// ingestion; the merge engine owns these while grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariantCall {
    pub specimen: String,
    /// 1-based reference position.
    pub position: u64,
    pub class: VariantClass,
    /// Bases affected; for insertions, the inserted length.
    pub length: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub zygosity: Zygosity,
    pub metrics: CallMetrics,
    /// Rounded mean read depth over the event span. `None` when no coverage
    /// table was supplied for this specimen/contig.
    pub mapping_coverage: Option<u32>,
}

impl RawVariantCall {
    pub fn effective_length(&self) -> u64 {
        self.class.effective_length(self.length)
    }

    pub fn raw_coverage(&self) -> Option<u32> {
        match self.metrics {
            CallMetrics::Snp { coverage, .. } => Some(coverage),
            CallMetrics::Indel { .. } => None,
        }
    }

    pub fn frequency(&self) -> Option<f64> {
        match self.metrics {
            CallMetrics::Snp { frequency, .. } => Some(frequency),
            CallMetrics::Indel { .. } => None,
        }
    }

    pub fn balance(&self) -> Option<f64> {
        match self.metrics {
            CallMetrics::Snp { balance, .. } => Some(balance),
            CallMetrics::Indel { .. } => None,
        }
    }
}
