use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error(
        "input table {path} does not name a contig, but the reference contains {nof_contigs} \
         sequences; use a single-sequence reference or add the contig column to the table"
    )]
    MissingContigColumn { path: String, nof_contigs: usize },

    #[error("contig name `{0}` does not match any sequence in the reference")]
    UnknownContig(String),

    #[error("required column `{column}` is missing from {path}")]
    MissingColumn { column: String, path: String },

    #[error("{path}:{line}: could not parse `{value}` as {column}")]
    FieldParse {
        path: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("unknown variant class: {0}")]
    UnknownVariantClass(String),

    #[error("unknown zygosity: {0}")]
    UnknownZygosity(String),

    #[error("unknown calling mode: {0}")]
    UnknownCallingMode(String),

    #[error("no input tables matching {0}")]
    NoInputFiles(String),

    #[error("malformed FASTA: {0}")]
    MalformedFasta(String),

    #[error("coordinates {start}..{end} are out of range for contig {contig} (length {length})")]
    SubsequenceOutOfRange {
        contig: String,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
