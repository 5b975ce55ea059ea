use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use fxhash::FxHashMap;

use vartk_core::errors::VariantError;
use vartk_core::utils::get_dynamic_reader;

/// One reference contig, held fully in memory.
#[derive(Debug, Clone)]
pub struct ContigRecord {
    pub name: String,
    pub sequence: String,
}

impl ContigRecord {
    pub fn length(&self) -> u64 {
        self.sequence.len() as u64
    }
}

/// The reference FASTA, loaded once up front. Contig order follows the
/// file; lookups go through a name index. Read-only after loading, so it
/// can be shared freely across worker threads.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    records: Vec<ContigRecord>,
    index: FxHashMap<String, usize>,
}

impl ReferenceSet {
    /// Reads a FASTA file, gzipped or plain. Contig names are the full
    /// header line after `>`, whitespace-trimmed; sequence lines are
    /// uppercased and concatenated.
    pub fn from_fasta<T: AsRef<Path>>(path: T) -> Result<Self> {
        let mut reader = get_dynamic_reader(path.as_ref())?;

        let mut records: Vec<ContigRecord> = Vec::new();
        let mut current: Option<ContigRecord> = None;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                if let Some(record) = current.take() {
                    records.push(record);
                }
                break;
            }

            let trimmed = line.trim_end();
            if let Some(header) = trimmed.strip_prefix('>') {
                if let Some(record) = current.take() {
                    records.push(record);
                }
                current = Some(ContigRecord {
                    name: header.trim().to_string(),
                    sequence: String::new(),
                });
            } else if !trimmed.is_empty() {
                match current.as_mut() {
                    Some(record) => record.sequence.push_str(&trimmed.to_ascii_uppercase()),
                    None => {
                        return Err(VariantError::MalformedFasta(format!(
                            "sequence data before the first header in {:?}",
                            path.as_ref()
                        ))
                        .into());
                    }
                }
            }
        }

        let mut index = FxHashMap::default();
        for (i, record) in records.iter().enumerate() {
            index.insert(record.name.clone(), i);
        }

        Ok(ReferenceSet { records, index })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn contig_length(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&i| self.records[i].length())
    }

    /// Contigs in file order, as (name, length) pairs.
    pub fn contigs(&self) -> impl Iterator<Item = (&str, u64)> {
        self.records.iter().map(|r| (r.name.as_str(), r.length()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The subsequence of `name` over the 1-based inclusive range
    /// `[start, end]`.
    pub fn subsequence(&self, name: &str, start: u64, end: u64) -> Result<&str, VariantError> {
        let record = self
            .index
            .get(name)
            .map(|&i| &self.records[i])
            .ok_or_else(|| VariantError::UnknownContig(name.to_string()))?;

        let length = record.length();
        if start == 0 || end < start || end > length {
            return Err(VariantError::SubsequenceOutOfRange {
                contig: name.to_string(),
                start,
                end,
                length,
            });
        }

        Ok(&record.sequence[(start - 1) as usize..end as usize])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn fasta_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        write!(
            file,
            ">contig1\nACGTACGTAC\nGTACGTACGT\n>contig2\nttttgggg\n"
        )
        .unwrap();
        file
    }

    #[rstest]
    fn test_contig_lengths_and_order(fasta_file: tempfile::NamedTempFile) {
        let reference = ReferenceSet::from_fasta(fasta_file.path()).unwrap();

        assert_eq!(reference.len(), 2);
        assert_eq!(reference.contig_length("contig1"), Some(20));
        assert_eq!(reference.contig_length("contig2"), Some(8));
        assert_eq!(reference.contig_length("contig3"), None);

        let names: Vec<&str> = reference.contigs().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["contig1", "contig2"]);
    }

    #[rstest]
    fn test_subsequence_is_one_based_inclusive(fasta_file: tempfile::NamedTempFile) {
        let reference = ReferenceSet::from_fasta(fasta_file.path()).unwrap();

        assert_eq!(reference.subsequence("contig1", 1, 4).unwrap(), "ACGT");
        assert_eq!(reference.subsequence("contig1", 9, 12).unwrap(), "ACGT");
        assert_eq!(reference.subsequence("contig1", 20, 20).unwrap(), "T");
        // lowercase input is folded to uppercase
        assert_eq!(reference.subsequence("contig2", 1, 8).unwrap(), "TTTTGGGG");
    }

    #[rstest]
    fn test_subsequence_rejects_out_of_range(fasta_file: tempfile::NamedTempFile) {
        let reference = ReferenceSet::from_fasta(fasta_file.path()).unwrap();

        assert!(matches!(
            reference.subsequence("contig1", 0, 4),
            Err(VariantError::SubsequenceOutOfRange { .. })
        ));
        assert!(matches!(
            reference.subsequence("contig1", 15, 21),
            Err(VariantError::SubsequenceOutOfRange { .. })
        ));
        assert!(matches!(
            reference.subsequence("missing", 1, 2),
            Err(VariantError::UnknownContig(_))
        ));
    }

    #[rstest]
    fn test_gzipped_fasta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b">c1\nACGT\n").unwrap();
        encoder.finish().unwrap();

        let reference = ReferenceSet::from_fasta(&path).unwrap();
        assert_eq!(reference.contig_length("c1"), Some(4));
    }
}
