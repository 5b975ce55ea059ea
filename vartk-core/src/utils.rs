use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Reads a whole table file into its lines, with gzip handled transparently.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = get_dynamic_reader(path)?;
    let lines = reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read lines from {:?}", path))?;
    Ok(lines)
}

/// File stem up to the first `.`, used as the specimen name for both call
/// tables and coverage tables (`sample_a.variants.csv` -> `sample_a`).
pub fn specimen_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    file_name
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("sample_a.csv", "sample_a")]
    #[case("sample_a.variants.csv", "sample_a")]
    #[case("plain", "plain")]
    fn test_specimen_name_from_path(#[case] file: &str, #[case] expected: &str) {
        assert_eq!(specimen_name_from_path(Path::new(file)), expected);
    }

    #[rstest]
    fn test_dynamic_reader_plain_and_gzipped() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("table.csv");
        std::fs::write(&plain, "a\tb\nc\td\n").unwrap();

        let gzipped = dir.path().join("table.csv.gz");
        let file = File::create(&gzipped).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"a\tb\nc\td\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_lines(&plain).unwrap(), vec!["a\tb", "c\td"]);
        assert_eq!(read_lines(&gzipped).unwrap(), vec!["a\tb", "c\td"]);
    }
}
