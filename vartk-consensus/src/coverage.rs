use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use fxhash::FxHashMap;
use glob::glob;

use vartk_core::errors::VariantError;
use vartk_core::utils::{get_dynamic_reader, specimen_name_from_path};

use crate::consts::{COVERAGE_CONTIG_COL, COVERAGE_DEPTH_COL, COVERAGE_POSITION_COL, TABLE_GLOB};

/// Per-base read depth for every specimen that shipped a coverage table.
///
/// Lookup is a flat map keyed by the (specimen, contig) pair; each entry is
/// an ordered position -> depth map. A pair with no table at all means "no
/// coverage data", which is different from a pair whose table merely lacks
/// some positions.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    depths: FxHashMap<(String, String), BTreeMap<u64, u32>>,
    specimens: Vec<String>,
}

impl CoverageIndex {
    /// Reads all `*.csv` coverage tables in `dir`, one per specimen, in
    /// sorted order. Rows are tab-separated; the contig name, 1-based
    /// position and total depth sit at fixed column indices. Rows whose
    /// position does not parse (e.g. a header row) are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let pattern = dir.join(TABLE_GLOB).to_string_lossy().to_string();
        let mut files = glob(&pattern)
            .with_context(|| format!("Invalid coverage glob: {}", pattern))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Error listing coverage tables under {:?}", dir))?;
        files.sort();

        if files.is_empty() {
            return Err(VariantError::NoInputFiles(pattern).into());
        }

        let mut index = CoverageIndex::default();

        for file in files {
            println!("Process file: {}", file.display());
            let specimen = specimen_name_from_path(&file);

            let reader = get_dynamic_reader(&file)?;
            for line in reader.lines() {
                let line = line?;
                let fields: Vec<&str> = line.split('\t').collect();

                let contig = match fields.get(COVERAGE_CONTIG_COL) {
                    Some(contig) if !contig.is_empty() => *contig,
                    _ => continue,
                };
                let position = match fields
                    .get(COVERAGE_POSITION_COL)
                    .and_then(|f| f.parse::<u64>().ok())
                {
                    Some(position) => position,
                    // header row, or junk
                    None => continue,
                };
                let depth = fields
                    .get(COVERAGE_DEPTH_COL)
                    .and_then(|f| f.parse::<u32>().ok())
                    .unwrap_or(0);

                index
                    .depths
                    .entry((specimen.clone(), contig.to_string()))
                    .or_default()
                    .insert(position, depth);
            }

            index.specimens.push(specimen);
        }

        Ok(index)
    }

    /// Mean depth over the 1-based span `[position, position + length - 1]`,
    /// rounded half away from zero. `None` when this (specimen, contig)
    /// pair has no coverage table; a missing base inside a present table
    /// contributes depth 0 and logs a warning, so one absent row cannot
    /// abort a whole run.
    pub fn rounded_mean_depth(
        &self,
        specimen: &str,
        contig: &str,
        position: u64,
        length: u64,
    ) -> Option<u32> {
        let table = self
            .depths
            .get(&(specimen.to_string(), contig.to_string()))?;

        let length = length.max(1);
        let mut sum: u64 = 0;
        for pos in position..position + length {
            match table.get(&pos) {
                Some(depth) => sum += *depth as u64,
                None => {
                    eprintln!(
                        "Warning: no coverage row for {} at {}:{}; counting depth 0",
                        specimen, contig, pos
                    );
                }
            }
        }

        Some((sum as f64 / length as f64).round() as u32)
    }

    pub fn specimens(&self) -> &[String] {
        &self.specimens
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}
