use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use fxhash::FxHashMap;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};

use vartk_core::errors::VariantError;
use vartk_core::models::{CallMetrics, CallingMode, RawVariantCall, VariantClass, Zygosity};
use vartk_core::utils::{read_lines, specimen_name_from_path};
use vartk_refseq::ReferenceSet;

use crate::consts::{TABLE_GLOB, columns};
use crate::coverage::CoverageIndex;

/// All raw calls of a run, grouped by contig. Specimen and contig order are
/// first-appearance order, which the reports preserve.
#[derive(Debug, Default)]
pub struct CallSet {
    pub specimen_names: Vec<String>,
    contig_order: Vec<String>,
    calls_by_contig: FxHashMap<String, Vec<RawVariantCall>>,
}

impl CallSet {
    /// Contigs in first-appearance order with their calls in ingestion
    /// order.
    pub fn contigs(&self) -> impl Iterator<Item = (&str, &[RawVariantCall])> {
        self.contig_order
            .iter()
            .map(|name| (name.as_str(), self.calls_by_contig[name].as_slice()))
    }

    pub fn all_calls(&self) -> impl Iterator<Item = &RawVariantCall> {
        self.contig_order
            .iter()
            .flat_map(|name| self.calls_by_contig[name].iter())
    }

    pub fn nof_calls(&self) -> usize {
        self.calls_by_contig.values().map(Vec::len).sum()
    }

    fn push(&mut self, contig: String, call: RawVariantCall) {
        match self.calls_by_contig.get_mut(&contig) {
            Some(calls) => calls.push(call),
            None => {
                self.contig_order.push(contig.clone());
                self.calls_by_contig.insert(contig, vec![call]);
            }
        }
    }
}

/// Header-name -> column-index map of one table.
struct ColumnMap {
    path: String,
    columns: FxHashMap<String, usize>,
}

impl ColumnMap {
    fn parse(header: &str, path: &str) -> Self {
        let columns = header
            .split(';')
            .enumerate()
            .map(|(i, name)| (clean_field(name), i))
            .collect();
        ColumnMap {
            path: path.to_string(),
            columns,
        }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, VariantError> {
        self.get(name).ok_or_else(|| VariantError::MissingColumn {
            column: name.to_string(),
            path: self.path.clone(),
        })
    }
}

/// One cleaned data row.
struct Row<'a> {
    path: &'a str,
    line: usize,
    fields: Vec<String>,
}

impl Row<'_> {
    fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    fn parse_error(&self, column: &str, value: &str) -> VariantError {
        VariantError::FieldParse {
            path: self.path.to_string(),
            line: self.line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn parse_u64(&self, index: usize, column: &str) -> Result<u64, VariantError> {
        let value = self.field(index);
        value
            .parse::<u64>()
            .map_err(|_| self.parse_error(column, value))
    }

    fn parse_u32(&self, index: usize, column: &str) -> Result<u32, VariantError> {
        let value = self.field(index);
        value
            .parse::<u32>()
            .map_err(|_| self.parse_error(column, value))
    }

    /// Floats may arrive with a decimal comma.
    fn parse_f64(&self, index: usize, column: &str) -> Result<f64, VariantError> {
        let value = self.field(index);
        value
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| self.parse_error(column, value))
    }
}

/// Every field is stripped of quoting and surrounding whitespace.
fn clean_field(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

fn resolve_contig(
    row: &Row,
    map: &ColumnMap,
    mode: CallingMode,
    reference: &ReferenceSet,
) -> Result<String, VariantError> {
    let locus_column = match mode {
        CallingMode::Snp => columns::MAPPING,
        CallingMode::Indel => columns::CHROMOSOME,
    };

    match map.get(locus_column) {
        Some(index) => {
            let contig = row.field(index).to_string();
            if reference.contains(&contig) {
                Ok(contig)
            } else {
                Err(VariantError::UnknownContig(contig))
            }
        }
        None => match reference.contigs().next() {
            Some((name, _)) if reference.len() == 1 => Ok(name.to_string()),
            _ => Err(VariantError::MissingContigColumn {
                path: map.path.clone(),
                nof_contigs: reference.len(),
            }),
        },
    }
}

/// Event position, preferring the `Region` column when present. Insertion
/// regions read `A^B` and sit at `B`; deletion and MNP regions are ranges
/// `A..B` anchored at `A`.
fn resolve_position(
    row: &Row,
    map: &ColumnMap,
    class: VariantClass,
) -> Result<u64, VariantError> {
    let (text, column) = match map.get(columns::REGION) {
        Some(index) => (row.field(index), columns::REGION),
        None => {
            let index = map.require(columns::REFERENCE_POSITION)?;
            (row.field(index), columns::REFERENCE_POSITION)
        }
    };

    let part = match class {
        VariantClass::Insertion => text.split('^').nth(1).unwrap_or(text),
        VariantClass::Mnp | VariantClass::Deletion => text.split("..").next().unwrap_or(text),
        VariantClass::Snv => text,
    };

    let position = part
        .parse::<u64>()
        .map_err(|_| row.parse_error(column, text))?;
    if position == 0 {
        // coordinates are 1-based
        return Err(row.parse_error(column, text));
    }
    Ok(position)
}

fn parse_metrics(
    row: &Row,
    map: &ColumnMap,
    mode: CallingMode,
) -> Result<CallMetrics, VariantError> {
    match mode {
        CallingMode::Snp => Ok(CallMetrics::Snp {
            count: row.parse_u32(map.require(columns::COUNT)?, columns::COUNT)?,
            coverage: row.parse_u32(map.require(columns::COVERAGE)?, columns::COVERAGE)?,
            frequency: row.parse_f64(map.require(columns::FREQUENCY)?, columns::FREQUENCY)?,
            balance: row.parse_f64(
                map.require(columns::FORWARD_REVERSE_BALANCE)?,
                columns::FORWARD_REVERSE_BALANCE,
            )?,
            quality: row.parse_f64(
                map.require(columns::AVERAGE_QUALITY)?,
                columns::AVERAGE_QUALITY,
            )?,
        }),
        CallingMode::Indel => {
            let nof_reads =
                row.parse_u32(map.require(columns::NOF_READS)?, columns::NOF_READS)?;
            let repeat = map
                .get(columns::REPEAT)
                .map(|index| row.field(index).to_string())
                .filter(|repeat| !repeat.is_empty());
            let seq_complexity = match map.get(columns::SEQ_COMPLEXITY) {
                Some(index) if !row.field(index).is_empty() => {
                    Some(row.parse_f64(index, columns::SEQ_COMPLEXITY)?)
                }
                _ => None,
            };
            Ok(CallMetrics::Indel {
                nof_reads,
                repeat,
                seq_complexity,
            })
        }
    }
}

fn parse_row(
    row: &Row,
    map: &ColumnMap,
    specimen: &str,
    mode: CallingMode,
    reference: &ReferenceSet,
    coverage: Option<&CoverageIndex>,
) -> Result<(String, RawVariantCall), VariantError> {
    let contig = resolve_contig(row, map, mode, reference)?;

    let class_text = row.field(map.require(columns::TYPE)?);
    let class = VariantClass::from_str(class_text)?;

    let position = resolve_position(row, map, class)?;
    let length = row.parse_u64(map.require(columns::LENGTH)?, columns::LENGTH)?;
    let ref_allele = row.field(map.require(columns::REFERENCE)?).to_string();
    let alt_allele = row.field(map.require(columns::ALLELE)?).to_string();
    let zygosity = Zygosity::from_str(row.field(map.require(columns::ZYGOSITY)?))?;
    let metrics = parse_metrics(row, map, mode)?;

    let mapping_coverage =
        coverage.and_then(|c| c.rounded_mean_depth(specimen, &contig, position, length));

    let call = RawVariantCall {
        specimen: specimen.to_string(),
        position,
        class,
        length,
        ref_allele,
        alt_allele,
        zygosity,
        metrics,
        mapping_coverage,
    };

    Ok((contig, call))
}

/// Reads all `*.csv` variant tables in `dir`, one per specimen, in sorted
/// order. Tables are semicolon-separated with a quoted header row.
///
/// Fails fast on the configuration errors the run cannot recover from: a
/// multi-contig reference without a contig column in the table, or a contig
/// name the reference does not know.
pub fn read_call_tables(
    dir: &Path,
    mode: CallingMode,
    reference: &ReferenceSet,
    coverage: Option<&CoverageIndex>,
) -> Result<CallSet> {
    let pattern = dir.join(TABLE_GLOB).to_string_lossy().to_string();
    let mut files = glob(&pattern)
        .with_context(|| format!("Invalid call-table glob: {}", pattern))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Error listing call tables under {:?}", dir))?;
    files.sort();

    if files.is_empty() {
        return Err(VariantError::NoInputFiles(pattern).into());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tables ({eta})")?
            .progress_chars("##-"),
    );

    let mut call_set = CallSet::default();

    for file in files {
        println!("Process file: {}", file.display());
        let specimen = specimen_name_from_path(&file);
        call_set.specimen_names.push(specimen.clone());

        let path = file.to_string_lossy().to_string();
        let lines = read_lines(&file)?;
        let mut rows = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        // first non-empty line is the header; a header-only table still
        // registers its specimen
        let Some((_, header)) = rows.next() else {
            pb.inc(1);
            continue;
        };
        let map = ColumnMap::parse(header, &path);

        for (index, line) in rows {
            let row = Row {
                path: &path,
                line: index + 1,
                fields: line.split(';').map(clean_field).collect(),
            };

            let (contig, call) = parse_row(&row, &map, &specimen, mode, reference, coverage)
                .with_context(|| format!("{}:{}", path, index + 1))?;
            call_set.push(contig, call);
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    Ok(call_set)
}
