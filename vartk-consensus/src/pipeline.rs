use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use vartk_core::errors::VariantError;
use vartk_core::models::{CallingMode, MergedVariantSite, RawVariantCall};
use vartk_refseq::ReferenceSet;

use crate::consts::{DEFAULT_MIN_COV_FOR_REF, DEFAULT_REPORT_OUT, DEFAULT_STATS_OUT};
use crate::coverage::CoverageIndex;
use crate::flank::assign_flanks;
use crate::ingest::read_call_tables;
use crate::merge::group_calls;
use crate::neighbors::{assign_neighbor_distances, sort_sites};
use crate::report::{write_consensus_tsv, write_stats_tsv};
use crate::stats::build_specimen_stats;

/// Configuration surface of one batch run.
#[derive(Debug, Clone)]
pub struct Config {
    pub reference: PathBuf,
    pub calls_dir: PathBuf,
    pub coverage_dir: Option<PathBuf>,
    pub mode: CallingMode,
    /// Primary flank length.
    pub min_flank1: u64,
    /// Fallback flank length for sites too close to a neighbor.
    pub min_flank2: u64,
    pub min_cov_for_ref: u32,
    pub stats_out: PathBuf,
    pub report_out: PathBuf,
}

impl Config {
    pub fn new(reference: PathBuf, calls_dir: PathBuf, min_flank1: u64, min_flank2: u64) -> Self {
        Config {
            reference,
            calls_dir,
            coverage_dir: None,
            mode: CallingMode::Snp,
            min_flank1,
            min_flank2,
            min_cov_for_ref: DEFAULT_MIN_COV_FOR_REF,
            stats_out: PathBuf::from(DEFAULT_STATS_OUT),
            report_out: PathBuf::from(DEFAULT_REPORT_OUT),
        }
    }
}

/// Runs one contig through merge -> sort -> distances -> flanks.
fn process_contig(
    contig: &str,
    calls: &[RawVariantCall],
    specimen_names: &[String],
    reference: &ReferenceSet,
    coverage: Option<&CoverageIndex>,
    config: &Config,
) -> Result<Vec<MergedVariantSite>> {
    let contig_length = reference
        .contig_length(contig)
        .ok_or_else(|| VariantError::UnknownContig(contig.to_string()))?;

    let mut sites = group_calls(
        contig,
        calls,
        specimen_names,
        coverage,
        config.min_cov_for_ref,
        config.mode,
    );

    sort_sites(&mut sites);
    assign_neighbor_distances(&mut sites, contig_length);
    assign_flanks(
        &mut sites,
        reference,
        contig,
        config.min_flank1,
        config.min_flank2,
    )?;

    Ok(sites)
}

/// The whole batch: load the reference, optionally the coverage tables,
/// ingest every call table, then merge and report. Nothing is written
/// until every contig has been processed, so a fatal error can never leave
/// a partial report behind.
pub fn run(config: &Config) -> Result<()> {
    println!("Read reference file...");
    let reference = ReferenceSet::from_fasta(&config.reference)
        .with_context(|| format!("Failed to read reference: {:?}", config.reference))?;
    println!("Contig lengths:");
    for (name, length) in reference.contigs() {
        println!("{}: {}bp", name, length);
    }
    println!("--------------------");

    let coverage = match &config.coverage_dir {
        Some(dir) => {
            println!("Read coverage tables...");
            Some(CoverageIndex::from_dir(dir)?)
        }
        None => None,
    };

    println!("Read variant tables...");
    let call_set = read_call_tables(&config.calls_dir, config.mode, &reference, coverage.as_ref())?;
    println!(
        "{} raw calls from {} specimens",
        call_set.nof_calls(),
        call_set.specimen_names.len()
    );

    let stats = build_specimen_stats(&call_set, config.mode);

    // contigs are independent after ingestion; reference and coverage are
    // shared read-only
    println!("Merge redundant variants and calculate flanking sequences...");
    let contig_jobs: Vec<(&str, &[RawVariantCall])> = call_set.contigs().collect();
    let merged: Vec<(String, Vec<MergedVariantSite>)> = contig_jobs
        .par_iter()
        .map(|&(contig, calls)| -> Result<(String, Vec<MergedVariantSite>)> {
            let sites = process_contig(
                contig,
                calls,
                &call_set.specimen_names,
                &reference,
                coverage.as_ref(),
                config,
            )?;
            Ok((contig.to_string(), sites))
        })
        .collect::<Result<Vec<_>>>()?;

    write_stats_tsv(&config.stats_out, &stats, config.mode)?;
    write_consensus_tsv(&config.report_out, &merged, &call_set.specimen_names)?;

    println!("Wrote {:?} and {:?}", config.stats_out, config.report_out);

    Ok(())
}
