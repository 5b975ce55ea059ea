use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use vartk_core::models::{CallingMode, MergedVariantSite, SpecimenStats, VariantClass};

use crate::consts::MISSING_FIELD;

fn fmt_metric(value: f64) -> String {
    format!("{:.2}", value)
}

fn fmt_optional(value: Option<f64>) -> String {
    match value {
        Some(value) => fmt_metric(value),
        None => MISSING_FIELD.to_string(),
    }
}

/// Writes the per-specimen statistics table, one row per known specimen in
/// first-appearance order. The columns depend on the calling mode.
pub fn write_stats_tsv(path: &Path, stats: &[SpecimenStats], mode: CallingMode) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create stats file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let header = match mode {
        CallingMode::Snp => {
            "Name\tNOF SNPs\tMin Cov\tMax Cov\tAVG Cov\tMin Freq\tMax Freq\tAVG Freq\t\
             Min Qual\tMax Qual\tAVG Qual\tSNP\tMNP\tInsertion\tDeletion"
        }
        CallingMode::Indel => {
            "Name\tNOF INDELs\tMin NOF Reads\tMax NOF Reads\tAVG NOF Reads\tInsertion\tDeletion"
        }
    };
    writeln!(writer, "{}", header)?;

    for specimen in stats {
        let row = match mode {
            CallingMode::Snp => format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                specimen.specimen,
                specimen.nof_variants,
                fmt_metric(specimen.coverage.min),
                fmt_metric(specimen.coverage.max),
                fmt_metric(specimen.coverage.avg),
                fmt_metric(specimen.frequency.min),
                fmt_metric(specimen.frequency.max),
                fmt_metric(specimen.frequency.avg),
                fmt_metric(specimen.quality.min),
                fmt_metric(specimen.quality.max),
                fmt_metric(specimen.quality.avg),
                specimen.class_count(VariantClass::Snv),
                specimen.class_count(VariantClass::Mnp),
                specimen.class_count(VariantClass::Insertion),
                specimen.class_count(VariantClass::Deletion),
            ),
            CallingMode::Indel => format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                specimen.specimen,
                specimen.nof_variants,
                fmt_metric(specimen.nof_reads.min),
                fmt_metric(specimen.nof_reads.max),
                fmt_metric(specimen.nof_reads.avg),
                specimen.class_count(VariantClass::Insertion),
                specimen.class_count(VariantClass::Deletion),
            ),
        };
        writeln!(writer, "{}", row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the consensus site report: one row per merged site, contigs in
/// ingestion order, sites in position order. Fixed site columns first,
/// then per-specimen column groups for alt, zygosity, coverage, mapping
/// coverage and frequency. Mapping coverage keeps the `-1` sentinel for
/// "no confident reference-call data"; other absent cells render as `-`.
pub fn write_consensus_tsv(
    path: &Path,
    contigs: &[(String, Vec<MergedVariantSite>)],
    specimen_names: &[String],
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create report file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let mut header = vec![
        "Contig".to_string(),
        "Position".to_string(),
        "Type".to_string(),
        "Length".to_string(),
        "Reference".to_string(),
        "Shared Alts".to_string(),
        "NOF Alts".to_string(),
        "NOF Called Refs".to_string(),
        "AVG Freq".to_string(),
        "AVG Balance".to_string(),
        "Critical Balance".to_string(),
        "AVG Mapping Cov".to_string(),
        "Dist Left".to_string(),
        "Dist Right".to_string(),
        "Left Flank".to_string(),
        "Right Flank".to_string(),
    ];
    for name in specimen_names {
        header.push(format!("{} Alt", name));
        header.push(format!("{} Zyg", name));
        header.push(format!("{} Cov", name));
        header.push(format!("{} Map Cov", name));
        header.push(format!("{} Freq", name));
    }
    writeln!(writer, "{}", header.join("\t"))?;

    for (contig, sites) in contigs {
        for site in sites {
            let mut row = vec![
                contig.clone(),
                site.position.to_string(),
                site.class.to_string(),
                site.length.to_string(),
                site.ref_allele.clone(),
                site.shared_alt.clone(),
                site.number_of_alts.to_string(),
                site.number_of_called_refs.to_string(),
                fmt_optional(site.avg_frequency),
                fmt_optional(site.avg_balance),
                if site.critical_balance { "yes" } else { "no" }.to_string(),
                fmt_optional(site.avg_mapping_coverage),
                site.dist_left.to_string(),
                site.dist_right.to_string(),
                site.left_flank.clone().unwrap_or(MISSING_FIELD.to_string()),
                site.right_flank.clone().unwrap_or(MISSING_FIELD.to_string()),
            ];

            for name in specimen_names {
                row.push(
                    site.specimen_alts
                        .get(name)
                        .cloned()
                        .unwrap_or(MISSING_FIELD.to_string()),
                );
                row.push(
                    site.specimen_zygs
                        .get(name)
                        .map(|zygosity| zygosity.to_string())
                        .unwrap_or(MISSING_FIELD.to_string()),
                );
                row.push(
                    site.specimen_covs
                        .get(name)
                        .map(|coverage| coverage.to_string())
                        .unwrap_or(MISSING_FIELD.to_string()),
                );
                // -1 means "no confident reference-call data"
                row.push(
                    site.specimen_mapping_cov
                        .get(name)
                        .map(|coverage| match coverage {
                            Some(coverage) => coverage.to_string(),
                            None => "-1".to_string(),
                        })
                        .unwrap_or(MISSING_FIELD.to_string()),
                );
                row.push(
                    site.specimen_freqs
                        .get(name)
                        .map(|frequency| fmt_metric(*frequency))
                        .unwrap_or(MISSING_FIELD.to_string()),
                );
            }

            writeln!(writer, "{}", row.join("\t"))?;
        }
    }

    writer.flush()?;
    Ok(())
}
