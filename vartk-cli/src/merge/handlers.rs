use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::ArgMatches;

use vartk_consensus::pipeline::{self, Config};
use vartk_core::models::CallingMode;

pub fn run_merge(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let calls = matches
        .get_one::<String>("calls")
        .expect("A path to the variant call tables is required.");

    let reference = matches
        .get_one::<String>("reference")
        .expect("A path to the reference FASTA is required.");

    let flank1 = matches
        .get_one::<u64>("flank1")
        .expect("A primary flank length is required.");

    let flank2 = matches
        .get_one::<u64>("flank2")
        .expect("A fallback flank length is required.");

    let mode = match matches.get_one::<String>("mode") {
        Some(mode) => match CallingMode::from_str(mode) {
            Ok(mode) => mode,
            Err(_err) => anyhow::bail!("Unknown calling mode supplied: {}", mode),
        },
        None => CallingMode::Snp,
    };

    // coerce arguments to types
    let mut config = Config::new(
        PathBuf::from(reference),
        PathBuf::from(calls),
        *flank1,
        *flank2,
    );
    config.mode = mode;
    config.coverage_dir = matches.get_one::<String>("coverage").map(PathBuf::from);
    if let Some(min_cov) = matches.get_one::<u32>("min-cov-for-ref") {
        config.min_cov_for_ref = *min_cov;
    }
    if let Some(path) = matches.get_one::<String>("stats-out") {
        config.stats_out = PathBuf::from(path);
    }
    if let Some(path) = matches.get_one::<String>("report-out") {
        config.report_out = PathBuf::from(path);
    }

    pipeline::run(&config)
}
