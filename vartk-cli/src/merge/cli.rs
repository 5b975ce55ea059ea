use clap::{Arg, Command, arg};

pub const MERGE_CMD: &str = "merge";

pub fn create_merge_cli() -> Command {
    Command::new(MERGE_CMD)
        .author("Thünen Institute of Forest Genetics")
        .about("Merge per-specimen variant tables into a multi-specimen consensus report.")
        .arg(
            Arg::new("calls")
                .help("Directory containing per-specimen variant tables (*.csv)")
                .required(true),
        )
        .arg(arg!(--reference <reference> "Reference FASTA file (plain or gzipped)").required(true))
        .arg(arg!(--coverage <coverage> "Directory containing per-base coverage tables (*.csv)"))
        .arg(arg!(--mode <mode> "Calling mode: snp or indel"))
        .arg(
            Arg::new("flank1")
                .long("flank1")
                .value_parser(clap::value_parser!(u64))
                .help("Primary flank length")
                .required(true),
        )
        .arg(
            Arg::new("flank2")
                .long("flank2")
                .value_parser(clap::value_parser!(u64))
                .help("Fallback flank length for sites close to a neighbor")
                .required(true),
        )
        .arg(
            Arg::new("min-cov-for-ref")
                .long("min-cov-for-ref")
                .value_parser(clap::value_parser!(u32))
                .help("Minimum mean depth for a confident reference call"),
        )
        .arg(arg!(--"stats-out" <path> "Statistics output path"))
        .arg(arg!(--"report-out" <path> "Consensus report output path"))
}
