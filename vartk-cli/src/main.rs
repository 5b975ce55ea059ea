mod merge;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "vartk";
    pub const BIN_NAME: &str = "vartk";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Thünen Institute of Forest Genetics")
        .about("Merge per-specimen variant call tables into multi-specimen consensus reports with flanking sequence context.")
        .subcommand_required(true)
        .subcommand(merge::cli::create_merge_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // MERGE
        //
        Some((merge::cli::MERGE_CMD, matches)) => {
            merge::handlers::run_merge(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
