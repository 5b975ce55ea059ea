use std::io::Write;
use std::path::{Path, PathBuf};

use rstest::*;
use tempfile::TempDir;

use vartk_consensus::pipeline::{Config, run};

const SNP_HEADER: &str = "\"Reference Position\";\"Type\";\"Length\";\"Reference\";\"Allele\";\"Zygosity\";\"Count\";\"Coverage\";\"Frequency\";\"Forward/reverse balance\";\"Average quality\"";

/// 120 bp of ACGT repeated; the base at 1-based position p is
/// "ACGT"[(p - 1) % 4].
fn write_reference(dir: &Path) -> PathBuf {
    let path = dir.join("ref.fa");
    std::fs::write(&path, format!(">contig1\n{}\n", "ACGT".repeat(30))).unwrap();
    path
}

fn write_call_table(dir: &Path, name: &str, rows: &[&str]) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    writeln!(file, "{}", SNP_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
}

fn write_coverage_table(dir: &Path, name: &str, rows: &[(u64, u32)]) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    for (position, depth) in rows {
        let mut fields = vec!["contig1".to_string(), position.to_string()];
        fields.extend(std::iter::repeat_n("0".to_string(), 8));
        fields.push(depth.to_string());
        writeln!(file, "{}", fields.join("\t")).unwrap();
    }
}

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn base_config(workdir: &TempDir) -> Config {
    let reference = write_reference(workdir.path());
    let calls = workdir.path().join("calls");
    std::fs::create_dir(&calls).unwrap();

    let mut config = Config::new(reference, calls, 20, 10);
    config.stats_out = workdir.path().join("stats.tsv");
    config.report_out = workdir.path().join("consensus.tsv");
    config
}

#[rstest]
fn test_snp_run_without_coverage(workdir: TempDir) {
    let config = base_config(&workdir);
    write_call_table(
        &config.calls_dir,
        "sample_a.csv",
        &["\"60\";\"SNV\";\"1\";\"T\";\"G\";\"Heterozygous\";\"27\";\"30\";\"0,9\";\"0,5\";\"40\""],
    );
    // a specimen with no calls still shows up everywhere
    write_call_table(&config.calls_dir, "sample_b.csv", &[]);

    run(&config).unwrap();

    let stats = std::fs::read_to_string(&config.stats_out).unwrap();
    let stats: Vec<&str> = stats.lines().collect();
    assert_eq!(stats.len(), 3);
    assert!(stats[0].starts_with("Name\tNOF SNPs"));
    assert!(stats[1].starts_with("sample_a\t1\t30.00\t30.00\t30.00\t0.90\t0.90\t0.90"));
    assert!(stats[2].starts_with("sample_b\t0\t0.00"));

    let report = std::fs::read_to_string(&config.report_out).unwrap();
    let report: Vec<&str> = report.lines().collect();
    assert_eq!(report.len(), 2);

    let fields: Vec<&str> = report[1].split('\t').collect();
    assert_eq!(fields[0], "contig1");
    assert_eq!(fields[1], "60");
    assert_eq!(fields[2], "SNV");
    assert_eq!(fields[3], "1");
    assert_eq!(fields[4], "T");
    assert_eq!(fields[5], "G|nc");
    assert_eq!(fields[6], "1"); // NOF Alts
    assert_eq!(fields[7], "0"); // NOF Called Refs
    assert_eq!(fields[8], "0.90"); // AVG Freq
    assert_eq!(fields[9], "0.50"); // AVG Balance
    assert_eq!(fields[10], "no");
    assert_eq!(fields[11], "-"); // no mapping coverage at all
    assert_eq!(fields[12], "60"); // distance to contig start
    assert_eq!(fields[13], "60"); // 120 - 60 - 1 + 1
    assert_eq!(fields[14], "TACG".repeat(5)); // positions 40..59
    assert_eq!(fields[15], "ACGT".repeat(5)); // positions 61..80

    // sample_a group: alt, zygosity, coverage, mapping coverage, frequency
    assert_eq!(&fields[16..21], &["G", "Heterozygous", "30", "-1", "0.90"]);
    // sample_b never called and has no coverage data
    assert_eq!(&fields[21..26], &["nc", "-", "-", "-1", "-"]);
}

#[rstest]
fn test_snp_run_with_coverage_calls_covered_specimen_reference(workdir: TempDir) {
    let mut config = base_config(&workdir);
    write_call_table(
        &config.calls_dir,
        "sample_a.csv",
        &["\"60\";\"SNV\";\"1\";\"T\";\"G\";\"Heterozygous\";\"27\";\"30\";\"0,9\";\"0,5\";\"40\""],
    );
    write_call_table(&config.calls_dir, "sample_b.csv", &[]);

    let coverage = workdir.path().join("coverage");
    std::fs::create_dir(&coverage).unwrap();
    write_coverage_table(&coverage, "sample_a.csv", &[(60, 30)]);
    write_coverage_table(&coverage, "sample_b.csv", &[(60, 12)]);
    config.coverage_dir = Some(coverage);

    run(&config).unwrap();

    let report = std::fs::read_to_string(&config.report_out).unwrap();
    let fields: Vec<&str> = report.lines().nth(1).unwrap().split('\t').collect();

    assert_eq!(fields[5], "G|T"); // sample_b holds the reference allele
    assert_eq!(fields[6], "1");
    assert_eq!(fields[7], "1"); // sample_b is a confident reference call
    assert_eq!(fields[11], "30.00"); // sample_a's call carries mapping coverage
    assert_eq!(&fields[16..21], &["G", "Heterozygous", "30", "30", "0.90"]);
    assert_eq!(&fields[21..26], &["T", "-", "-", "12", "-"]);
}

#[rstest]
fn test_multi_contig_without_contig_column_fails_before_writing(workdir: TempDir) {
    let mut config = base_config(&workdir);
    let reference = workdir.path().join("multi.fa");
    std::fs::write(&reference, ">c1\nACGT\n>c2\nACGT\n").unwrap();
    config.reference = reference;

    write_call_table(
        &config.calls_dir,
        "sample_a.csv",
        &["\"2\";\"SNV\";\"1\";\"C\";\"T\";\"Homozygous\";\"5\";\"9\";\"0,5\";\"0,5\";\"30\""],
    );

    assert!(run(&config).is_err());
    // fatal validation errors abort before any partial report is written
    assert!(!config.stats_out.exists());
    assert!(!config.report_out.exists());
}
