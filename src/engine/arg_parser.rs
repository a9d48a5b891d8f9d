use clap::Parser;
use std::path::PathBuf;

use crate::engine::hashing::HashAlgorithm;

/// Find files shared by two trees (by content) and hardlink them into an output tree.
#[derive(Clone, Parser)]
#[command(name = "dupelink")]
#[command(
    about = "Hardlink files of SRC_DIR that also exist (by content) in REFERENCE_DIR into OUT_DIR."
)]
pub struct Cli {
    /// Tree whose files get linked.
    #[arg(value_name = "SRC_DIR")]
    pub src_dir: PathBuf,

    /// Tree the source files are compared against.
    #[arg(value_name = "REFERENCE_DIR")]
    pub reference_dir: PathBuf,

    /// Output tree. Must be empty unless --dry-run.
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: PathBuf,

    /// Number of hashing workers (>= 1). 1 hashes serially.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Do not link or copy anything; print what would be done.
    #[arg(long, short = 'n', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub dry_run: Option<bool>,

    /// Also copy reference files that have no identical file in SRC_DIR.
    #[arg(long, short = 'c', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub copy_missing: Option<bool>,

    /// Digest algorithm.
    #[arg(long, short = 'a', value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Keep hashing after a file fails instead of stopping new work.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub keep_going: Option<bool>,
}
