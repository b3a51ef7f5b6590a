use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::{DEFAULT_SUBJECT_LEN, PackagePaths};

/// Summarise unique emails in one or more mbox files which pass filtering.
#[derive(Clone, Parser)]
#[command(name = "mboxfilter")]
#[command(about = "Filter mbox headers by ip, date, holiday, sender and id; write a sorted CSV.")]
pub struct Cli {
    /// One or more mbox files (or directories of mbox files) to process.
    #[arg(value_name = "MBOX", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Settings file (TOML). Default: `mboxfilter.toml` in the working directory.
    #[arg(long, short = 'c', default_value = PackagePaths::get().default_config_filename())]
    pub config: PathBuf,

    /// Output CSV file; must not exist. Default: timestamped name in the working directory.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Maximum subject length written to the CSV (0 writes the whole subject).
    #[arg(long, short = 's', default_value_t = DEFAULT_SUBJECT_LEN)]
    pub subject_len: usize,

    /// Also print the statistics as JSON.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
