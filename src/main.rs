//! mboxfilter CLI: filter one or more mbox files into a sorted CSV with statistics.

use anyhow::Result;
use clap::Parser;
use mboxfilter::engine::Cli;
use mboxfilter::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
