//! CLI command handler: filter the mboxes, write the CSV, print the report.

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::hashing::checksum_summary;
use crate::engine::progress::{batched_counter, create_counter, flush_progress_remainder};
use crate::engine::report::write_records;
use crate::engine::tools::{expand_inputs, make_output_file};
use crate::filter::FilterChain;
use crate::pipeline::{CancelToken, PipelineResult, run_pipeline_with_cancel};
use crate::source::MboxFile;
use crate::utils::config::PROGRESS_UPDATE_BATCH_SIZE;
use crate::utils::{Settings, setup_logging};

fn setup_opts(cli: &Cli) -> Result<Opts> {
    setup_logging(cli.verbose);
    Ok(Opts {
        config_path: cli.config.clone(),
        output: cli.output.clone(),
        subject_len: cli.subject_len,
        stats_json: cli.json,
        verbose: cli.verbose,
        inputs: expand_inputs(&cli.inputs)?,
    })
}

fn discard_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("could not remove {}: {}", path.display(), e);
    }
}

/// Run the whole tool. Nothing is written to the CSV if any source fails.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli)?;

    // Input checksums run alongside filtering.
    let inputs = opts.inputs.clone();
    let checksums = thread::spawn(move || checksum_summary("input files", &inputs));

    let settings = Settings::load(&opts.config_path)?;
    debug!("settings:{}", settings);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("set Ctrl+C handler")?;

    let (file, out_path) = make_output_file(opts.output.as_deref())?;
    let chain = Arc::new(FilterChain::from_settings(&settings));

    let sources = opts.inputs.iter().map(MboxFile::new).collect::<Vec<_>>();
    let handles = run_pipeline_with_cancel(sources, Arc::clone(&chain), cancel);

    let bar = opts.verbose.then(|| create_counter("Filtering"));
    let PipelineResult {
        mut records,
        outcome,
    } = handles.collect(batched_counter(bar.clone(), PROGRESS_UPDATE_BATCH_SIZE));
    flush_progress_remainder(bar.as_ref(), records.len(), PROGRESS_UPDATE_BATCH_SIZE);

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            drop(file);
            discard_output(&out_path);
            return Err(e).context("processing mbox files");
        }
    };
    let stats = chain.stats();
    debug!(
        "{} records examined, {} accepted",
        summary.examined(),
        summary.emitted()
    );

    {
        let mut writer = BufWriter::new(file);
        write_records(&mut writer, &mut records, opts.subject_len)?;
    }
    info!("wrote {} records to {}", records.len(), out_path.display());

    print!("{}", stats);
    if opts.stats_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    println!("{}", settings);

    let input_sums = checksums
        .join()
        .map_err(|_| anyhow!("checksum thread panicked"))??;
    println!("{}", input_sums);
    println!("{}", checksum_summary("output file", &[out_path])?);
    Ok(())
}
