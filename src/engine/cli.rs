//! CLI command handler: hash both trees, link shared files, optionally copy the rest.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::compare::{find_identical_files, flip_file_map, unmapped_files};
use crate::engine::connect::{ConnectOp, connect_files};
use crate::engine::progress::BarReporter;
use crate::engine::tools::{assert_dirs_exist, dir_is_empty, to_indented_json};
use crate::pipeline::report_errors;
use crate::scan::hash_trees;
use crate::utils::config::WorkerLimits;
use crate::utils::fd_limit::determine_workers_given_fd_limit;
use crate::utils::{Colors, apply_file_to_opts, load_dupelink_toml, setup_logging};

/// Defaults, then `.dupelink.toml` in the current directory, then CLI flags.
pub fn build_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = std::env::current_dir()
        .ok()
        .and_then(|dir| load_dupelink_toml(&dir))
    {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    opts
}

/// Overwrite opts with every flag given on the command line.
pub fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(workers) = cli.workers {
        opts.workers = workers;
    }
    if let Some(algorithm) = cli.algorithm {
        opts.algorithm = algorithm;
    }
    if let Some(dry_run) = cli.dry_run {
        opts.dry_run = dry_run;
    }
    if let Some(copy_missing) = cli.copy_missing {
        opts.copy_missing = copy_missing;
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
    if let Some(keep_going) = cli.keep_going {
        opts.fail_fast = !keep_going;
    }
}

/// Check worker count and directories before any hashing starts.
pub fn validate(cli: &Cli, opts: &Opts) -> Result<()> {
    if opts.workers < WorkerLimits::MIN_WORKERS {
        bail!(
            "Invalid number of workers ({}). Must be >= {}",
            opts.workers,
            WorkerLimits::MIN_WORKERS
        );
    }
    assert_dirs_exist(&[
        cli.src_dir.as_path(),
        cli.reference_dir.as_path(),
        cli.out_dir.as_path(),
    ])?;
    if !opts.dry_run && !dir_is_empty(&cli.out_dir)? {
        bail!(
            "The provided out_dir ({}) is non-empty. Cowardly refusing to run.",
            cli.out_dir.display()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct DryRunOutput<'a> {
    linked: Vec<&'a PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    copied: Vec<&'a PathBuf>,
}

/// Full run: validate, hash both trees, link identical files, copy missing ones when asked.
///
/// Every failure is logged here, one line per error, before it is returned. Callers only
/// need the exit status.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG: {:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);
    run(cli, opts).inspect_err(report_errors)
}

fn run(cli: &Cli, mut opts: Opts) -> Result<()> {
    validate(cli, &opts)?;
    opts.workers = determine_workers_given_fd_limit(opts.workers);
    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NO FILES WILL BE LINKED OR COPIED.");
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let interrupt_handler = Arc::clone(&interrupt);
    ctrlc::set_handler(move || {
        interrupt_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let (src_hashes, ref_hashes) = hash_trees(
        &cli.src_dir,
        &cli.reference_dir,
        &opts,
        Arc::new(BarReporter::new("Hashing")),
        Some(interrupt),
    )
    .context("could not hash directories")?;

    // src → reference; flipped (reference → src) tells which reference files have no source twin.
    let identical = find_identical_files(&src_hashes, &ref_hashes);
    let flipped = flip_file_map(&identical);
    let missing = unmapped_files(&ref_hashes, &flipped);
    println!("Done scanning.");
    if missing.is_empty() {
        println!();
    } else {
        println!(
            "{}\n{}",
            Colors::colorize(Colors::MISSING, "The following files will not be linked."),
            to_indented_json(&missing)?
        );
    }

    let link_op = if opts.dry_run {
        ConnectOp::DryRun
    } else {
        ConnectOp::Link
    };
    let linked = connect_files(identical.keys(), &cli.src_dir, &cli.out_dir, link_op)
        .context("could not link files")?;

    let copied: &[PathBuf] = if opts.copy_missing { &missing } else { &[] };
    let copy_op = if opts.dry_run {
        ConnectOp::DryRun
    } else {
        ConnectOp::Copy
    };
    let copied_count = connect_files(copied, &cli.reference_dir, &cli.out_dir, copy_op)
        .context("could not copy missing files")?;

    if opts.dry_run {
        let mut linked_files: Vec<&PathBuf> = identical.keys().collect();
        linked_files.sort();
        let output = DryRunOutput {
            linked: linked_files,
            copied: copied.iter().collect(),
        };
        println!("{}", to_indented_json(&output)?);
    } else {
        info!(
            "{} | {}",
            Colors::colorize(Colors::LINKED, &format!("Linked: {}", linked)),
            Colors::colorize(Colors::COPIED, &format!("Copied: {}", copied_count))
        );
        println!("Done processing. Enjoy your files :)");
    }
    Ok(())
}
