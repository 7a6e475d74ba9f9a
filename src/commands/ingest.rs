//! Ingest command implementation.
//!
//! The ingest command:
//! 1. Opens the dump (file or URL)
//! 2. Parses goroutine records
//! 3. Creates the destination table
//! 4. Inserts every record

use super::models::IngestArgs;
use crate::aggregator::{generate_text_summary, summarize_states};
use crate::parser::parse_dump;
use crate::sink::{
    default_table_name, is_backend_supported, open_sink, persist, validate_table_name, SinkConfig,
};
use crate::source::Source;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::time::Instant;

/// What an ingest run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Destination the records were written to
    pub table: String,

    /// Records written
    pub written: usize,

    /// Malformed headers dropped (skip mode only)
    pub skipped: usize,
}

/// Execute the ingest command
///
/// **Public** - main entry point called from main.rs
///
/// Elapsed wall-clock time is logged whether the run succeeds or fails.
///
/// # Errors
/// * Invalid arguments or unsupported backend (checked before any I/O)
/// * Source open/fetch failures
/// * Header decoding errors (fail-fast mode)
/// * Database errors; rows inserted before the failure are kept
pub fn execute_ingest(args: IngestArgs) -> Result<IngestReport> {
    let start_time = Instant::now();

    let result = run_ingest(&args);

    let elapsed = start_time.elapsed();
    match &result {
        Ok(report) => info!(
            "Wrote {} goroutines to {} in {:.2}s",
            report.written,
            report.table,
            elapsed.as_secs_f64()
        ),
        Err(e) => error!("Ingest failed after {:.2}s: {:#}", elapsed.as_secs_f64(), e),
    }

    result
}

fn run_ingest(args: &IngestArgs) -> Result<IngestReport> {
    // Capability check comes before any parsing work
    validate_args(args)?;
    let source = Source::from_args(args.file.clone(), args.url.clone())?;

    let table = match &args.table {
        Some(table) => table.clone(),
        None => default_table_name(&chrono::Local::now()),
    };

    info!("Step 1/3: Reading stack dump from {}...", source);
    let reader = source.open().context("Failed to open stack dump")?;

    info!("Step 2/3: Parsing goroutines...");
    let dump = parse_dump(reader, args.mode).context("Failed to parse stack dump")?;

    debug!(
        "Parsed {} goroutines ({} lines, {} orphan lines)",
        dump.len(),
        dump.stats.lines,
        dump.stats.orphan_lines
    );
    if dump.stats.skipped_headers > 0 {
        warn!("Skipped {} malformed goroutines", dump.stats.skipped_headers);
    }

    info!("Step 3/3: Writing to {} backend...", args.backend);
    let mut sink = open_sink(&SinkConfig {
        backend: args.backend.clone(),
        db_name: args.db_name.clone(),
        password: args.password.clone(),
    })
    .with_context(|| format!("Failed to open {} database {}", args.backend, args.db_name))?;

    let written = persist(sink.as_mut(), &table, &dump)
        .with_context(|| format!("Failed to write stack traces to {}", table))?;

    info!("✓ {} stack traces written to {}", written, table);

    if args.print_summary {
        let summary = summarize_states(&dump, 10);
        info!("{}", summary.summary());
        println!("\n{}", "=".repeat(60));
        println!("DUMP SUMMARY ({})", table);
        println!("{}", "=".repeat(60));
        println!("{}", generate_text_summary(&summary));
        println!("{}", "=".repeat(60));
    }

    Ok(IngestReport {
        table,
        written,
        skipped: dump.stats.skipped_headers,
    })
}

/// Validate ingest arguments
///
/// **Public** - can be called before execute_ingest for early validation
pub fn validate_args(args: &IngestArgs) -> Result<()> {
    if args.file.is_some() && args.url.is_some() {
        anyhow::bail!("Only one of a file (-f) and a URL (-u) may be given");
    }

    if args.file.is_none() && args.url.is_none() {
        anyhow::bail!("A file (-f) or a URL (-u) is required");
    }

    if !is_backend_supported(&args.backend) {
        anyhow::bail!("Unsupported backend: {}", args.backend);
    }

    if args.db_name.is_empty() {
        anyhow::bail!("Database name cannot be empty");
    }

    if let Some(table) = &args.table {
        validate_table_name(table)?;
    }

    Ok(())
}
