//! Inspect command: parse a dump and print a state summary without storing it.

use super::models::InspectArgs;
use crate::aggregator::{generate_text_summary, summarize_states, StateSummary};
use crate::parser::parse_dump;
use crate::source::Source;
use anyhow::{Context, Result};
use log::info;

/// Execute the inspect command
///
/// **Public** - called from main.rs
pub fn execute_inspect(args: InspectArgs) -> Result<StateSummary> {
    let source = Source::from_args(args.file, args.url)?;

    let reader = source.open().context("Failed to open stack dump")?;
    let dump = parse_dump(reader, args.mode).context("Failed to parse stack dump")?;

    let summary = summarize_states(&dump, args.top_reasons);
    info!("{}", summary.summary());

    println!("Stack dump: {}", source);
    if dump.stats.skipped_headers > 0 {
        println!("  Skipped malformed goroutines: {}", dump.stats.skipped_headers);
    }
    println!("{}", generate_text_summary(&summary));

    Ok(summary)
}
