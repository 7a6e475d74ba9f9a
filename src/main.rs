//! gosta CLI
//!
//! Loads goroutine stack dumps into a database so they can be queried
//! with SQL instead of grep.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gosta::commands::{display_backends, execute_ingest, execute_inspect, IngestArgs, InspectArgs};
use gosta::parser::ParseMode;
use gosta::utils::config::{DEFAULT_BACKEND, DEFAULT_DB_NAME};

/// gosta - goroutine stack dumps into SQL tables
#[derive(Parser, Debug)]
#[command(name = "gosta")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where to read the dump from
#[derive(Args, Debug)]
struct SourceOpts {
    /// File name of stack traces
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// URL from which to fetch stack traces
    #[arg(short, long)]
    url: Option<String>,

    /// Skip goroutines with malformed headers instead of aborting
    #[arg(long)]
    skip_malformed: bool,
}

impl SourceOpts {
    fn mode(&self) -> ParseMode {
        if self.skip_malformed {
            ParseMode::SkipMalformed
        } else {
            ParseMode::FailFast
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a stack dump and store it in a database
    Ingest {
        #[command(flatten)]
        source: SourceOpts,

        /// Database backend to which stack traces are dumped
        #[arg(long, default_value = DEFAULT_BACKEND)]
        db: String,

        /// Password for connecting to the database
        #[arg(short, long, env = "GOSTA_DB_PASSWORD")]
        password: Option<String>,

        /// Database name (file for sqlite3, directory for json)
        #[arg(short = 'n', long, default_value = DEFAULT_DB_NAME)]
        db_name: String,

        /// Table in which stacks are stored. If empty, name will be gosta_<datetime>
        #[arg(short, long)]
        table: Option<String>,

        /// Print a state summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Parse a stack dump and print a state summary
    Inspect {
        #[command(flatten)]
        source: SourceOpts,

        /// Number of wait reasons to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// List supported database backends
    Backends,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Ingest {
            source,
            db,
            password,
            db_name,
            table,
            summary,
        } => {
            let mode = source.mode();
            let args = IngestArgs {
                file: source.file,
                url: source.url,
                backend: db,
                db_name,
                password,
                table,
                mode,
                print_summary: summary,
            };
            execute_ingest(args)?;
        }

        Commands::Inspect { source, top } => {
            let mode = source.mode();
            execute_inspect(InspectArgs {
                file: source.file,
                url: source.url,
                mode,
                top_reasons: top,
            })?;
        }

        Commands::Backends => {
            display_backends();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_password_absent_unless_given() {
        std::env::remove_var("GOSTA_DB_PASSWORD");

        let cli = Cli::try_parse_from(["gosta", "ingest", "-f", "stacks.txt"]).unwrap();
        match cli.command {
            Commands::Ingest { password, .. } => assert_eq!(password, None),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["gosta", "ingest", "-f", "stacks.txt", "-p", "secret"]).unwrap();
        match cli.command {
            Commands::Ingest { password, .. } => assert_eq!(password.as_deref(), Some("secret")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
