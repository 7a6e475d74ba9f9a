//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod ingest;
pub mod inspect;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use ingest::{execute_ingest, validate_args, IngestReport};
pub use inspect::execute_inspect;
pub use models::{IngestArgs, InspectArgs};
pub use utils::display_backends;
