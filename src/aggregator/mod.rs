//! Aggregation of parsed goroutines into summary statistics.
//!
//! This module turns a parsed dump into:
//! - State counts (running, runnable, locked to thread, stalled)
//! - The most common wait reasons
//! - The longest-stalled goroutine

pub mod state_summary;

// Re-export main types and functions
pub use state_summary::{generate_text_summary, summarize_states, StateSummary, WaitReasonCount};
