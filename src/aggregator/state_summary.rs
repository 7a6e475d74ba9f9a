//! Summary statistics over the goroutines of one dump.
//!
//! Answers the usual first questions about a dump: how many goroutines are
//! running, what the rest are blocked on, and who has been stuck longest.

use crate::parser::{StackDump, StackTraceRecord};
use log::debug;
use std::collections::HashMap;
use std::time::Duration;

/// Goroutine count for one wait reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReasonCount {
    pub reason: String,
    pub count: usize,
}

/// State statistics for a dump
///
/// **Public** - returned from summarize_states
#[derive(Debug, Clone, Default)]
pub struct StateSummary {
    /// Goroutines in the dump
    pub total: usize,

    pub running: usize,

    /// Runnable but not running
    pub runnable: usize,

    pub locked_to_thread: usize,

    /// Goroutines with a non-zero stall time
    pub stalled: usize,

    /// Most common wait reasons, most frequent first
    pub top_wait_reasons: Vec<WaitReasonCount>,

    /// Id and stall time of the longest-stalled goroutine
    pub longest_stall: Option<(u64, Duration)>,
}

impl StateSummary {
    /// Get human-readable summary
    ///
    /// **Public** - for logging
    pub fn summary(&self) -> String {
        format!(
            "Goroutines: {} | Running: {} | Runnable: {} | Locked: {} | Stalled: {}",
            self.total, self.running, self.runnable, self.locked_to_thread, self.stalled
        )
    }
}

/// Calculate state statistics for a dump
///
/// **Public** - main entry point for summaries
///
/// # Arguments
/// * `dump` - Parsed dump
/// * `top_n` - Number of wait reasons to keep
pub fn summarize_states(dump: &StackDump, top_n: usize) -> StateSummary {
    debug!("Summarizing {} goroutines", dump.len());

    let mut summary = StateSummary {
        total: dump.len(),
        ..Default::default()
    };
    let mut reasons: HashMap<&str, usize> = HashMap::new();

    for record in dump {
        if record.running {
            summary.running += 1;
        } else if record.runnable {
            summary.runnable += 1;
        }
        if record.locked_to_thread {
            summary.locked_to_thread += 1;
        }
        if !record.wait_reason.is_empty() {
            *reasons.entry(record.wait_reason.as_str()).or_insert(0) += 1;
        }
        if record.stalled_since > Duration::ZERO {
            summary.stalled += 1;
            track_longest(&mut summary.longest_stall, record);
        }
    }

    let mut ranked: Vec<WaitReasonCount> = reasons
        .into_iter()
        .map(|(reason, count)| WaitReasonCount {
            reason: reason.to_string(),
            count,
        })
        .collect();
    // Ties broken by name so output is stable
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));
    ranked.truncate(top_n);
    summary.top_wait_reasons = ranked;

    summary
}

/// Keep the first goroutine with the largest stall
fn track_longest(longest: &mut Option<(u64, Duration)>, record: &StackTraceRecord) {
    if longest.map_or(true, |(_, stall)| record.stalled_since > stall) {
        *longest = Some((record.id, record.stalled_since));
    }
}

/// Render a summary as a text table
///
/// **Public** - printed by `inspect` and `ingest --summary`
pub fn generate_text_summary(summary: &StateSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!("  Goroutines:       {}", summary.total));
    lines.push(format!("  Running:          {}", summary.running));
    lines.push(format!("  Runnable:         {}", summary.runnable));
    lines.push(format!("  Locked to thread: {}", summary.locked_to_thread));
    lines.push(format!("  Stalled:          {}", summary.stalled));

    if let Some((id, stall)) = summary.longest_stall {
        lines.push(format!(
            "  Longest stall:    goroutine {} ({} minutes)",
            id,
            stall.as_secs() / 60
        ));
    }

    if !summary.top_wait_reasons.is_empty() {
        lines.push(String::new());
        lines.push(format!("  {:<40} {:>8} {:>7}", "WAIT REASON", "COUNT", "%"));

        let total = summary.total.max(1);
        for entry in &summary.top_wait_reasons {
            let percentage = (entry.count as f64 / total as f64) * 100.0;
            let reason = if entry.reason.chars().count() > 40 {
                format!("{}...", entry.reason.chars().take(37).collect::<String>())
            } else {
                entry.reason.clone()
            };
            lines.push(format!(
                "  {:<40} {:>8} {:>6.1}%",
                reason, entry.count, percentage
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_str, ParseMode};

    const DUMP: &str = "\
goroutine 1 [running]:
main.main()

goroutine 2 [runnable]:
main.worker()

goroutine 3 [chan receive, 4 minutes]:
main.consumer()

goroutine 4 [chan receive]:
main.consumer()

goroutine 5 [select, 9 minutes, locked to thread]:
main.loop()

goroutine 6 [IO wait, 9 minutes]:
net.read()
";

    #[test]
    fn test_summarize_states() {
        let dump = parse_str(DUMP, ParseMode::FailFast).unwrap();
        let summary = summarize_states(&dump, 10);

        assert_eq!(summary.total, 6);
        assert_eq!(summary.running, 1);
        assert_eq!(summary.runnable, 1);
        assert_eq!(summary.locked_to_thread, 1);
        assert_eq!(summary.stalled, 3);
        assert_eq!(summary.longest_stall, Some((5, Duration::from_secs(9 * 60))));
        assert_eq!(
            summary.top_wait_reasons[0],
            WaitReasonCount {
                reason: "chan receive".to_string(),
                count: 2
            }
        );
        assert_eq!(summary.top_wait_reasons.len(), 3);
    }

    #[test]
    fn test_top_n_truncates() {
        let dump = parse_str(DUMP, ParseMode::FailFast).unwrap();
        let summary = summarize_states(&dump, 1);
        assert_eq!(summary.top_wait_reasons.len(), 1);
    }

    #[test]
    fn test_empty_dump() {
        let summary = summarize_states(&StackDump::default(), 10);
        assert_eq!(summary.total, 0);
        assert!(summary.longest_stall.is_none());
        assert!(generate_text_summary(&summary).contains("Goroutines:       0"));
    }

    #[test]
    fn test_text_summary_lists_reasons() {
        let dump = parse_str(DUMP, ParseMode::FailFast).unwrap();
        let text = generate_text_summary(&summarize_states(&dump, 10));
        assert!(text.contains("chan receive"));
        assert!(text.contains("goroutine 5 (9 minutes)"));
    }
}
