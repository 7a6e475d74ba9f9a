use crate::utils::config::{DEFAULT_BACKEND, SUPPORTED_BACKENDS};

/// Display supported storage backends
pub fn display_backends() {
    println!("Supported backends:");
    for backend in SUPPORTED_BACKENDS {
        if *backend == DEFAULT_BACKEND {
            println!("  {} (default)", backend);
        } else {
            println!("  {}", backend);
        }
    }
    println!();
    println!("Table layout:");
    println!("  id: integer primary key  - Goroutine id");
    println!("  running: boolean         - Goroutine is executing");
    println!("  runnable: boolean        - Goroutine can be scheduled");
    println!("  lockedToThread: boolean  - Goroutine is pinned to an OS thread");
    println!("  waitReason: text         - Why the goroutine is blocked");
    println!("  stalledSince: interval   - Wait time, e.g. '4 minutes'");
    println!("  body: text               - Full stack trace");
}
