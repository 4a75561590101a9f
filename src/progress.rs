use std::sync::Arc;

use crate::downloader::ProgressFn;

/// Returns the default progress function, printing in-place download
/// progress to stdout. A percentage is shown when the server reported a
/// content length.
pub fn default_progress_fn() -> ProgressFn {
    Arc::new(|src: &str, current: u64, total: u64, mib_per_sec: f64, complete: bool| {
        let current_mib = current as f64 / (1024.0 * 1024.0);
        let detail = if total > 0 {
            format!("{:.0}%", current as f64 / total as f64 * 100.0)
        } else {
            format!("{current_mib:.1} MiB")
        };
        if complete {
            println!("\rdownloaded {src} ({detail}, {mib_per_sec:.2} MiB/s)");
        } else {
            print!("\r\x1b[Kdownloading {src}... {detail} ({mib_per_sec:.2} MiB/s)");
        }
    })
}
