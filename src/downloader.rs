use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;

use crate::api::Client;
use crate::error::{FetchError, FetchResult};
use crate::progress::default_progress_fn;

/// Callback type for reporting download progress.
/// Arguments: source URL, bytes downloaded, total bytes, MiB/s, is_complete
pub type ProgressFn = Arc<dyn Fn(&str, u64, u64, f64, bool) + Send + Sync>;

/// Streams release artifacts to local files over the API client's transport.
pub struct Downloader {
    http: reqwest::Client,
    progress: Option<ProgressFn>,
}

impl Downloader {
    /// Create a downloader sharing the client's transport settings.
    pub fn new(client: &Client) -> Self {
        Self {
            http: client.http(),
            progress: Some(default_progress_fn()),
        }
    }

    /// Override the progress callback.
    pub fn with_progress(mut self, progress: Option<ProgressFn>) -> Self {
        self.progress = progress;
        self
    }

    /// Stream `url` into `dest`.
    ///
    /// When `expected_size` is known (> 0) the byte count written is checked
    /// against it. The file is written in place: a failed download can leave
    /// a truncated file at `dest`.
    pub async fn fetch(&self, url: &str, dest: &Path, expected_size: Option<i64>) -> FetchResult<()> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                context: format!("download {url}"),
                status,
            });
        }

        let total = resp.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut stream = resp.bytes_stream();
        let mut file = std::fs::File::create(dest)?;

        let start = Instant::now();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;
            file.write_all(&chunk)?;

            if let Some(progress) = &self.progress {
                progress(url, downloaded, total, rate(downloaded, &start), false);
            }
        }
        if let Some(progress) = &self.progress {
            progress(url, downloaded, total, rate(downloaded, &start), true);
        }

        match expected_size {
            Some(want) if want > 0 && downloaded as i64 != want => Err(FetchError::SizeMismatch {
                name: dest.display().to_string(),
                want,
                got: downloaded as i64,
            }),
            _ => Ok(()),
        }
    }
}

fn rate(downloaded: u64, start: &Instant) -> f64 {
    let elapsed = start.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        (downloaded as f64) / (1024.0 * 1024.0) / elapsed
    } else {
        0.0
    }
}

/// Format a byte count in IEC units with trailing zeros stripped,
/// e.g. `1536` → `"1.5 KB"` and `1024` → `"1 KB"`.
pub fn byte_count_iec(b: i64) -> String {
    const UNIT: i64 = 1024;
    if b < UNIT {
        return format!("{b} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = b / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let formatted = format!("{:.2}", b as f64 / div as f64);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}B", ["K", "M", "G", "T", "P", "E"][exp])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_count_plain_bytes() {
        assert_eq!(byte_count_iec(0), "0 B");
        assert_eq!(byte_count_iec(512), "512 B");
        assert_eq!(byte_count_iec(1023), "1023 B");
    }

    #[test]
    fn byte_count_strips_trailing_zeros() {
        assert_eq!(byte_count_iec(1024), "1 KB");
        assert_eq!(byte_count_iec(1536), "1.5 KB");
        assert_eq!(byte_count_iec(1024 * 1024), "1 MB");
        assert_eq!(byte_count_iec(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn byte_count_keeps_significant_fraction() {
        assert_eq!(byte_count_iec(1126), "1.1 KB");
        assert_eq!(byte_count_iec(1024 + 256), "1.25 KB");
    }
}
