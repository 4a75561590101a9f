use std::time::Duration;

use serde::Deserialize;

use crate::error::{FetchError, FetchResult};

/// One resolution request: which repository, which release, what to download.
///
/// In batch mode a JSON array of these is supplied; in single mode the
/// fields come straight from the action inputs and `single` is set so the
/// step outputs get emitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reference {
    pub repository: String,
    /// `"true"`, `"false"`, or empty for either.
    pub prerelease: String,
    /// Glob version rule over tag names; empty means latest.
    pub version: String,
    pub download_to: String,
    /// `VERSION.tar.gz`, `VERSION.zip`, or a literal path under the tag.
    pub sources: String,
    /// Newline- or comma-separated include globs for attachments.
    pub files: String,
    /// Newline- or comma-separated exclude globs for attachments.
    pub exclude: String,
    #[serde(skip)]
    pub single: bool,
}

impl Reference {
    /// Split `repository` into `(owner, name)`.
    pub fn repo_parts(&self) -> FetchResult<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(FetchError::Config(format!(
                "invalid repository: {}",
                self.repository
            ))),
        }
    }

    /// The prerelease tri-state: `None` means no filtering.
    pub fn prerelease_filter(&self) -> Option<bool> {
        match self.prerelease.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// Parse the batch input, a JSON array of references.
pub fn parse_batch(raw: &str) -> FetchResult<Vec<Reference>> {
    serde_json::from_str(raw)
        .map_err(|e| FetchError::Config(format!("failed to parse batch: {e}")))
}

/// Process-wide HTTP transport settings, established once before any
/// reference runs and threaded into the client constructor.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    /// Opaque bearer token, passed through as `Authorization: token …`.
    pub token: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Overall request timeout; `None` means no timeout.
    pub timeout: Option<Duration>,
}

/// Lenient bool parsing for action inputs: unrecognized values are `false`.
pub fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}

/// Parse a Go-style duration input such as `30s`, `5m`, `1h30m` or `500ms`.
/// A bare number is taken as seconds. Empty and `0` mean no timeout.
pub fn parse_timeout(raw: &str) -> FetchResult<Option<Duration>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return Ok(None);
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Some(Duration::from_secs(secs)));
    }

    let invalid = || FetchError::Config(format!("failed to parse timeout: {raw:?}"));
    let mut total = Duration::ZERO;
    let mut num = String::new();
    let mut unit = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            if !unit.is_empty() {
                total += segment(&num, &unit).ok_or_else(invalid)?;
                num.clear();
                unit.clear();
            }
            num.push(c);
        } else {
            if num.is_empty() {
                return Err(invalid());
            }
            unit.push(c);
        }
    }
    total += segment(&num, &unit).ok_or_else(invalid)?;
    Ok(Some(total))
}

fn segment(num: &str, unit: &str) -> Option<Duration> {
    let n: u64 = num.parse().ok()?;
    Some(match unit {
        "ms" => Duration::from_millis(n),
        "s" => Duration::from_secs(n),
        "m" => Duration::from_secs(n * 60),
        "h" => Duration::from_secs(n * 3600),
        _ => return None,
    })
}
