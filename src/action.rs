//! CI-platform plumbing: step outputs, log groups, and the colorized value
//! helpers used throughout the run log.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::FetchResult;

/// Delimiter for multiline values in the output file.
const EOF_MARK: &str = "RELEASE_FETCH_EOF";

/// Writes step outputs for the invoking CI platform.
///
/// Outputs go to the file named by `GITHUB_OUTPUT` (the convention shared by
/// GitHub and Gitea act runners); without it, the legacy `::set-output`
/// workflow command is printed instead.
pub struct ActionOutput {
    path: Option<PathBuf>,
}

impl ActionOutput {
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    /// Write outputs to an explicit file instead of the environment's.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> FetchResult<()> {
        match &self.path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                if value.contains('\n') {
                    writeln!(file, "{key}<<{EOF_MARK}\n{value}\n{EOF_MARK}")?;
                } else {
                    writeln!(file, "{key}={value}")?;
                }
            }
            None => {
                let escaped = value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A");
                println!("::set-output name={key}::{escaped}");
            }
        }
        Ok(())
    }

    /// Open a collapsible log group. Batch items are wrapped in one each.
    pub fn group(&self, name: &str) {
        println!("::group::{name}");
    }

    pub fn end_group(&self) {
        println!("::endgroup::");
    }
}

/// Highlight a value in the run log.
pub fn hl(value: impl Display) -> String {
    format!("\x1b[1;94m{value}\x1b[0m")
}

/// Mark a fatal diagnostic.
pub fn fail(message: impl Display) -> String {
    format!("\x1b[1;91m❌ {message}\x1b[0m")
}
