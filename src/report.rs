use serde::Serialize;

use crate::action::ActionOutput;
use crate::api::{CombinedStatus, Commit, Release};
use crate::error::FetchResult;

/// Metadata record describing the selected release, exported as CI step
/// outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseReport {
    pub tag: String,
    pub url: String,
    pub sha: String,
    /// Publish time, `YYYY-MM-DD HH:MM:SS`.
    pub time: String,
    pub body: String,
    pub user: String,
    /// Combined CI status state.
    pub status: String,
    /// `✔` when the release is neither prerelease nor draft, empty otherwise.
    pub stable: String,
    /// HTML URL of the resolved commit.
    pub commit: String,
}

impl ReleaseReport {
    pub fn new(release: &Release, status: &CombinedStatus, commit: &Commit) -> Self {
        Self {
            tag: release.tag_name.clone(),
            url: release.html_url.clone(),
            sha: status.sha.clone(),
            time: release
                .published_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            body: release.body.clone(),
            user: release.author.login.clone(),
            status: status.state.clone(),
            stable: stable_mark(release).to_owned(),
            commit: commit.html_url.clone(),
        }
    }

    pub fn emit(&self, output: &ActionOutput) -> FetchResult<()> {
        output.set("tag", &self.tag)?;
        output.set("url", &self.url)?;
        output.set("sha", &self.sha)?;
        output.set("time", &self.time)?;
        output.set("body", &self.body)?;
        output.set("user", &self.user)?;
        output.set("status", &self.status)?;
        output.set("stable", &self.stable)?;
        output.set("commit", &self.commit)?;
        Ok(())
    }
}

fn stable_mark(release: &Release) -> &'static str {
    if release.prerelease || release.draft {
        ""
    } else {
        "✔"
    }
}
