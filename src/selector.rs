//! Release selection: reduce the full release list to the releases that
//! source and attachment downloads should target.
//!
//! Selection is pure: all network fetching happens before this runs, and
//! the two targets may legitimately differ because source archives exist for
//! every tag while attachment downloads need at least one attachment.

use tracing::warn;

use crate::api::Release;
use crate::error::{FetchError, FetchResult};
use crate::pattern::VersionMatcher;
use crate::version;

/// The matched subset of a repository's releases, ordered by
/// semantic-version precedence.
pub struct Selection<'a> {
    /// Every tag observed, for diagnostics when nothing qualifies.
    all_tags: Vec<&'a str>,
    /// Matching releases, ascending; the best match is last.
    matched: Vec<&'a Release>,
}

impl<'a> Selection<'a> {
    /// Match `releases` against the version rule and prerelease filter.
    /// `prerelease: None` means no filtering by prerelease state.
    pub fn new(
        releases: &'a [Release],
        matcher: &VersionMatcher,
        prerelease: Option<bool>,
    ) -> Self {
        let mut all_tags = Vec::with_capacity(releases.len());
        let mut matched = Vec::new();
        for release in releases {
            all_tags.push(release.tag_name.as_str());
            if let Some(want) = prerelease {
                if release.prerelease != want {
                    continue;
                }
            }
            if !matcher.matches(&release.tag_name) {
                continue;
            }
            matched.push(release);
        }
        matched.sort_by(|a, b| version::compare(&a.tag_name, &b.tag_name));
        Self { all_tags, matched }
    }

    /// Matched tags in ascending version order.
    pub fn matched_tags(&self) -> Vec<&str> {
        self.matched.iter().map(|r| r.tag_name.as_str()).collect()
    }

    /// The release a source-archive download targets: the best matching tag,
    /// with no attachment requirement.
    pub fn source_release(&self) -> FetchResult<&'a Release> {
        self.matched.last().copied().ok_or_else(|| {
            FetchError::Selection("no release tag matched version rule".to_owned())
        })
    }

    /// The release an attachment download targets: the best matching tag
    /// that has at least one attachment. Releases without attachments are
    /// skipped with a warning and selection moves to the next-best tag.
    pub fn attachment_release(&self) -> FetchResult<&'a Release> {
        for release in self.matched.iter().rev() {
            if !release.assets.is_empty() {
                return Ok(release);
            }
            warn!("no attachment found in release: {}, skip it", release.tag_name);
        }
        Err(FetchError::Selection(format!(
            "no release tag matched version rule or no attachment found in these releases \
             (all tags: {:?})",
            self.all_tags
        )))
    }
}
