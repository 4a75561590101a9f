//! Per-reference orchestration: list releases, select, download, report.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::action::{hl, ActionOutput};
use crate::api::{Client, Release};
use crate::config::Reference;
use crate::downloader::{byte_count_iec, Downloader};
use crate::error::{FetchError, FetchResult};
use crate::filter;
use crate::pattern::VersionMatcher;
use crate::report::ReleaseReport;
use crate::selector::Selection;

/// Processes references one at a time against a single client.
pub struct Runner {
    client: Client,
    downloader: Downloader,
    output: ActionOutput,
}

impl Runner {
    pub fn new(client: Client, output: ActionOutput) -> Self {
        let downloader = Downloader::new(&client);
        Self {
            client,
            downloader,
            output,
        }
    }

    pub fn output(&self) -> &ActionOutput {
        &self.output
    }

    /// Resolve one reference and download its artifacts.
    ///
    /// A fatal condition here aborts only this reference; the caller decides
    /// whether the batch continues.
    pub async fn run(&self, reference: &Reference) -> FetchResult<()> {
        let (owner, repo) = reference.repo_parts()?;
        let matcher = VersionMatcher::compile(&reference.version)?;

        info!("repository: {}", hl(&reference.repository));
        info!("prerelease: {}", hl(&reference.prerelease));
        info!("version rule: {}", hl(matcher.rule()));

        if reference.sources.is_empty() && reference.files.is_empty() {
            return Err(FetchError::Config(
                "input both empty sources and files".to_owned(),
            ));
        }

        let releases = self.client.list_releases(owner, repo).await?;
        if releases.is_empty() {
            return Err(FetchError::Selection(
                "no releases found in repository".to_owned(),
            ));
        }

        let dir = output_dir(&reference.download_to)?;
        let selection = Selection::new(&releases, &matcher, reference.prerelease_filter());

        if !reference.sources.is_empty() {
            let source = selection.source_release()?;
            info!("hit tag for source: {}", hl(&source.tag_name));

            let (url, name) = source_target(source, &reference.sources);
            let dest = dir.join(&name);
            self.downloader.fetch(&url, &dest, None).await?;
            info!("url: {}", hl(&url));
            info!("file: {}", hl(absolute(&dest).display()));

            // Source-only references report on the source release and stop.
            if reference.files.is_empty() {
                let (status, commit) = self
                    .client
                    .release_status(owner, repo, &source.tag_name)
                    .await?;
                info!("source tag SHA: {}", hl(&status.sha));
                ReleaseReport::new(source, &status, &commit).emit(&self.output)?;
                return Ok(());
            }
        }

        let release = selection.attachment_release()?;
        info!("hit tag: {}", hl(&release.tag_name));

        let (status, commit) = self
            .client
            .release_status(owner, repo, &release.tag_name)
            .await?;
        info!("tag SHA: {}", hl(&status.sha));

        let includes = filter::split_rules(&reference.files);
        let excludes = filter::split_rules(&reference.exclude);
        let mut downloaded_any = false;
        for attachment in &release.assets {
            if !filter::selects(&attachment.name, &includes, &excludes) {
                continue;
            }
            downloaded_any = true;
            let dest = dir.join(&attachment.name);
            self.downloader
                .fetch(&attachment.browser_download_url, &dest, Some(attachment.size))
                .await?;
            info!("url: {}", hl(&attachment.browser_download_url));
            info!("file: {}", hl(absolute(&dest).display()));
            info!("size: {}", hl(byte_count_iec(attachment.size)));
            if let Some(created) = attachment.created_at {
                info!("createdAt: {}", hl(created));
            }
        }
        if !downloaded_any {
            let names: Vec<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();
            return Err(FetchError::Selection(format!(
                "no release attachment matched file rule {includes:?} (attachments: {names:?})"
            )));
        }

        if reference.single {
            ReleaseReport::new(release, &status, &commit).emit(&self.output)?;
        }
        Ok(())
    }
}

/// Resolve the archive URL and local file name for a sources input.
///
/// `VERSION.tar.gz` and `VERSION.zip` select the generated archive; anything
/// else is a path under the tag, fetched relative to the archive URL's base.
fn source_target(release: &Release, sources: &str) -> (String, String) {
    match sources {
        "VERSION.tar.gz" => (
            release.tarball_url.clone(),
            file_name(&release.tarball_url),
        ),
        "VERSION.zip" => (
            release.zipball_url.clone(),
            file_name(&release.zipball_url),
        ),
        path => {
            let base = file_name(&release.tarball_url);
            let prefix = release
                .tarball_url
                .strip_suffix(base.as_str())
                .unwrap_or(release.tarball_url.as_str());
            (format!("{prefix}{path}"), path.replace('/', "_"))
        }
    }
}

fn file_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_owned()
}

fn output_dir(download_to: &str) -> FetchResult<PathBuf> {
    let dir = download_to.trim();
    if dir.is_empty() {
        return Ok(PathBuf::from("."));
    }
    std::fs::create_dir_all(dir)?;
    Ok(PathBuf::from(dir))
}

fn absolute(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|wd| wd.join(path))
        .unwrap_or_else(|_| path.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release_with_archives() -> Release {
        serde_json::from_value(serde_json::json!({
            "tag_name": "v1.0.0",
            "tarball_url": "https://gitea.example.com/o/r/archive/v1.0.0.tar.gz",
            "zipball_url": "https://gitea.example.com/o/r/archive/v1.0.0.zip",
        }))
        .unwrap()
    }

    #[test]
    fn source_target_tarball() {
        let (url, name) = source_target(&release_with_archives(), "VERSION.tar.gz");
        assert_eq!(url, "https://gitea.example.com/o/r/archive/v1.0.0.tar.gz");
        assert_eq!(name, "v1.0.0.tar.gz");
    }

    #[test]
    fn source_target_zipball() {
        let (url, name) = source_target(&release_with_archives(), "VERSION.zip");
        assert_eq!(url, "https://gitea.example.com/o/r/archive/v1.0.0.zip");
        assert_eq!(name, "v1.0.0.zip");
    }

    #[test]
    fn source_target_path_under_tag() {
        let (url, name) = source_target(&release_with_archives(), "docs/README.md");
        assert_eq!(url, "https://gitea.example.com/o/r/archive/docs/README.md");
        assert_eq!(name, "docs_README.md");
    }
}
