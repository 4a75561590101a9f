use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::config::Transport;
use crate::error::{FetchError, FetchResult};

/// Releases are listed in pages of this size; a short page ends the listing.
pub const PAGE_SIZE: usize = 50;

const CONNECT_ATTEMPTS: u32 = 5;

// ──────────────────────────────────────────────────────────────────────────────
// API objects
// ──────────────────────────────────────────────────────────────────────────────

/// A release as reported by the hosting API. Read-only once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub tarball_url: String,
    #[serde(default)]
    pub zipball_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: User,
    #[serde(default)]
    pub assets: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
}

/// A named binary artifact attached to exactly one release.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregated CI/check state for a commit or tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit: TagCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCommit {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
}

// ──────────────────────────────────────────────────────────────────────────────
// Client
// ──────────────────────────────────────────────────────────────────────────────

/// Gitea v1 API client.
///
/// Transport settings (token, TLS verification, timeout) are fixed at
/// construction; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Build a client for `base_url`, e.g. `https://gitea.example.com`.
    pub fn new(base_url: &str, transport: &Transport) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        if !transport.token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("token {}", transport.token))
                .map_err(|e| FetchError::Config(format!("invalid token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("release-fetch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = transport.timeout {
            builder = builder.timeout(timeout);
        }
        if transport.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Build a client, retrying construction up to five times.
    pub async fn connect(base_url: &str, transport: &Transport) -> FetchResult<Self> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match Self::new(base_url, transport) {
                Ok(client) => return Ok(client),
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn!("failed to create client: {e}, retrying...");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The HTTP client, shared with the downloader so transport settings
    /// apply to artifact downloads too.
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!("{}/api/v1/repos/{owner}/{repo}/{rest}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        context: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> FetchResult<T> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                context: context.to_owned(),
                status,
            });
        }
        Ok(resp.json().await?)
    }

    /// List every release of a repository.
    ///
    /// Pages are requested until one comes back shorter than [`PAGE_SIZE`].
    pub async fn list_releases(&self, owner: &str, repo: &str) -> FetchResult<Vec<Release>> {
        let url = self.repo_url(owner, repo, "releases");
        let mut releases = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<Release> = self
                .get_json(
                    "list releases",
                    &url,
                    &[
                        ("page", page.to_string()),
                        ("limit", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            let full_page = batch.len() == PAGE_SIZE;
            releases.extend(batch);
            if !full_page {
                break;
            }
            page += 1;
        }
        Ok(releases)
    }

    /// Combined CI status for a tag or commit ref.
    pub async fn combined_status(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> FetchResult<CombinedStatus> {
        self.get_json(
            &format!("get tag <{reference}> status"),
            &self.repo_url(owner, repo, &format!("commits/{reference}/status")),
            &[],
        )
        .await
    }

    pub async fn tag(&self, owner: &str, repo: &str, tag: &str) -> FetchResult<Tag> {
        self.get_json(
            &format!("get tag by name <{tag}>"),
            &self.repo_url(owner, repo, &format!("tags/{tag}")),
            &[],
        )
        .await
    }

    pub async fn commit(&self, owner: &str, repo: &str, sha: &str) -> FetchResult<Commit> {
        self.get_json(
            &format!("get commit by SHA <{sha}>"),
            &self.repo_url(owner, repo, &format!("git/commits/{sha}")),
            &[],
        )
        .await
    }

    /// Resolve the CI status and commit for a release tag.
    ///
    /// Some hosts leave the SHA empty on the combined-status endpoint; in
    /// that case the tag object is fetched once to obtain the commit SHA.
    pub async fn release_status(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> FetchResult<(CombinedStatus, Commit)> {
        let mut status = self.combined_status(owner, repo, tag).await?;
        if status.sha.is_empty() {
            status.sha = self.tag(owner, repo, tag).await?.commit.sha;
        }
        let commit = self.commit(owner, repo, &status.sha).await?;
        Ok((status, commit))
    }
}
