use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use release_fetch::action::{fail, ActionOutput};
use release_fetch::config::{parse_batch, parse_bool, parse_timeout, Reference, Transport};
use release_fetch::{Client, FetchResult, Runner};

/// Fetch release sources and attachments from a Gitea server.
///
/// Every flag falls back to the corresponding `INPUT_*` environment
/// variable, the convention used by act-style CI runners.
#[derive(Parser)]
#[command(name = "release-fetch", disable_version_flag = true)]
struct Cli {
    /// Repository to fetch from, as owner/name
    #[arg(long, env = "INPUT_REPOSITORY", default_value = "")]
    repository: String,
    /// Filter releases by prerelease flag: true, false, or empty for either
    #[arg(long, env = "INPUT_PRERELEASE", default_value = "")]
    prerelease: String,
    /// Version rule: glob over tag names; empty or "latest" for any
    #[arg(long, env = "INPUT_VERSION", default_value = "")]
    version: String,
    /// Directory to download into
    #[arg(long, env = "INPUT_DOWNLOADTO", default_value = "")]
    download_to: String,
    /// Source archive: VERSION.tar.gz, VERSION.zip, or a path under the tag
    #[arg(long, env = "INPUT_SOURCES", default_value = "")]
    sources: String,
    /// Newline- or comma-separated include globs for attachments
    #[arg(long, env = "INPUT_FILES", default_value = "")]
    files: String,
    /// Newline- or comma-separated exclude globs for attachments
    #[arg(long, env = "INPUT_EXCLUDE", default_value = "")]
    exclude: String,
    /// JSON array of references to process in one run
    #[arg(long, env = "INPUT_BATCH", default_value = "")]
    batch: String,
    /// API token; falls back to the GITEA_TOKEN environment variable
    #[arg(long, env = "INPUT_TOKEN", default_value = "", hide_env_values = true)]
    token: String,
    /// Skip TLS certificate verification
    #[arg(long, env = "INPUT_INSECURE", default_value = "")]
    insecure: String,
    /// Overall request timeout, e.g. 30s or 5m
    #[arg(long, env = "INPUT_TIMEOUT", default_value = "")]
    timeout: String,
    /// Base URL of the Gitea server
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://gitea.com")]
    server_url: String,
}

impl Cli {
    fn references(&self) -> FetchResult<Vec<Reference>> {
        let batch = self.batch.trim();
        if batch.is_empty() {
            return Ok(vec![Reference {
                repository: self.repository.trim().to_owned(),
                prerelease: self.prerelease.trim().to_owned(),
                version: self.version.trim().to_owned(),
                download_to: self.download_to.trim().to_owned(),
                sources: self.sources.trim().to_owned(),
                files: self.files.trim().to_owned(),
                exclude: self.exclude.trim().to_owned(),
                single: true,
            }]);
        }
        parse_batch(batch)
    }

    fn transport(&self) -> FetchResult<Transport> {
        let token = if self.token.is_empty() {
            std::env::var("GITEA_TOKEN").unwrap_or_default()
        } else {
            self.token.clone()
        };
        Ok(Transport {
            token,
            insecure: parse_bool(&self.insecure),
            timeout: parse_timeout(&self.timeout)?,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", fail(e));
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when one or more references failed; an `Err` means
/// the run could not start at all.
async fn run(cli: Cli) -> FetchResult<bool> {
    let references = cli.references()?;
    let transport = cli.transport()?;
    let client = Client::connect(&cli.server_url, &transport).await?;
    let runner = Runner::new(client, ActionOutput::from_env());

    let mut all_ok = true;
    for reference in &references {
        if !reference.single {
            runner.output().group(&reference.repository);
        }
        // A failed reference does not stop the rest of the batch.
        if let Err(e) = runner.run(reference).await {
            error!("{}", fail(&e));
            all_ok = false;
        }
        if !reference.single {
            runner.output().end_group();
        }
    }
    Ok(all_ok)
}
