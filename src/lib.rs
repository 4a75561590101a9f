//! # release-fetch
//!
//! Resolves a release reference (repository, version rule, prerelease
//! filter) against a Gitea server, selects the best-matching release, and
//! downloads its source archive and/or attachments, emitting metadata about
//! the selected release as CI step outputs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use release_fetch::{ActionOutput, Client, Reference, Runner, Transport};
//!
//! #[tokio::main]
//! async fn main() -> release_fetch::FetchResult<()> {
//!     let client = Client::connect("https://gitea.com", &Transport::default()).await?;
//!     let runner = Runner::new(client, ActionOutput::from_env());
//!     runner
//!         .run(&Reference {
//!             repository: "gitea/tea".to_owned(),
//!             version: "v0.9.*".to_owned(),
//!             files: "tea-*-linux-amd64".to_owned(),
//!             ..Default::default()
//!         })
//!         .await
//! }
//! ```

pub mod action;
pub mod api;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod progress;
pub mod report;
pub mod run;
pub mod selector;
pub mod version;

pub use action::ActionOutput;
pub use api::Client;
pub use config::{Reference, Transport};
pub use downloader::Downloader;
pub use error::{FetchError, FetchResult};
pub use pattern::VersionMatcher;
pub use report::ReleaseReport;
pub use run::Runner;
pub use selector::Selection;
