//! Integration tests against a mock Gitea API server.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use release_fetch::action::ActionOutput;
use release_fetch::config::{Reference, Transport};
use release_fetch::{Client, FetchError, Runner};

async fn client(server: &MockServer) -> Client {
    Client::connect(&server.uri(), &Transport::default())
        .await
        .expect("client construction")
}

fn release(tag: &str, assets: Value) -> Value {
    json!({
        "tag_name": tag,
        "html_url": format!("https://example.com/o/r/releases/tag/{tag}"),
        "tarball_url": format!("https://example.com/o/r/archive/{tag}.tar.gz"),
        "zipball_url": format!("https://example.com/o/r/archive/{tag}.zip"),
        "published_at": "2024-03-09T12:30:05Z",
        "body": "release notes",
        "author": { "login": "maintainer" },
        "assets": assets,
    })
}

/// Mount the status → tag → commit lookup chain for one tag.
async fn mount_status_chain(server: &MockServer, tag: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/repos/o/r/commits/{tag}/status")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "state": "success", "sha": sha })),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/repos/o/r/git/commits/{sha}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": sha,
            "html_url": format!("https://example.com/o/r/commit/{sha}"),
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn listing_paginates_until_short_page() {
    let server = MockServer::start().await;

    let page1: Vec<Value> = (0..50).map(|i| release(&format!("v1.{i}.0"), json!([]))).collect();
    let page2 = vec![release("v2.0.0", json!([]))];

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page2))
        .expect(1)
        .mount(&server)
        .await;

    let releases = client(&server).await.list_releases("o", "r").await.unwrap();
    assert_eq!(releases.len(), 51);
    assert_eq!(releases[50].tag_name, "v2.0.0");
}

#[tokio::test]
async fn short_first_page_stops_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![release("v1.0.0", json!([]))]))
        .expect(1)
        .mount(&server)
        .await;

    let releases = client(&server).await.list_releases("o", "r").await.unwrap();
    assert_eq!(releases.len(), 1);
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).await.list_releases("o", "r").await.unwrap_err();
    assert!(matches!(err, FetchError::Status { .. }), "got {err}");
    assert!(err.to_string().contains("list releases"));
}

#[tokio::test]
async fn empty_status_sha_falls_back_to_tag_lookup_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/commits/v1.0.0/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "state": "success", "sha": "" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "v1.0.0",
            "commit": { "sha": "deadbeef" },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/git/commits/deadbeef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "deadbeef",
            "html_url": "https://example.com/o/r/commit/deadbeef",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, commit) = client(&server)
        .await
        .release_status("o", "r", "v1.0.0")
        .await
        .unwrap();
    assert_eq!(status.sha, "deadbeef");
    assert_eq!(commit.html_url, "https://example.com/o/r/commit/deadbeef");
}

#[tokio::test]
async fn reported_sha_skips_tag_lookup() {
    let server = MockServer::start().await;

    mount_status_chain(&server, "v1.0.0", "cafe42").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "v1.0.0",
            "commit": { "sha": "cafe42" },
        })))
        .expect(0)
        .mount(&server)
        .await;

    let (status, _) = client(&server)
        .await
        .release_status("o", "r", "v1.0.0")
        .await
        .unwrap();
    assert_eq!(status.sha, "cafe42");
}

#[tokio::test]
async fn run_downloads_filtered_attachments_and_emits_outputs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("step_output");

    // v2.0.0 matches best but has no attachments, so v1.5.0 is selected.
    let releases = vec![
        release("v2.0.0", json!([])),
        release(
            "v1.5.0",
            json!([
                {
                    "name": "app-1.0.tar.gz",
                    "browser_download_url": format!("{}/attachments/app-1.0.tar.gz", server.uri()),
                    "size": 7,
                    "created_at": "2024-03-01T00:00:00Z",
                },
                {
                    "name": "app-1.0-debug.tar.gz",
                    "browser_download_url": format!("{}/attachments/app-1.0-debug.tar.gz", server.uri()),
                    "size": 5,
                },
                { "name": "readme.txt", "browser_download_url": "", "size": 0 },
            ]),
        ),
    ];
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(&server)
        .await;
    mount_status_chain(&server, "v1.5.0", "abc123").await;
    Mock::given(method("GET"))
        .and(path("/attachments/app-1.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("payload"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attachments/app-1.0-debug.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("debug"))
        .expect(0)
        .mount(&server)
        .await;

    let runner = Runner::new(client(&server).await, ActionOutput::to_file(&output_file));
    let reference = Reference {
        repository: "o/r".to_owned(),
        download_to: dir.path().join("out").display().to_string(),
        files: "app-*.tar.gz".to_owned(),
        exclude: "*-debug.tar.gz".to_owned(),
        single: true,
        ..Default::default()
    };
    runner.run(&reference).await.unwrap();

    let downloaded = std::fs::read_to_string(dir.path().join("out/app-1.0.tar.gz")).unwrap();
    assert_eq!(downloaded, "payload");
    assert!(!dir.path().join("out/app-1.0-debug.tar.gz").exists());

    let outputs = std::fs::read_to_string(&output_file).unwrap();
    assert!(outputs.contains("tag=v1.5.0"), "outputs: {outputs}");
    assert!(outputs.contains("sha=abc123"), "outputs: {outputs}");
    assert!(outputs.contains("time=2024-03-09 12:30:05"), "outputs: {outputs}");
    assert!(outputs.contains("user=maintainer"), "outputs: {outputs}");
    assert!(outputs.contains("stable=✔"), "outputs: {outputs}");
    assert!(
        outputs.contains("commit=https://example.com/o/r/commit/abc123"),
        "outputs: {outputs}"
    );
}

#[tokio::test]
async fn run_fails_when_no_attachment_matches_file_rule() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let releases = vec![release(
        "v1.0.0",
        json!([{ "name": "other.bin", "browser_download_url": "", "size": 0 }]),
    )];
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(&server)
        .await;
    mount_status_chain(&server, "v1.0.0", "abc123").await;

    let runner = Runner::new(
        client(&server).await,
        ActionOutput::to_file(dir.path().join("step_output")),
    );
    let reference = Reference {
        repository: "o/r".to_owned(),
        download_to: dir.path().join("out").display().to_string(),
        files: "*.zip".to_owned(),
        single: true,
        ..Default::default()
    };
    let err = runner.run(&reference).await.unwrap_err();
    assert!(matches!(err, FetchError::Selection(_)), "got {err}");
    // The diagnostic dumps both the rule and the attachment names.
    let message = err.to_string();
    assert!(message.contains("*.zip"), "message: {message}");
    assert!(message.contains("other.bin"), "message: {message}");
}

#[tokio::test]
async fn size_mismatch_is_fatal() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let releases = vec![release(
        "v1.0.0",
        json!([{
            "name": "app.bin",
            "browser_download_url": format!("{}/attachments/app.bin", server.uri()),
            "size": 999,
        }]),
    )];
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases))
        .mount(&server)
        .await;
    mount_status_chain(&server, "v1.0.0", "abc123").await;
    Mock::given(method("GET"))
        .and(path("/attachments/app.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("short"))
        .mount(&server)
        .await;

    let runner = Runner::new(
        client(&server).await,
        ActionOutput::to_file(dir.path().join("step_output")),
    );
    let reference = Reference {
        repository: "o/r".to_owned(),
        download_to: dir.path().join("out").display().to_string(),
        files: "app.bin".to_owned(),
        single: true,
        ..Default::default()
    };
    let err = runner.run(&reference).await.unwrap_err();
    assert!(
        matches!(err, FetchError::SizeMismatch { want: 999, got: 5, .. }),
        "got {err}"
    );
}

#[tokio::test]
async fn source_only_reference_downloads_archive_and_reports() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("step_output");

    // The archive URL must point at the mock server for the download leg.
    let mut source_release = release("v1.0.0", json!([]));
    source_release["tarball_url"] =
        json!(format!("{}/o/r/archive/v1.0.0.tar.gz", server.uri()));
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![source_release]))
        .mount(&server)
        .await;
    mount_status_chain(&server, "v1.0.0", "abc123").await;
    Mock::given(method("GET"))
        .and(path("/o/r/archive/v1.0.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("tarball"))
        .expect(1)
        .mount(&server)
        .await;

    let runner = Runner::new(client(&server).await, ActionOutput::to_file(&output_file));
    let reference = Reference {
        repository: "o/r".to_owned(),
        download_to: dir.path().join("out").display().to_string(),
        sources: "VERSION.tar.gz".to_owned(),
        ..Default::default()
    };
    runner.run(&reference).await.unwrap();

    let archive = std::fs::read_to_string(dir.path().join("out/v1.0.0.tar.gz")).unwrap();
    assert_eq!(archive, "tarball");
    // Source-only references emit outputs even outside single mode.
    let outputs = std::fs::read_to_string(&output_file).unwrap();
    assert!(outputs.contains("tag=v1.0.0"), "outputs: {outputs}");
}
