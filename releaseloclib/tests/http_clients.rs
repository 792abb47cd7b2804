//! Integration tests for the GitHub client and the release downloader.
//!
//! Uses wiremock for HTTP mocking. Covers status mapping for the tag lookup,
//! release listing, tarball download, and the extraction cache.

mod common;

use std::time::Duration;

use releaseloclib::{
    GitHubClient, HostingApi, ReleaseDownloader, ReleaselocError, Repository, RunConfig,
};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{js_lines, release_json, tarball};

fn repo() -> Repository {
    Repository::new("acme", "widget")
}

fn github(server: &MockServer, token: Option<&str>) -> GitHubClient {
    let config = RunConfig::new(repo(), "v1.0.0", "v1.2.0")
        .api_url(server.uri())
        .token(token.map(str::to_string));
    GitHubClient::new(&config).expect("failed to create client")
}

fn downloader(server: &MockServer) -> ReleaseDownloader {
    ReleaseDownloader::new(server.uri(), Duration::from_secs(5)).expect("failed to create client")
}

#[tokio::test]
async fn test_release_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/v1.0.0"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json("v1.0.0", 1)))
        .mount(&server)
        .await;

    let exists = github(&server, Some("secret"))
        .release_exists(&repo(), "v1.0.0")
        .await
        .unwrap();
    assert!(exists);
}

#[tokio::test]
async fn test_release_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/v9.9.9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let exists = github(&server, None)
        .release_exists(&repo(), "v9.9.9")
        .await
        .unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_release_exists_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = github(&server, Some("expired"))
        .release_exists(&repo(), "v1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaselocError::AccessForbidden { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_release_exists_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = github(&server, None)
        .release_exists(&repo(), "v1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaselocError::Http { ref status, .. } if status.starts_with("502")));
}

#[tokio::test]
async fn test_list_releases_sends_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            release_json("v1.1.0", 3),
            release_json("v1.0.0", 1),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let releases = github(&server, None)
        .list_releases(&repo(), 3, 2)
        .await
        .unwrap();

    let tags: Vec<&str> = releases.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, ["v1.1.0", "v1.0.0"]);
    assert_eq!(releases[0].name.as_deref(), Some("v1.1.0"));
}

#[tokio::test]
async fn test_list_releases_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = github(&server, None)
        .list_releases(&repo(), 1, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaselocError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_download_extracts_and_caches() {
    let server = MockServer::start().await;
    let body = tarball(&[("index.js", js_lines(3))]);
    Mock::given(method("GET"))
        .and(path("/widget/-/widget-1.0.0.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let downloader = downloader(&server);

    let first = downloader.download("widget@1.0.0", dir.path()).await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.tarball_size, Some(body.len() as u64));
    assert!(first.dest.join("package/index.js").is_file());

    let second = downloader.download("widget@1.0.0", dir.path()).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.tarball_size, None);
    assert_eq!(second.dest, first.dest);
}

#[tokio::test]
async fn test_download_scoped_package() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@sveltejs/kit/-/kit-1.0.0.tgz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(tarball(&[("index.js", js_lines(1))])),
        )
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let download = downloader(&server)
        .download("@sveltejs/kit@1.0.0", dir.path())
        .await
        .unwrap();

    assert_eq!(download.dest, dir.path().join("@sveltejs/kit@1.0.0"));
    assert!(download.dest.join("package/index.js").is_file());
}

#[tokio::test]
async fn test_download_not_found_leaves_no_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget/-/widget-9.9.9.tgz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let err = downloader(&server)
        .download("widget@9.9.9", dir.path())
        .await
        .unwrap_err();

    match err {
        ReleaselocError::TarballNotFound { url } => {
            assert!(url.ends_with("/widget/-/widget-9.9.9.tgz"), "{url}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("widget@9.9.9").exists());
}

#[tokio::test]
async fn test_download_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget/-/widget-1.0.0.tgz"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let err = downloader(&server)
        .download("widget@1.0.0", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaselocError::DownloadFailed { ref status } if status.starts_with("500")));
    assert!(!dir.path().join("widget@1.0.0").exists());
}

#[tokio::test]
async fn test_download_corrupt_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget/-/widget-1.0.0.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"garbage".to_vec()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let err = downloader(&server)
        .download("widget@1.0.0", dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaselocError::Extract { .. }));
    assert!(!dir.path().join("widget@1.0.0").exists());
    // No staging directory left behind either
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
