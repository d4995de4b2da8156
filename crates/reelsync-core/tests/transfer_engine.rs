//! Integration test: transfer engine against a local HTTP server.

mod common;

use common::http_server::{self, Reply};
use reelsync_core::retry::RetryPolicy;
use reelsync_core::transfer::{DownloadTask, FetchOptions, Transfer, TransferEngine, TEMP_SUFFIX};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn engine(max_attempts: u32, base_ms: u64) -> TransferEngine {
    TransferEngine::new(
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
            max_delay: Duration::from_secs(1),
        },
        FetchOptions::new("reelsync-test/1.0", Some("https://www.instagram.com/".to_string())),
    )
}

fn task(url: String, caption: Option<&str>) -> DownloadTask {
    DownloadTask {
        asset_url: url,
        owner_handle: "natgeo".to_string(),
        short_code: "C0de123".to_string(),
        caption: caption.map(str::to_string),
    }
}

#[tokio::test]
async fn retries_until_success_and_writes_named_file() {
    let body: Vec<u8> = (0u8..=255).cycle().take(32 * 1024).collect();
    let server = http_server::start(vec![
        Reply::status(500),
        Reply::status(503),
        Reply::ok(&body),
    ]);
    let root = tempdir().unwrap();

    let start = Instant::now();
    let result = engine(3, 30)
        .transfer(
            &task(server.url("/v/clip.mp4?efg=abc"), Some("Lion cubs 🦁 at dawn #wild")),
            root.path(),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.size, Some(body.len() as u64));
    // base + 2*base
    assert!(start.elapsed() >= Duration::from_millis(90));

    let expected = root.path().join("natgeo").join("Lion_cubs_at_dawn_C0de123.mp4");
    assert_eq!(result.file_path.as_deref(), Some(expected.as_path()));
    assert_eq!(std::fs::read(&expected).unwrap(), body);

    let leftovers: Vec<_> = std::fs::read_dir(root.path().join("natgeo"))
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
        .collect();
    assert!(leftovers.is_empty());
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn sends_user_agent_and_referer() {
    let server = http_server::start(vec![Reply::ok(b"data")]);
    let root = tempdir().unwrap();
    let result = engine(1, 1)
        .transfer(&task(server.url("/a.mp4"), None), root.path())
        .await;
    assert!(result.success);

    let request = server.requests().remove(0).to_ascii_lowercase();
    assert!(request.starts_with("get /a.mp4 "));
    assert!(request.contains("user-agent: reelsync-test/1.0"));
    assert!(request.contains("referer: https://www.instagram.com/"));
}

#[tokio::test]
async fn http_error_exhausts_attempts() {
    let server = http_server::start(vec![Reply::status(404)]);
    let root = tempdir().unwrap();
    let result = engine(3, 5)
        .transfer(&task(server.url("/gone.mp4"), None), root.path())
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("HTTP 404"));
    assert!(result.file_path.is_none());
    assert_eq!(server.requests().len(), 3);
    assert!(!root.path().join("natgeo").join("C0de123.mp4").exists());
}

#[tokio::test]
async fn empty_body_is_a_failure() {
    let server = http_server::start(vec![Reply::ok(b"")]);
    let root = tempdir().unwrap();
    let result = engine(2, 5)
        .transfer(&task(server.url("/empty.mp4"), None), root.path())
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("empty response body"));
    assert_eq!(server.requests().len(), 2);
}
