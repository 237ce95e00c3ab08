//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run the fetch,
//! probe and retrieval loops end-to-end.

use std::path::Path;
use track_harvest::config::{Config, HttpConfig, OutputConfig, DEFAULT_USER_AGENT};
use track_harvest::harvest::{
    build_http_client, fetch_page, LinkExtractor, LinkRegistry, Retriever, SizeProbe,
};
use track_harvest::output::{ProgressEvent, RetrievalOutcome};
use track_harvest::{HarvestError, Harvester, ItemError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIB: u64 = 1024 * 1024;

/// Creates a test configuration writing into the given directory
fn create_test_config(output_dir: &Path, probe_before_download: bool) -> Config {
    Config {
        http: HttpConfig {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            ..HttpConfig::default()
        },
        output: OutputConfig {
            directory: output_dir.to_path_buf(),
            file_extension: "mp3".to_string(),
            probe_before_download,
        },
        ..Config::default()
    }
}

fn registry_of(pairs: &[(&str, String)]) -> LinkRegistry {
    pairs
        .iter()
        .map(|(title, url)| (title.to_string(), url.clone()))
        .collect()
}

fn client() -> reqwest::Client {
    build_http_client(&HttpConfig::default()).expect("Failed to build client")
}

async fn mount_head(server: &MockServer, route: &str, length: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-length", length.to_string().as_str()),
        )
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_and_extract_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/site/page.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><body>
                    <div class="prch-title">Sermon One</div>
                    <a href="audio/one.mp3">mp3</a>
                    <div class="prch-title">Sermon Two</div>
                    <a href="{}/cdn/two.mp3">mp3</a>
                    <div class="prch-title">Video Only</div>
                    </body></html>"#,
                    base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(create_test_config(dir.path(), false)).unwrap();
    let registry = harvester
        .fetch_registry(&format!("{}/site/page.html", base_url))
        .await
        .expect("Failed to fetch registry");

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.get("Sermon_One"),
        Some(format!("{}/site/audio/one.mp3", base_url).as_str())
    );
    assert_eq!(
        registry.get("Sermon_Two"),
        Some(format!("{}/cdn/two.mp3", base_url).as_str())
    );
    assert!(registry.get("Video_Only").is_none());
}

#[tokio::test]
async fn test_page_fetch_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(create_test_config(dir.path(), false)).unwrap();
    let result = harvester
        .fetch_registry(&format!("{}/missing.html", mock_server.uri()))
        .await;

    match result {
        Err(HarvestError::Fetch { status, .. }) => assert_eq!(status, 404),
        other => panic!("Expected fetch error, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_refetch_produces_identical_registry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <p class="prch-title">A</p><a href="a.mp3">a</a>
            <p class="prch-title">B</p><a href="b.mp3">b</a>
            </body></html>"#,
        ))
        .expect(2)
        .mount(&mock_server)
        .await;

    let page_url = format!("{}/page.html", mock_server.uri());
    let extractor = LinkExtractor::default();

    let first = fetch_page(&client(), &page_url).await.unwrap();
    let first = extractor.extract_page(&first).unwrap();
    let second = fetch_page(&client(), &page_url).await.unwrap();
    let second = extractor.extract_page(&second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_size_probe_totals_content_lengths() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_head(&mock_server, "/1.mp3", MIB).await;
    mount_head(&mock_server, "/2.mp3", 2 * MIB).await;
    mount_head(&mock_server, "/3.mp3", 3 * MIB).await;

    let registry = registry_of(&[
        ("One", format!("{}/1.mp3", base_url)),
        ("Two", format!("{}/2.mp3", base_url)),
        ("Three", format!("{}/3.mp3", base_url)),
    ]);

    let mut events: Vec<ProgressEvent> = Vec::new();
    let total_gib = SizeProbe::new(client()).run(&registry, &mut events).await;

    assert!((total_gib - 0.005859375).abs() < 1e-9);

    let totals: Vec<(usize, u64)> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::ProbeProgress { index, total_bytes } => Some((*index, *total_bytes)),
            _ => None,
        })
        .collect();

    assert_eq!(totals, vec![(1, MIB), (2, 3 * MIB), (3, 6 * MIB)]);
    assert!(totals.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[tokio::test]
async fn test_size_probe_continues_past_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_head(&mock_server, "/ok.mp3", 2 * MIB).await;

    Mock::given(method("HEAD"))
        .and(path("/gone.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/nolength.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let registry = registry_of(&[
        ("Gone", format!("{}/gone.mp3", base_url)),
        ("NoLength", format!("{}/nolength.mp3", base_url)),
        ("Ok", format!("{}/ok.mp3", base_url)),
    ]);

    let mut events: Vec<ProgressEvent> = Vec::new();
    let total_bytes = SizeProbe::new(client())
        .run_bytes(&registry, &mut events)
        .await;

    assert_eq!(total_bytes, 2 * MIB);

    let progress_count = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::ProbeProgress { .. }))
        .count();
    assert_eq!(progress_count, 3);

    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::ProbeFailed { index: 1, .. })));
}

#[tokio::test]
async fn test_size_probe_empty_registry_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut events: Vec<ProgressEvent> = Vec::new();
    let total = SizeProbe::new(client())
        .run(&LinkRegistry::new(), &mut events)
        .await;

    assert_eq!(total, 0.0);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_retriever_isolates_failed_item() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(&mock_server, "/a.mp3", b"first track").await;
    mount_get(&mock_server, "/c.mp3", b"third track").await;

    Mock::given(method("GET"))
        .and(path("/b.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let registry = registry_of(&[
        ("Track_A", format!("{}/a.mp3", base_url)),
        ("Track_B", format!("{}/b.mp3", base_url)),
        ("Track_C", format!("{}/c.mp3", base_url)),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), false);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = Retriever::new(client(), &config.output)
        .run(&registry, &mut events)
        .await;

    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].0, "Track_B");
    assert!(matches!(failures[0].2, ItemError::Status(500)));

    assert_eq!(
        std::fs::read(dir.path().join("Track_A.mp3")).unwrap(),
        b"first track"
    );
    assert_eq!(
        std::fs::read(dir.path().join("Track_C.mp3")).unwrap(),
        b"third track"
    );
    assert!(!dir.path().join("Track_B.mp3").exists());
    assert!(!dir.path().join("Track_B.mp3.part").exists());

    let failure_events = events.iter().filter(|e| e.is_failure()).count();
    assert_eq!(failure_events, 1);
}

#[tokio::test]
async fn test_retriever_isolates_failed_item_with_size_lookup() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_head(&mock_server, "/a.mp3", 11).await;
    mount_get(&mock_server, "/a.mp3", b"first track").await;
    mount_head(&mock_server, "/c.mp3", 11).await;
    mount_get(&mock_server, "/c.mp3", b"third track").await;

    Mock::given(method("HEAD"))
        .and(path("/b.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let registry = registry_of(&[
        ("Track_A", format!("{}/a.mp3", base_url)),
        ("Track_B", format!("{}/b.mp3", base_url)),
        ("Track_C", format!("{}/c.mp3", base_url)),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), true);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = Retriever::new(client(), &config.output)
        .run(&registry, &mut events)
        .await;

    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(dir.path().join("Track_A.mp3").exists());
    assert!(dir.path().join("Track_C.mp3").exists());
    assert!(!dir.path().join("Track_B.mp3").exists());

    // The failed size lookup for Track_B is a notice, not a second failure.
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::SizeUnknown { title, .. } if title == "Track_B")));
    let failure_events: Vec<_> = events.iter().filter(|e| e.is_failure()).collect();
    assert_eq!(failure_events.len(), 1);
    assert!(matches!(
        failure_events[0],
        ProgressEvent::DownloadFailed { title, .. } if title == "Track_B"
    ));
}

#[tokio::test]
async fn test_every_request_carries_browser_user_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/site/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <div class="prch-title">Only Track</div><a href="only.mp3">mp3</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    mount_head(&mock_server, "/site/only.mp3", 5).await;
    mount_get(&mock_server, "/site/only.mp3", b"audio").await;

    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(create_test_config(dir.path(), true)).unwrap();
    let registry = harvester
        .fetch_registry(&format!("{}/site/page.html", base_url))
        .await
        .unwrap();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = harvester.download_all(&registry, &mut events).await;
    assert_eq!(report.saved_count(), 1);

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled by default");

    let seen: Vec<(String, String)> = requests
        .iter()
        .map(|request| (request.method.to_string(), request.url.path().to_string()))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("GET".to_string(), "/site/page.html".to_string()),
            ("HEAD".to_string(), "/site/only.mp3".to_string()),
            ("GET".to_string(), "/site/only.mp3".to_string()),
        ]
    );

    for request in &requests {
        // The mock server splits header values on commas; rejoin them.
        let user_agent = request
            .headers
            .iter()
            .find(|(name, _)| name.as_str().eq_ignore_ascii_case("user-agent"))
            .map(|(_, values)| {
                values
                    .iter()
                    .map(|value| value.as_str().trim())
                    .collect::<Vec<_>>()
                    .join(", ")
            });

        assert_eq!(
            user_agent.as_deref(),
            Some(DEFAULT_USER_AGENT),
            "{} {}",
            request.method,
            request.url
        );
    }
}

#[tokio::test]
async fn test_retriever_overwrites_existing_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(&mock_server, "/new.mp3", b"new content").await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Song.mp3"), b"old content that is longer").unwrap();

    let registry = registry_of(&[("Song", format!("{}/new.mp3", base_url))]);
    let config = create_test_config(dir.path(), false);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = Retriever::new(client(), &config.output)
        .run(&registry, &mut events)
        .await;

    assert_eq!(report.saved_count(), 1);
    assert_eq!(
        std::fs::read(dir.path().join("Song.mp3")).unwrap(),
        b"new content"
    );
}

#[tokio::test]
async fn test_retriever_size_lookup_failure_does_not_block_download() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/track.mp3"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_get(&mock_server, "/track.mp3", b"audio").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), true);
    let registry = registry_of(&[("Track", format!("{}/track.mp3", base_url))]);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = Retriever::new(client(), &config.output)
        .run(&registry, &mut events)
        .await;

    assert_eq!(report.saved_count(), 1);
    assert!(matches!(events[0], ProgressEvent::SizeUnknown { .. }));
    assert!(matches!(events[1], ProgressEvent::Saved { bytes: 5, .. }));
}

#[tokio::test]
async fn test_retriever_reports_size_before_download() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_head(&mock_server, "/sized.mp3", 4).await;
    mount_get(&mock_server, "/sized.mp3", b"four").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(dir.path(), true);
    let registry = registry_of(&[("Sized", format!("{}/sized.mp3", base_url))]);
    let mut events: Vec<ProgressEvent> = Vec::new();
    Retriever::new(client(), &config.output)
        .run(&registry, &mut events)
        .await;

    assert_eq!(
        events[0],
        ProgressEvent::SizeKnown {
            title: "Sized".to_string(),
            bytes: 4
        }
    );
}

#[tokio::test]
async fn test_stop_signal_halts_before_next_item() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(create_test_config(dir.path(), false)).unwrap();
    harvester.stop_signal().request_stop();

    let registry = registry_of(&[
        ("One", format!("{}/1.mp3", base_url)),
        ("Two", format!("{}/2.mp3", base_url)),
    ]);
    let mut events: Vec<ProgressEvent> = Vec::new();
    let report = harvester.download_all(&registry, &mut events).await;

    assert!(report.stopped);
    assert!(report.outcomes.is_empty());
    assert_eq!(
        events,
        vec![ProgressEvent::Stopped {
            completed: 0,
            remaining: 2
        }]
    );
}

#[tokio::test]
async fn test_full_session_size_then_download() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sermons/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><table>
            <tr><td class="prch-title"> Faith  and Works </td><td><a href="files/fw.mp3">MP3</a></td></tr>
            <tr><td class="prch-title">Grace</td><td><a href="files/grace.mp3">MP3</a></td></tr>
            </table></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    mount_head(&mock_server, "/sermons/files/fw.mp3", 3).await;
    mount_head(&mock_server, "/sermons/files/grace.mp3", 5).await;
    mount_get(&mock_server, "/sermons/files/fw.mp3", b"abc").await;
    mount_get(&mock_server, "/sermons/files/grace.mp3", b"grace").await;

    let dir = tempfile::tempdir().unwrap();
    let harvester = Harvester::new(create_test_config(dir.path(), false)).unwrap();
    let registry = harvester
        .fetch_registry(&format!("{}/sermons/index.html", base_url))
        .await
        .unwrap();

    assert_eq!(
        registry.titles().collect::<Vec<_>>(),
        vec!["Faith_and_Works", "Grace"]
    );

    let mut events: Vec<ProgressEvent> = Vec::new();
    let total_bytes = SizeProbe::new(client())
        .run_bytes(&registry, &mut events)
        .await;
    assert_eq!(total_bytes, 8);

    let report = harvester.download_all(&registry, &mut events).await;
    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.bytes_written(), 8);

    for (_, outcome) in &report.outcomes {
        match outcome {
            RetrievalOutcome::Saved { path, .. } => assert!(path.exists()),
            RetrievalOutcome::Failed { url, error } => panic!("{} failed: {}", url, error),
        }
    }
}
