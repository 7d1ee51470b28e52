//! Integration tests for the file watcher
//!
//! These tests use temporary directories and real filesystem operations
//! to validate the watcher's behavior in realistic scenarios.

use gav_watcher::{FileChange, FileWatcher, WatcherConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

const GATEWAY: &str = "kind: Gateway\nmetadata: { name: gw }\n";

/// Helper to create a test file
async fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, content).await.unwrap();
    path
}

async fn start(dir: &TempDir, config: WatcherConfig) -> (FileWatcher, tokio::sync::mpsc::Receiver<FileChange>) {
    let mut watcher = FileWatcher::new(config).unwrap();
    let events = watcher.watch(dir.path()).await.unwrap();

    // Wait a bit for watcher to stabilize
    tokio::time::sleep(Duration::from_millis(100)).await;
    (watcher, events)
}

#[tokio::test]
async fn test_file_creation_detection() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(50).build()).await;

    let test_file = create_test_file(&temp_dir, "gateway.yaml", GATEWAY).await;

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(event, FileChange::Created(test_file));
}

#[tokio::test]
async fn test_file_modification_detection() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(&temp_dir, "gateway.yaml", GATEWAY).await;
    let (_watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(50).build()).await;

    tokio::fs::write(&test_file, "kind: Gateway\nmetadata: { name: gw2 }\n")
        .await
        .unwrap();

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(event, FileChange::Modified(test_file));
}

#[tokio::test]
async fn test_file_deletion_detection() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(&temp_dir, "gateway.yaml", GATEWAY).await;
    let (_watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(50).build()).await;

    tokio::fs::remove_file(&test_file).await.unwrap();

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(event, FileChange::Deleted(test_file));
}

#[tokio::test]
async fn test_debouncing() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = create_test_file(&temp_dir, "routes.yaml", "").await;
    let (_watcher, mut events) = start(
        &temp_dir,
        WatcherConfig::builder().debounce_ms(200).build(),
    )
    .await;

    // Rapid modifications
    for i in 0..5 {
        tokio::fs::write(&test_file, format!("# revision {i}\n"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(event, FileChange::Modified(_)));

    let result = timeout(Duration::from_millis(500), events.recv()).await;
    assert!(result.is_err(), "Received unexpected additional event");
}

#[tokio::test]
async fn test_ignore_patterns_and_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut events) = start(
        &temp_dir,
        WatcherConfig::builder()
            .debounce_ms(50)
            .add_ignore_pattern("draft-*".to_string())
            .build(),
    )
    .await;

    create_test_file(&temp_dir, "service.yml", "kind: Service\n").await;
    create_test_file(&temp_dir, "draft-route.yaml", "kind: HTTPRoute\n").await;
    create_test_file(&temp_dir, "notes.md", "# notes").await;
    create_test_file(&temp_dir, ".service.yml.swp", "swap").await;

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(event.path().ends_with("service.yml"), "got {event}");

    let result = timeout(Duration::from_millis(500), events.recv()).await;
    assert!(result.is_err(), "Received event for ignored file");
}

#[tokio::test]
async fn test_non_recursive_skips_subdirectories() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("team-a");
    tokio::fs::create_dir_all(&sub_dir).await.unwrap();

    let (_watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(50).build()).await;

    tokio::fs::write(sub_dir.join("svc.yaml"), "kind: Service\n")
        .await
        .unwrap();

    let result = timeout(Duration::from_millis(500), events.recv()).await;
    assert!(result.is_err(), "Received event from nested directory");
}

#[tokio::test]
async fn test_recursive_watching() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("team-a").join("routes");
    tokio::fs::create_dir_all(&sub_dir).await.unwrap();

    let (_watcher, mut events) = start(
        &temp_dir,
        WatcherConfig::builder().debounce_ms(50).recursive(true).build(),
    )
    .await;

    let nested_file = sub_dir.join("r1.yaml");
    tokio::fs::write(&nested_file, "kind: HTTPRoute\n").await.unwrap();

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, FileChange::Created(nested_file));
}

#[tokio::test]
async fn test_concurrent_modifications() {
    let temp_dir = TempDir::new().unwrap();
    let (_watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(100).build()).await;

    let mut handles = vec![];
    for i in 0..5 {
        let dir = temp_dir.path().to_path_buf();
        handles.push(tokio::spawn(async move {
            let path = dir.join(format!("svc{i}.yaml"));
            tokio::fs::write(&path, format!("kind: Service\nmetadata: {{ name: svc{i} }}\n"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut received_files = std::collections::HashSet::new();
    for _ in 0..5 {
        if let Ok(Some(FileChange::Created(path))) =
            timeout(Duration::from_secs(3), events.recv()).await
        {
            received_files.insert(path.file_name().unwrap().to_str().unwrap().to_string());
        }
    }

    assert_eq!(received_files.len(), 5, "Should receive events for all 5 files");
}

#[tokio::test]
async fn test_stop_closes_stream() {
    let temp_dir = TempDir::new().unwrap();
    let (mut watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(50).build()).await;

    watcher.stop().await.unwrap();

    let next = timeout(Duration::from_secs(2), events.recv()).await.unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn test_stop_delivers_pending_changes() {
    let temp_dir = TempDir::new().unwrap();
    let (mut watcher, mut events) =
        start(&temp_dir, WatcherConfig::builder().debounce_ms(5_000).build()).await;

    let test_file = create_test_file(&temp_dir, "gateway.yaml", GATEWAY).await;
    // Let the change reach the debouncer, well inside the window
    tokio::time::sleep(Duration::from_millis(300)).await;

    watcher.stop().await.unwrap();

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("pending change was not flushed on stop")
        .unwrap();
    assert_eq!(event, FileChange::Created(test_file));
}
