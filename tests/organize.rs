//! Organizer Integration Tests
//!
//! End-to-end organizing against a temporary watch root, with the external
//! classifier replaced by a scripted client.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use autosort::{
    CategoryTable, Classifier, ClassifierError, CompletionClient, OrganizeOutcome, Organizer,
};
use tempfile::TempDir;
use tokio::fs;
use tokio::sync::oneshot;

/// Completion client with a fixed answer and a call counter
struct MockClient {
    answer: Option<&'static str>,
    calls: AtomicUsize,
}

impl MockClient {
    fn answering(answer: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Some(answer) => Ok(answer.to_string()),
            None => Err(ClassifierError::Api {
                status: 429,
                body: "quota exceeded".to_string(),
            }),
        }
    }
}

/// Completion client that requests shutdown on its first call
struct StoppingClient {
    stop: Mutex<Option<oneshot::Sender<()>>>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for StoppingClient {
    fn name(&self) -> &str {
        "stopping"
    }

    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stop) = self.stop.lock().unwrap().take() {
            let _ = stop.send(());
        }
        Ok("Notes".to_string())
    }
}

fn organizer(root: &Path, client: Arc<MockClient>) -> Organizer {
    Organizer::new(root, Classifier::new(CategoryTable::builtin(), Some(client)))
}

/// Regular files sitting directly in `dir`
async fn root_files(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        if entry.file_type().await.unwrap().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
}

#[tokio::test]
async fn test_photo_moves_to_images() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("photo.jpg"), b"\xFF\xD8\xFFjpeg bytes").await.unwrap();

    let client = MockClient::answering("Documents");
    let outcome = organizer(root, client.clone())
        .organize_file(&root.join("photo.jpg"))
        .await
        .unwrap();

    assert!(outcome.is_moved());
    assert!(!root.join("photo.jpg").exists());
    assert_eq!(
        fs::read(root.join("Images/photo.jpg")).await.unwrap(),
        b"\xFF\xD8\xFFjpeg bytes"
    );
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_collision_gets_numeric_suffix() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("Documents")).await.unwrap();
    fs::write(root.join("Documents/report.docx"), "old report").await.unwrap();
    fs::write(root.join("report.docx"), "new report").await.unwrap();

    let outcome = organizer(root, MockClient::failing())
        .organize_file(&root.join("report.docx"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        OrganizeOutcome::Moved {
            file_name: "report.docx".to_string(),
            category: "Documents".to_string(),
            destination: root.join("Documents/report_1.docx"),
        }
    );
    assert_eq!(
        fs::read_to_string(root.join("Documents/report.docx")).await.unwrap(),
        "old report"
    );
    assert_eq!(
        fs::read_to_string(root.join("Documents/report_1.docx")).await.unwrap(),
        "new report"
    );
}

#[tokio::test]
async fn test_repeated_duplicates_stay_distinct() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let org = organizer(root, MockClient::failing());

    for round in 0..4 {
        fs::write(root.join("foo.txt"), format!("round {}", round)).await.unwrap();
        org.organize_file(&root.join("foo.txt")).await.unwrap();
    }

    let names: HashSet<String> = root_files(&root.join("Documents")).await.into_iter().collect();
    let expected: HashSet<String> = ["foo.txt", "foo_1.txt", "foo_2.txt", "foo_3.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);
    assert_eq!(
        fs::read_to_string(root.join("Documents/foo_3.txt")).await.unwrap(),
        "round 3"
    );
}

#[tokio::test]
async fn test_unknown_extension_uses_classifier() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("mystery.xyz"), "???").await.unwrap();

    let client = MockClient::answering("Spreadsheets");
    organizer(root, client.clone())
        .organize_file(&root.join("mystery.xyz"))
        .await
        .unwrap();

    assert!(root.join("Spreadsheets/mystery.xyz").exists());
    assert!(!root.join("mystery.xyz").exists());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_classifier_error_goes_to_other() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("mystery.xyz"), "???").await.unwrap();

    let client = MockClient::failing();
    organizer(root, client.clone())
        .organize_file(&root.join("mystery.xyz"))
        .await
        .unwrap();

    assert!(root.join("Other/mystery.xyz").exists());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_invalid_answer_goes_to_other() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("mystery.xyz"), "???").await.unwrap();

    organizer(root, MockClient::answering("Probably a spreadsheet?"))
        .organize_file(&root.join("mystery.xyz"))
        .await
        .unwrap();

    assert!(root.join("Other/mystery.xyz").exists());
}

#[tokio::test]
async fn test_sweep_organizes_every_visible_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("photo.png"), "png").await.unwrap();
    fs::write(root.join("song.flac"), "flac").await.unwrap();
    fs::write(root.join("deck.pptx"), "pptx").await.unwrap();
    fs::write(root.join("blob.qqq"), "?").await.unwrap();
    fs::write(root.join(".hidden.jpg"), "hidden").await.unwrap();
    fs::create_dir(root.join("Images")).await.unwrap();
    fs::create_dir(root.join("projects.zip")).await.unwrap();
    fs::write(root.join("projects.zip/inner.txt"), "nested").await.unwrap();

    let client = MockClient::answering("Temporary");
    let report = organizer(root, client.clone())
        .organize_existing_files()
        .await
        .unwrap();

    assert_eq!(report.found, 4);
    assert_eq!(report.moved, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(client.calls(), 1);

    // Only the hidden file stays at the root
    assert_eq!(root_files(root).await, vec![".hidden.jpg".to_string()]);

    assert!(root.join("Images/photo.png").exists());
    assert!(root.join("Audio/song.flac").exists());
    assert!(root.join("Presentations/deck.pptx").exists());
    assert!(root.join("Temporary/blob.qqq").exists());

    // Subdirectories are neither moved nor traversed
    assert!(root.join("projects.zip/inner.txt").exists());
    assert!(!root.join("Archives").exists());
}

#[tokio::test]
async fn test_sweep_of_empty_root() {
    let temp = TempDir::new().unwrap();

    let report = organizer(temp.path(), MockClient::failing())
        .organize_existing_files()
        .await
        .unwrap();

    assert_eq!(report.found, 0);
    assert_eq!(report.moved, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_sweep_continues_after_failed_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("notes.txt"), "notes").await.unwrap();
    fs::write(root.join("photo.png"), "png").await.unwrap();
    fs::write(root.join("song.mp3"), "mp3").await.unwrap();
    // Dangling link on the Documents name: not swept, and blocks the folder
    std::os::unix::fs::symlink(root.join("nowhere"), root.join("Documents")).unwrap();

    let report = organizer(root, MockClient::failing())
        .organize_existing_files()
        .await
        .unwrap();

    assert_eq!(report.found, 3);
    assert_eq!(report.moved, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.interrupted);

    assert!(root.join("notes.txt").exists());
    assert!(root.join("Images/photo.png").exists());
    assert!(root.join("Audio/song.mp3").exists());
}

#[tokio::test]
async fn test_shutdown_during_sweep_finishes_current_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("first.qqq"), "1").await.unwrap();
    fs::write(root.join("second.qqq"), "2").await.unwrap();

    let (stop_tx, stop_rx) = oneshot::channel();
    let client = Arc::new(StoppingClient {
        stop: Mutex::new(Some(stop_tx)),
        calls: AtomicUsize::new(0),
    });
    let org = Organizer::new(root, Classifier::new(CategoryTable::builtin(), Some(client.clone())));

    let report = org
        .organize_existing_files_until(async {
            let _ = stop_rx.await;
        })
        .await
        .unwrap();

    assert_eq!(report.found, 2);
    assert_eq!(report.moved, 1);
    assert!(report.interrupted);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    // The file being classified when shutdown arrived still landed
    assert_eq!(root_files(&root.join("Notes")).await.len(), 1);
    assert_eq!(root_files(root).await.len(), 1);
}
