use std::cell::RefCell;

use chrono::NaiveDate;
use taskflow::config::SyncConfig;
use taskflow::error::SyncError;
use taskflow::models::Snapshot;
use taskflow::session::{Session, TaskDraft};
use taskflow::sync::{decode_document, pull, push, HttpRemote, RemoteStore, SyncStatus};

/// Keeps the pushed document in memory.
#[derive(Default)]
struct MemoryRemote {
    document: RefCell<Option<Snapshot>>,
}

impl RemoteStore for MemoryRemote {
    fn push(&self, snapshot: &Snapshot) -> Result<(), SyncError> {
        *self.document.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn pull(&self) -> Result<Snapshot, SyncError> {
        self.document.borrow().clone().ok_or(SyncError::Status(404))
    }
}

/// Answers every request with a server error.
struct BrokenRemote;

impl RemoteStore for BrokenRemote {
    fn push(&self, _snapshot: &Snapshot) -> Result<(), SyncError> {
        Err(SyncError::Status(500))
    }

    fn pull(&self) -> Result<Snapshot, SyncError> {
        Err(SyncError::Status(500))
    }
}

fn session_with(titles: &[&str]) -> Session {
    let mut session = Session::new();
    for title in titles {
        session
            .add_task(TaskDraft::new(*title, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
            .unwrap();
    }
    session
}

#[test]
fn test_push_then_pull_replaces_local_state() {
    let remote = MemoryRemote::default();
    let source = session_with(&["Water plants", "Call mom"]);
    assert_eq!(push(&source, &remote), SyncStatus::Pushed { tasks: 2 });

    let mut other = session_with(&["Local only"]);
    let status = pull(&mut other, &remote);
    assert_eq!(status, SyncStatus::Pulled { tasks: 2 });
    assert!(status.is_ok());
    assert_eq!(other.snapshot(), source.snapshot());
}

#[test]
fn test_failed_pull_keeps_session() {
    let mut session = session_with(&["Keep"]);
    let before = session.snapshot();

    let status = pull(&mut session, &BrokenRemote);
    assert!(!status.is_ok());
    assert_eq!(session.snapshot(), before);

    let status = pull(&mut session, &MemoryRemote::default());
    assert!(matches!(status, SyncStatus::Failed(_)));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_failed_push_reports_status() {
    let status = push(&session_with(&["A"]), &BrokenRemote);
    assert!(!status.is_ok());
    assert!(status.to_string().starts_with("Sync failed"));
}

#[test]
fn test_decode_document() {
    let bare = r#"{"tasks":[],"settings":{"theme":"dark"}}"#;
    let snapshot = decode_document(bare).unwrap();
    assert!(snapshot.tasks.is_empty());

    let wrapped = r#"{"record":{"tasks":[{"id":"1","title":"Read","date":"2024-01-01"}]},"metadata":{"id":"abc"}}"#;
    let snapshot = decode_document(wrapped).unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].title, "Read");

    assert!(matches!(decode_document(r#"{"record":[1,2]}"#), Err(SyncError::Malformed(_))));
    assert!(matches!(decode_document("\"text\""), Err(SyncError::Malformed(_))));
    assert!(decode_document("<html>").is_err());
}

#[test]
fn test_http_remote_requires_credentials() {
    let mut config = SyncConfig::default();
    assert!(matches!(HttpRemote::from_config(&config), Err(SyncError::NotConfigured(_))));

    config.token = Some("secret".to_string());
    assert!(matches!(HttpRemote::from_config(&config), Err(SyncError::NotConfigured(_))));

    config.document_id = Some("   ".to_string());
    assert!(matches!(HttpRemote::from_config(&config), Err(SyncError::NotConfigured(_))));

    config.document_id = Some("abc123".to_string());
    assert!(HttpRemote::from_config(&config).is_ok());
}
