use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use taskflow::models::{Repeat, Snapshot, SortBy, Theme, GENERAL_PROJECT};
use taskflow::session::{Session, TaskDraft};
use taskflow::storage::{self, export_to, import_from, parse_snapshot};

// Tests that touch TASKFLOW_DB must not run concurrently.
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn temp_file(name: &str) -> PathBuf {
    let mut p = env::temp_dir();
    p.push(format!("taskflow_storage_{}_{}.json", name, std::process::id()));
    if p.exists() {
        fs::remove_file(&p).unwrap();
    }
    p
}

const LEGACY: &str = r##"{
  "tasks": [
    {
      "id": "0b8f2a3c-1111-4a4a-9c9c-000000000001",
      "title": "Stretch",
      "notes": "",
      "date": "2024-01-01",
      "start": "07:00",
      "end": "07:15",
      "repeat": "custom",
      "weekdays": [1, 3, 5],
      "color": "#3B82F6",
      "completedDates": ["2024-01-01", "2024-01-03"]
    },
    {
      "id": "0b8f2a3c-1111-4a4a-9c9c-000000000002",
      "title": "Pay rent",
      "date": "2024-01-31",
      "start": "09:00",
      "end": "09:30",
      "repeat": "monthly",
      "weekdays": [],
      "color": "#f00",
      "completedDates": []
    }
  ],
  "settings": { "theme": "dark", "fontSize": 18, "lowColor": "#ef4444", "highColor": "#22c55e" }
}"##;

#[test]
fn test_legacy_snapshot_fills_defaults() {
    let snapshot = parse_snapshot(LEGACY).unwrap();
    assert_eq!(snapshot.projects, vec![GENERAL_PROJECT.to_string()]);
    assert_eq!(snapshot.settings.theme, Theme::Dark);
    assert_eq!(snapshot.settings.font_size, 18);
    assert_eq!(snapshot.settings.sort_by, SortBy::Start);
    assert!(snapshot.settings.show_swatches);

    let stretch = &snapshot.tasks[0];
    assert_eq!(stretch.project, GENERAL_PROJECT);
    assert_eq!(stretch.repeat, Repeat::Custom([1, 3, 5].into_iter().collect()));
    assert_eq!(stretch.color.as_str(), "#3b82f6");
    assert!(!stretch.all_day);
    assert!(!stretch.pinned);
    assert_eq!(stretch.completed_dates.len(), 2);

    let rent = &snapshot.tasks[1];
    assert_eq!(rent.repeat, Repeat::Monthly);
    assert_eq!(rent.color.as_str(), "#ff0000");
    assert_eq!(rent.notes, "");
}

#[test]
fn test_snapshot_wire_format() {
    let snapshot = parse_snapshot(LEGACY).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    let task = &json["tasks"][0];
    assert_eq!(task["repeat"], "custom");
    assert_eq!(task["weekdays"], serde_json::json!([1, 3, 5]));
    assert_eq!(task["completedDates"], serde_json::json!(["2024-01-01", "2024-01-03"]));
    assert_eq!(task["allDay"], false);
    assert_eq!(task["start"], "07:00");
    assert_eq!(json["settings"]["lowColor"], "#ef4444");
    assert_eq!(json["projects"], serde_json::json!(["General"]));

    let reparsed = parse_snapshot(&json.to_string()).unwrap();
    assert_eq!(reparsed, snapshot);
}

#[test]
fn test_malformed_snapshots_are_rejected() {
    assert!(parse_snapshot("not json").is_err());
    assert!(parse_snapshot("[]").is_err());
    assert!(parse_snapshot("42").is_err());
    // Unknown repeat kind.
    assert!(parse_snapshot(r#"{"tasks":[{"id":"x","title":"t","date":"2024-01-01","repeat":"hourly"}]}"#).is_err());
    // Weekday out of range.
    assert!(parse_snapshot(
        r#"{"tasks":[{"id":"x","title":"t","date":"2024-01-01","repeat":"custom","weekdays":[7]}]}"#
    )
    .is_err());
    // Bad date and bad color.
    assert!(parse_snapshot(r#"{"tasks":[{"id":"x","title":"t","date":"01/02/2024"}]}"#).is_err());
    assert!(parse_snapshot(r#"{"tasks":[{"id":"x","title":"t","date":"2024-01-01","color":"blue"}]}"#).is_err());
    // An empty object is a valid, empty snapshot.
    assert_eq!(parse_snapshot("{}").unwrap(), Snapshot::default());
}

#[test]
fn test_export_then_import() {
    let mut session = Session::new();
    let mut draft = TaskDraft::new("Journal", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    draft.repeat = Repeat::Daily;
    let id = session.add_task(draft).unwrap().id.clone();
    session.toggle_completion(&id, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).unwrap();

    let path = temp_file("export");
    export_to(&path, &session.snapshot()).unwrap();
    let imported = import_from(&path).unwrap();
    assert_eq!(imported, session.snapshot());
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_import_of_bad_file_fails() {
    let path = temp_file("bad_import");
    fs::write(&path, "{ \"tasks\": [ { \"title\": ").unwrap();
    assert!(import_from(&path).is_err());
    fs::remove_file(&path).unwrap();

    assert!(import_from(&temp_file("missing")).is_err());
}

#[test]
fn test_load_and_save() {
    let _guard = TEST_MUTEX.lock().unwrap();
    let path = temp_file("db");
    env::set_var("TASKFLOW_DB", &path);

    // First run.
    assert!(storage::load().is_none());

    let mut session = Session::new();
    session.add_task(TaskDraft::new("Water plants", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())).unwrap();
    storage::save(&session.snapshot()).unwrap();
    let loaded = storage::load().unwrap();
    assert_eq!(loaded, session.snapshot());

    storage::delete_database().unwrap();
    assert!(!path.exists());
    env::remove_var("TASKFLOW_DB");
}

#[test]
fn test_unparseable_state_is_kept_aside() {
    let _guard = TEST_MUTEX.lock().unwrap();
    let path = temp_file("corrupt");
    let bad = storage::bad_path(&path);
    if bad.exists() {
        fs::remove_file(&bad).unwrap();
    }
    env::set_var("TASKFLOW_DB", &path);

    fs::write(&path, "{{{").unwrap();
    assert!(storage::load().is_none());
    assert!(!path.exists());
    assert_eq!(fs::read_to_string(&bad).unwrap(), "{{{");

    // Saving afterwards leaves the old contents alone.
    storage::save(&Snapshot::default()).unwrap();
    assert_eq!(fs::read_to_string(&bad).unwrap(), "{{{");
    assert!(storage::load().is_some());

    fs::remove_file(&bad).unwrap();
    storage::delete_database().unwrap();
    env::remove_var("TASKFLOW_DB");
}
