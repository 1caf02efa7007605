//! Integration tests for the driver's public operations.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::sync::{Arc, Mutex};

use docstore::{Driver, DriverOptions, ErrorKind, LogLevel, Logger, NoopLogger, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    state: String,
    country: String,
    pincode: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct User {
    name: String,
    age: u32,
    contact: String,
    company: String,
    address: Address,
}

fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        age: 42,
        contact: format!("{}@example.com", name.to_lowercase()),
        company: name.to_string(),
        address: Address {
            city: "Earth".to_string(),
            state: "USA".to_string(),
            country: "USA".to_string(),
            pincode: 1234,
        },
    }
}

fn open(dir: &std::path::Path) -> Driver {
    Driver::with_options(dir, DriverOptions::new().with_logger(Arc::new(NoopLogger))).unwrap()
}

/// Logger that records every message with its level.
#[derive(Default)]
struct RecordingLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    fn push(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push((level, args.to_string()));
    }

    fn messages(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Fatal, args);
    }
    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Error, args);
    }
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Warn, args);
    }
    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Info, args);
    }
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Debug, args);
    }
    fn trace(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Trace, args);
    }
}

#[test]
fn test_new_creates_missing_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("nested/store");

    let db = open(&root);

    assert!(root.is_dir());
    assert_eq!(db.root(), root.as_path());
}

#[test]
fn test_new_uses_existing_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), "untouched").unwrap();

    let db = open(dir.path());

    assert_eq!(db.root(), dir.path());
    assert_eq!(
        fs::read_to_string(dir.path().join("keep.txt")).unwrap(),
        "untouched"
    );
}

#[test]
fn test_new_fails_when_root_is_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("occupied");
    fs::write(&file, "x").unwrap();

    let err = Driver::new(&file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_custom_logger_receives_messages() {
    let dir = tempdir().unwrap();
    let logger = Arc::new(RecordingLogger::default());
    let opts = DriverOptions::new().with_logger(logger.clone());

    let db = Driver::with_options(dir.path().join("fresh"), opts).unwrap();
    db.write("employee", "acme", &json!({ "Name": "Acme" })).unwrap();

    let messages = logger.messages();
    assert!(messages
        .iter()
        .any(|(level, msg)| *level == LogLevel::Debug && msg.starts_with("creating directory")));
    assert!(messages
        .iter()
        .any(|(level, msg)| *level == LogLevel::Debug && msg.contains("wrote employee/acme")));
}

#[test]
fn test_write_read_roundtrip() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let spacex = user("SpaceX");
    db.write("employee", "SpaceX", &spacex).unwrap();
    let loaded: User = db.read("employee", "SpaceX").unwrap();

    assert_eq!(spacex, loaded);
}

#[test]
fn test_write_layout_and_format() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    db.write("employee", "acme", &json!({ "Name": "Acme" })).unwrap();

    let path = dir.path().join("employee/acme.json");
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "{\n\t\"Name\": \"Acme\"\n}\n");
}

#[test]
fn test_write_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    let value = user("Tesla");

    db.write("employee", "Tesla", &value).unwrap();
    let first = fs::read(dir.path().join("employee/Tesla.json")).unwrap();
    db.write("employee", "Tesla", &value).unwrap();
    let second = fs::read(dir.path().join("employee/Tesla.json")).unwrap();

    assert_eq!(first, second);
    assert!(!dir.path().join("employee/Tesla.json.tmp").exists());
    assert_eq!(fs::read_dir(dir.path().join("employee")).unwrap().count(), 1);
}

#[test]
fn test_write_replaces_prior_content() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    db.write("employee", "acme", &json!({ "Age": "10" })).unwrap();
    db.write("employee", "acme", &json!({ "Age": "11" })).unwrap();

    let loaded: serde_json::Value = db.read("employee", "acme").unwrap();
    assert_eq!(loaded, json!({ "Age": "11" }));
}

#[test]
fn test_write_unserializable_value() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    // JSON object keys must be strings
    let mut bad: HashMap<(u8, u8), &str> = HashMap::new();
    bad.insert((1, 2), "x");

    let err = db.write("employee", "bad", &bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert!(!dir.path().join("employee/bad.json").exists());
    assert!(!dir.path().join("employee/bad.json.tmp").exists());
}

#[test]
fn test_failed_write_keeps_previous_version() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "v": 1 })).unwrap();

    // A directory squatting on the temp path makes the temp write fail.
    fs::create_dir(dir.path().join("employee/acme.json.tmp")).unwrap();

    let err = db.write("employee", "acme", &json!({ "v": 2 })).unwrap_err();
    assert!(matches!(err, StoreError::WriteError { .. }));

    let loaded: serde_json::Value = db.read("employee", "acme").unwrap();
    assert_eq!(loaded, json!({ "v": 1 }));
}

#[test]
fn test_failed_commit_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    // A non-empty directory at the resource path makes the rename fail.
    fs::create_dir_all(dir.path().join("employee/acme.json/sub")).unwrap();

    let err = db.write("employee", "acme", &json!({ "v": 1 })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!dir.path().join("employee/acme.json.tmp").exists());
}

#[test]
fn test_empty_identifiers_are_invalid() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let cases = [
        db.write("", "acme", &1).unwrap_err(),
        db.write("employee", "", &1).unwrap_err(),
        db.read::<i32>("", "acme").unwrap_err(),
        db.read::<i32>("employee", "").unwrap_err(),
        db.read_all("").unwrap_err(),
        db.delete("", "acme").unwrap_err(),
        db.delete("employee", "").unwrap_err(),
    ];

    for err in cases {
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", err);
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_read_missing_resource() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let err = db.read::<User>("employee", "nobody").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    db.write("employee", "acme", &user("Acme")).unwrap();
    let err = db.read::<User>("employee", "nobody").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_read_does_not_create_collection() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let _ = db.read::<User>("ghost", "acme");
    let _ = db.read_all("ghost");

    assert!(!dir.path().join("ghost").exists());
}

#[test]
fn test_read_corrupt_resource() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    fs::create_dir(dir.path().join("employee")).unwrap();
    fs::write(dir.path().join("employee/broken.json"), "{ \"Name\": ").unwrap();

    let err = db.read::<User>("employee", "broken").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoding);
}

#[test]
fn test_read_wrong_shape() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "Name": "Acme", "Age": "10" }))
        .unwrap();

    let err = db.read::<User>("employee", "acme").unwrap_err();
    assert!(matches!(err, StoreError::DecodeError { .. }));
}

#[test]
fn test_read_all_scenario() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    let acme = json!({ "Name": "Acme", "Age": "10" });

    db.write("employee", "acme", &acme).unwrap();
    let all = db.read_all("employee").unwrap();

    assert_eq!(all.len(), 1);
    let decoded: serde_json::Value = serde_json::from_str(&all[0]).unwrap();
    assert_eq!(decoded, acme);
}

#[test]
fn test_read_all_many() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    let names = ["SpaceX", "Tesla", "Google", "Apple"];

    for name in names {
        db.write("employee", name, &user(name)).unwrap();
    }
    db.write("customer", "initech", &user("Initech")).unwrap();

    let mut users: Vec<User> = db.read_all_as("employee").unwrap();
    users.sort_by(|a, b| a.name.cmp(&b.name));

    let mut expected: Vec<User> = names.iter().map(|n| user(n)).collect();
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(users, expected);
}

#[test]
fn test_read_all_empty_collection() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    db.write("employee", "acme", &1).unwrap();
    db.delete("employee", "acme").unwrap();

    let all = db.read_all("employee").unwrap();
    assert!(all.is_empty());
}

#[test]
fn test_read_all_missing_collection() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let err = db.read_all("employee").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_read_all_skips_temp_files() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "Name": "Acme" })).unwrap();
    fs::write(dir.path().join("employee/other.json.tmp"), "{ \"half").unwrap();

    let all = db.read_all("employee").unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn test_read_all_as_decode_error() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "unexpected": true }))
        .unwrap();

    let err = db.read_all_as::<User>("employee").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoding);
}

#[test]
fn test_delete_resource() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "Name": "Acme", "Age": "10" }))
        .unwrap();

    db.delete("employee", "acme").unwrap();

    assert!(!dir.path().join("employee/acme.json").exists());
    let err = db.read::<serde_json::Value>("employee", "acme").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_missing_resource() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    let err = db.delete("employee", "acme").unwrap_err();
    assert!(err.is_not_found());

    db.write("employee", "acme", &1).unwrap();
    db.delete("employee", "acme").unwrap();
    let err = db.delete("employee", "acme").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_removes_json_next_to_stray_file() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    db.write("employee", "acme", &json!({ "Name": "Acme" })).unwrap();
    fs::write(dir.path().join("employee/acme"), "stray").unwrap();

    db.delete("employee", "acme").unwrap();

    assert!(!dir.path().join("employee/acme.json").exists());
    let err = db.read::<serde_json::Value>("employee", "acme").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_bare_file_without_json_is_ok() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    fs::create_dir(dir.path().join("employee")).unwrap();
    fs::write(dir.path().join("employee/notes"), "plain").unwrap();

    db.delete("employee", "notes").unwrap();

    // Only the resource file is ever removed for a regular-file match.
    assert!(dir.path().join("employee/notes").exists());
}

#[test]
fn test_delete_directory_resource() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());
    let nested = dir.path().join("employee/archive/2024");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("old.json"), "{}\n").unwrap();
    db.write("employee", "acme", &1).unwrap();

    db.delete("employee", "archive").unwrap();

    assert!(!dir.path().join("employee/archive").exists());
    assert_eq!(db.read::<i32>("employee", "acme").unwrap(), 1);
}

#[test]
fn test_driver_usable_after_errors() {
    let dir = tempdir().unwrap();
    let db = open(dir.path());

    assert!(db.read::<i32>("employee", "missing").is_err());
    assert!(db.delete("employee", "missing").is_err());
    assert!(db.write("", "x", &1).is_err());

    db.write("employee", "acme", &7).unwrap();
    assert_eq!(db.read::<i32>("employee", "acme").unwrap(), 7);
}
