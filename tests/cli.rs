//! End-to-end CLI tests driving the `recall` binary against a
//! temporary database.

use assert_cmd::Command;
use std::path::Path;

fn recall(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("recall").unwrap();
    cmd.env_remove("RECALL_DB");
    cmd.arg("--db").arg(db).arg("--json");
    cmd
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

fn stderr_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).unwrap()
}

#[test]
fn test_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("recall.db");

    recall(&db).arg("init").assert().success();
    assert!(db.exists());

    // Idempotent: a second init succeeds against the existing file
    recall(&db).arg("init").assert().success();
}

#[test]
fn test_session_and_event_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("recall.db");

    let created = stdout_of(
        recall(&db)
            .args([
                "session",
                "create",
                "/tmp/project",
                "--id",
                "s1",
                "--name",
                "demo",
                "--tag",
                "alpha",
            ])
            .assert()
            .success(),
    );
    assert!(created.contains("\"id\":\"s1\""));
    assert!(created.contains("\"working_directory\":\"/tmp/project\""));

    recall(&db)
        .args(["event", "append", "s1", r#"{"type":"a"}"#])
        .assert()
        .success();
    recall(&db)
        .args(["event", "append", "s1", r#"{"type":"b"}"#])
        .assert()
        .success();

    let sessions = stdout_of(recall(&db).args(["session", "list"]).assert().success());
    assert!(sessions.contains("\"count\":1"));

    let events = stdout_of(recall(&db).args(["event", "list", "s1"]).assert().success());
    assert!(events.contains("\"count\":2"));
    let a = events.find(r#"{"type":"a"}"#).unwrap();
    let b = events.find(r#"{"type":"b"}"#).unwrap();
    assert!(a < b, "events must come back in replay order");
}

#[test]
fn test_delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("recall.db");

    recall(&db)
        .args(["session", "create", "/tmp", "--id", "s1"])
        .assert()
        .success();

    let first = stdout_of(
        recall(&db)
            .args(["session", "delete", "s1"])
            .assert()
            .success(),
    );
    assert!(first.contains("\"deleted\":true"));

    let second = stdout_of(
        recall(&db)
            .args(["session", "delete", "s1"])
            .assert()
            .success(),
    );
    assert!(second.contains("\"deleted\":false"));
}

#[test]
fn test_missing_session_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("recall.db");

    recall(&db).arg("init").assert().success();

    let err = stderr_of(
        recall(&db)
            .args(["session", "show", "ghost"])
            .assert()
            .failure()
            .code(3),
    );
    assert!(err.contains("SESSION_NOT_FOUND"));

    recall(&db)
        .args(["event", "list", "ghost"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_invalid_payload_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("recall.db");

    recall(&db)
        .args(["session", "create", "/tmp", "--id", "s1"])
        .assert()
        .success();

    recall(&db)
        .args(["event", "append", "s1", "not json"])
        .assert()
        .failure()
        .code(8);
}
