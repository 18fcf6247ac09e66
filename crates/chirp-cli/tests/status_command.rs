use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_chirp_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("chirp")
}

#[test]
fn test_status_on_empty_data_dir() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(get_chirp_bin());
    cmd.arg("--data-dir").arg(temp.path()).arg("status");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Session:"))
        .stdout(predicate::str::contains("Replied:   0 posts"))
        .stdout(predicate::str::contains("Snapshots: 0"))
        .stdout(predicate::str::contains("no snapshot yet"));
}

#[test]
fn test_status_json_reports_pending_posts() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(
        temp.path().join("replied-posts.json"),
        r#"{ "repliedIds": ["101"] }"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("session.json"),
        r#"[{ "name": "auth_token", "value": "abc" }]"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("snapshot-20241102T093000000000Z-00000001.json"),
        r#"{
            "createdAt": "2024-11-02T09:30:00Z",
            "sequence": 1,
            "posts": [
                { "id": "101", "author": "a", "text": "", "createdAt": "2024-11-02T09:00:00Z",
                  "address": "https://x.com/a/status/101" },
                { "id": "202", "author": "b", "text": "", "createdAt": "2024-11-02T09:10:00Z",
                  "address": "https://x.com/b/status/202" }
            ]
        }"#,
    )
    .unwrap();

    let mut cmd = Command::new(get_chirp_bin());
    cmd.arg("--data-dir")
        .arg(temp.path())
        .arg("--format")
        .arg("json")
        .arg("status");

    let output = cmd.assert().success().get_output().stdout.clone();
    let status: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(status["sessionStored"], true);
    assert_eq!(status["replied"], 1);
    assert_eq!(status["pending"], 1);
    assert_eq!(status["snapshots"].as_array().unwrap().len(), 1);
}

#[test]
fn test_status_fails_on_corrupt_replied_posts() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("replied-posts.json"), "not json").unwrap();

    let mut cmd = Command::new(get_chirp_bin());
    cmd.arg("--data-dir").arg(temp.path()).arg("status");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("replied-posts.json"));
}

#[test]
fn test_status_ignores_stray_snapshot_file() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("snapshot-notes.json"), "[]").unwrap();

    let mut cmd = Command::new(get_chirp_bin());
    cmd.arg("--data-dir").arg(temp.path()).arg("status");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Snapshots: 0"));
}
