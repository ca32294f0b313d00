//! End-to-end runs of the binary against a mock build server and a scripted
//! stand-in for the Gradle wrapper.
#![cfg(unix)]

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

/// Wrapper script: records each invocation and answers the four tasks the
/// uploader uses, steered by environment variables.
const FAKE_GRADLEW: &str = r#"#!/bin/sh
echo "$*" >> invocations.log
for task; do :; done
case "$task" in
  checkBranchExists) echo "${FAKE_BRANCH_EXISTS:-true}" ;;
  getVersionCode) echo 4321 ;;
  getLastCommitsFromCommitByHash|getLastCommits) printf '%s' "$FAKE_COMMIT_LOG" ;;
  *) echo "Task '$task' not found in root project" >&2; exit 1 ;;
esac
"#;

const EXIT_FAILURE_STATUS: i32 = 255;

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let gradlew = dir.path().join("gradlew");
    std::fs::write(&gradlew, FAKE_GRADLEW).unwrap();
    std::fs::set_permissions(&gradlew, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.path().join("app.apk"), b"PK\x03\x04 apk bytes").unwrap();
    dir
}

fn invocations(project: &Path) -> String {
    std::fs::read_to_string(project.join("invocations.log")).unwrap_or_default()
}

fn uploader(server: &MockServer, project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("upload_dev_build").unwrap();
    for var in [
        "UPLOADER_APK_PATH",
        "UPLOADER_PROJECT_DIR",
        "UPLOADER_BUILD_TOOL",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("s3cret")
        .arg(server.base_url())
        .arg("dev")
        .arg("--project-dir")
        .arg(project)
        .arg("--apk-path")
        .arg("app.apk");
    cmd
}

#[test]
fn uploads_new_commits_with_one_get_and_one_post() {
    let project = project();
    let server = MockServer::start();
    let hash = server.mock(|when, then| {
        when.method(GET)
            .path("/latest_commit_hash")
            .header("secret_key", "s3cret");
        then.status(200).body("abc123");
    });
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/upload")
            .header("secret_key", "s3cret")
            .header("apk_version", "4321")
            .body_includes("name=\"apk\"")
            .body_includes("apk bytes")
            .body_includes("name=\"latest_commits\"")
            .body_includes("def456 Fix crash");
        then.status(200);
    });

    uploader(&server, project.path())
        .env("FAKE_COMMIT_LOG", "def456 Fix crash\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded version 4321"));

    hash.assert_calls(1);
    upload.assert_calls(1);
    assert!(
        invocations(project.path())
            .contains("-Pbranch_name=dev -Pfrom=abc123 getLastCommitsFromCommitByHash")
    );
}

#[test]
fn empty_commit_log_exits_zero_without_uploading() {
    let project = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(200).body("abc123");
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200);
    });

    uploader(&server, project.path())
        .env("FAKE_COMMIT_LOG", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to upload"));

    upload.assert_calls(0);
}

#[test]
fn empty_server_hash_asks_for_latest_commits_only() {
    let project = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(200).body("");
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200);
    });

    uploader(&server, project.path())
        .env("FAKE_COMMIT_LOG", "def456 Fix crash\n")
        .assert()
        .success();

    upload.assert_calls(1);
    let log = invocations(project.path());
    assert!(log.contains("-Pbranch_name=dev getLastCommits"));
    assert!(!log.contains("-Pfrom="));
}

#[test]
fn failed_hash_fetch_exits_non_zero_before_commit_log() {
    let project = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(500).body("database is down");
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200);
    });

    uploader(&server, project.path())
        .env("FAKE_COMMIT_LOG", "def456 Fix crash\n")
        .assert()
        .code(EXIT_FAILURE_STATUS)
        .stdout(predicate::str::contains("Error:").and(predicate::str::contains("500")));

    upload.assert_calls(0);
    assert!(!invocations(project.path()).contains("getLastCommits"));
}

#[test]
fn failed_upload_exits_non_zero() {
    let project = project();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(200).body("abc123");
    });
    server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(401).body("wrong secret");
    });

    uploader(&server, project.path())
        .env("FAKE_COMMIT_LOG", "def456 Fix crash\n")
        .assert()
        .code(EXIT_FAILURE_STATUS)
        .stdout(predicate::str::contains("wrong secret"));
}

#[test]
fn missing_branch_exits_zero_without_contacting_server() {
    let project = project();
    let server = MockServer::start();
    let hash = server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(200).body("abc123");
    });

    uploader(&server, project.path())
        .env("FAKE_BRANCH_EXISTS", "false")
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));

    hash.assert_calls(0);
}

#[test]
fn relative_project_dir_resolves_against_working_directory() {
    let parent = tempfile::tempdir().unwrap();
    let project = parent.path().join("proj");
    std::fs::create_dir(&project).unwrap();
    let gradlew = project.join("gradlew");
    std::fs::write(&gradlew, FAKE_GRADLEW).unwrap();
    std::fs::set_permissions(&gradlew, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(project.join("app.apk"), b"PK\x03\x04 apk bytes").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/latest_commit_hash");
        then.status(200).body("abc123");
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/upload").body_includes("apk bytes");
        then.status(200);
    });

    uploader(&server, Path::new("proj"))
        .current_dir(parent.path())
        .env("FAKE_COMMIT_LOG", "def456 Fix crash\n")
        .assert()
        .success();

    upload.assert_calls(1);
    assert!(invocations(&project).contains("getVersionCode"));
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
    // The branch cannot come from the environment
    Command::cargo_bin("upload_dev_build")
        .unwrap()
        .env("UPLOADER_BRANCH_NAME", "dev")
        .args(["s3cret", "https://builds.example.com"])
        .assert()
        .code(EXIT_FAILURE_STATUS)
        .stdout(predicate::str::contains("Invalid arguments"));
}

#[test]
fn help_exits_zero() {
    Command::cargo_bin("upload_dev_build")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH_NAME"));
}
