use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;
use tempfile::{tempdir, NamedTempFile};

fn watchssh(settings: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("watchssh").unwrap();
    cmd.env("WATCHSSH_CONFIG", settings).arg("--no-color");
    cmd
}

#[test]
fn test_help_output() {
    let mut cmd = Command::cargo_bin("watchssh").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SSH Login/Logout Monitor"))
        .stdout(predicate::str::contains("--command-line-only"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_version_output() {
    for flag in ["-v", "--version"] {
        let mut cmd = Command::cargo_bin("watchssh").unwrap();
        cmd.arg(flag);
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("WatchSSH v1.5.0"));
    }
}

#[test]
fn test_missing_log_file_command_line_mode() {
    let dir = tempdir().unwrap();
    let mut cmd = watchssh(&dir.path().join("settings.json"));
    cmd.args(["-c", "-f", "/non/existent/auth.log"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "Log file '/non/existent/auth.log' not found",
        ));
}

#[test]
fn test_zero_poll_interval() {
    let dir = tempdir().unwrap();
    let mut cmd = watchssh(&dir.path().join("settings.json"));
    cmd.args(["-c", "--poll-interval", "0"]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Poll interval must be greater than zero"));
}

#[test]
fn test_ignore_list_round_trip() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");

    watchssh(&settings)
        .args(["ignore", "add", "root"])
        .assert()
        .success();
    watchssh(&settings)
        .args(["ignore", "add", "backup"])
        .assert()
        .success();
    watchssh(&settings)
        .args(["ignore", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("root\nbackup\n"));

    let saved = std::fs::read_to_string(&settings).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["ignored_users"], serde_json::json!(["root", "backup"]));

    watchssh(&settings)
        .args(["ignore", "remove", "root"])
        .assert()
        .success();
    watchssh(&settings)
        .args(["ignore", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("root").not())
        .stdout(predicate::str::contains("backup"));
}

#[test]
fn test_ignore_refuses_malformed_settings() {
    let mut settings = NamedTempFile::new().unwrap();
    write!(settings, "{{ not json").unwrap();
    settings.flush().unwrap();

    watchssh(settings.path())
        .args(["ignore", "add", "root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed settings"));
}

#[test]
fn test_command_line_mode_reports_new_events() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, r#"{"ignored_users": ["mallory"]}"#).unwrap();

    let log = dir.path().join("auth.log");
    std::fs::write(
        &log,
        "Sep 18 01:00:00 host sshd[1]: Accepted password for old from 1.2.3.4 port 22 ssh2\n",
    )
    .unwrap();

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("watchssh"))
        .env("WATCHSSH_CONFIG", &settings)
        .args(["--no-color", "-c", "--poll-interval", "10", "-f"])
        .arg(&log)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .unwrap();

    // Give the monitor time to open the log at its end
    std::thread::sleep(Duration::from_millis(1000));

    let mut file = std::fs::OpenOptions::new().append(true).open(&log).unwrap();
    writeln!(
        file,
        "Sep 18 02:00:01 host sshd[100]: Accepted password for mallory from 1.2.3.4 port 22 ssh2"
    )
    .unwrap();
    writeln!(
        file,
        "Sep 18 02:00:02 host sshd[101]: Accepted publickey for alice from 1.2.3.5 port 22 ssh2"
    )
    .unwrap();
    writeln!(
        file,
        "Sep 18 02:05:00 host sshd[101]: pam_unix(sshd:session): session closed for user alice"
    )
    .unwrap();
    file.flush().unwrap();

    std::thread::sleep(Duration::from_millis(1000));
    child.kill().unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("SSH Login Detected: alice\nSSH Logout Detected: alice\n"));
    assert!(!stdout.contains("mallory"));
    assert!(!stdout.contains("old"));
}
