//! Integration tests for the HseVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  Each
//! test runs inside its own temp directory so the default `.hsevault`
//! record directory never leaks between tests.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the hsevault binary.
fn hsevault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("hsevault").expect("binary should exist")
}

/// Helper: a command running inside `dir` with no inherited store override.
fn hsevault_in(dir: &TempDir) -> Command {
    let mut cmd = hsevault();
    cmd.current_dir(dir.path()).env_remove("HSEVAULT_STORE_DIR");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    hsevault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Encrypted local record store and session manager",
        ))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("switch"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("clear"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn version_flag_shows_version() {
    hsevault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hsevault"));
}

#[test]
fn no_args_shows_help() {
    hsevault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn login_then_whoami() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["login", "sarah.jones"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sarah Jones"))
        .stdout(predicate::str::contains("Site_HSE_Manager"));

    hsevault_in(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("USR-002"))
        .stdout(predicate::str::contains("Site Operations"));

    tmp.child(".hsevault/hse_session_token.rec")
        .assert(predicate::path::exists());
    tmp.child(".hsevault/hse_encryption_key.rec")
        .assert(predicate::path::exists());
}

#[test]
fn whoami_without_session_fails() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active session"));
}

#[test]
fn logout_ends_session() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["login", "david.chen"]).assert().success();
    hsevault_in(&tmp).arg("logout").assert().success();
    hsevault_in(&tmp).arg("whoami").assert().failure();
}

#[test]
fn unknown_identifier_gets_guest_warning() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["login", "site.visitor"])
        .assert()
        .success()
        .stderr(predicate::str::contains("guest"));
}

#[test]
fn malformed_identifier_is_rejected() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["login", "not a name!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot sign in"));
}

#[test]
fn set_get_remove_record() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["set", "test-record", r#"{"foo":"bar"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("added"));

    hsevault_in(&tmp)
        .args(["get", "test-record"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"foo\": \"bar\""));

    hsevault_in(&tmp).args(["remove", "test-record"]).assert().success();

    hsevault_in(&tmp)
        .args(["get", "test-record"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record stored"));
}

#[test]
fn record_file_holds_no_plaintext() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["set", "note", "scaffold inspection overdue"])
        .assert()
        .success();

    let raw = std::fs::read_to_string(tmp.child(".hsevault/note.rec").path()).unwrap();
    assert!(!raw.contains("scaffold"));
    assert!(raw.contains("\"nonce\""));
}

#[test]
fn truncated_record_reported_as_corrupted() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["set", "test-record", r#"{"foo":"bar"}"#])
        .assert()
        .success();

    let path = tmp.child(".hsevault/test-record.rec");
    let raw = std::fs::read_to_string(path.path()).unwrap();
    path.write_str(&raw[..raw.len() / 2]).unwrap();

    hsevault_in(&tmp)
        .args(["get", "test-record"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupted"));
}

#[test]
fn store_dir_flag_overrides_default() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["--store-dir", "records", "set", "alpha", "1"])
        .assert()
        .success();

    tmp.child("records/alpha.rec").assert(predicate::path::exists());
    tmp.child(".hsevault").assert(predicate::path::missing());

    hsevault_in(&tmp)
        .args(["list", "--store-dir", "records"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn clear_force_removes_records() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["set", "a", "1"]).assert().success();
    hsevault_in(&tmp).args(["set", "b", "2"]).assert().success();
    hsevault_in(&tmp).args(["clear", "--force"]).assert().success();

    hsevault_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 record(s)"));
    tmp.child(".hsevault/hse_encryption_key.rec")
        .assert(predicate::path::exists());
}

#[test]
fn clear_force_ends_session_without_records() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();
    hsevault_in(&tmp)
        .args(["clear", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 0 record(s)"));

    hsevault_in(&tmp).arg("whoami").assert().failure();
    tmp.child(".hsevault/hse_session_token.rec")
        .assert(predicate::path::missing());
}

#[test]
fn switch_without_session_fails() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["switch", "USR-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("demo sessions"));
}

#[test]
fn switch_in_demo_session() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();

    hsevault_in(&tmp)
        .arg("switch")
        .assert()
        .success()
        .stdout(predicate::str::contains("USR-006"));

    hsevault_in(&tmp)
        .args(["switch", "USR-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HSE_Director"));

    hsevault_in(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("David Chen"));
}

#[test]
fn switch_refused_when_demo_mode_disabled() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".hsevault.toml").write_str("demo_mode = false\n").unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();
    hsevault_in(&tmp).args(["switch", "USR-001"]).assert().failure();
}

#[test]
fn session_records_cannot_be_set_directly() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".hsevault.toml").write_str("demo_mode = false\n").unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();
    hsevault_in(&tmp).args(["switch", "USR-001"]).assert().failure();

    hsevault_in(&tmp)
        .args([
            "set",
            "hse_current_user",
            r#"{"id":"USR-001","displayName":"David Chen","role":"HSE_Director","department":"Corporate HSE"}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));

    hsevault_in(&tmp)
        .args(["set", "hse_demo_mode", "true"])
        .assert()
        .failure();
    hsevault_in(&tmp)
        .args(["remove", "hse_session_token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));

    hsevault_in(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("USR-002"))
        .stdout(predicate::str::contains("Site_HSE_Manager"))
        .stdout(predicate::str::contains("HSE_Director").not());
}

#[test]
fn list_hides_session_records() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();
    hsevault_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 record(s)"))
        .stdout(predicate::str::contains("hse_current_user").not());
}

#[test]
fn status_reports_key_and_user() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not created yet"));

    hsevault_in(&tmp).args(["login", "priya.patel"]).assert().success();

    hsevault_in(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Priya Patel"))
        .stdout(predicate::str::contains("[demo]"));
}

#[test]
fn completions_bash() {
    hsevault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hsevault"));
}

#[test]
fn completions_unknown_shell_fails() {
    hsevault()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shell"));
}

#[test]
fn invalid_record_key_rejected() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp)
        .args(["set", "../escape", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid record key"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_lists_session_events() {
    let tmp = TempDir::new().unwrap();

    hsevault_in(&tmp).args(["login", "sarah.jones"]).assert().success();
    hsevault_in(&tmp).args(["set", "obs", "1"]).assert().success();

    hsevault_in(&tmp)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("USR-002"));
}
