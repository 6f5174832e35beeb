//! Smoke tests for nostrkit-demo-cli
//!
//! These tests drive the built binary end to end inside temporary storage
//! directories. No network access is needed.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn cli(storage: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nostrkit-demo"));
    cmd.env("NOSTRKIT_DEMO_DIR", storage).env("NO_COLOR", "1");
    cmd
}

fn run(storage: &Path, args: &[&str]) -> Output {
    let output = cli(storage)
        .args(args)
        .output()
        .expect("Failed to execute command");
    if !output.status.success() {
        eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

fn public_key(storage: &Path, name: &str) -> String {
    let path = storage.join("identities").join(format!("{name}.json"));
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    stored["public_key"].as_str().unwrap().to_string()
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for command in ["keygen", "whoami", "send", "open", "group-send", "inspect"] {
        assert!(stdout.contains(command), "help should mention '{command}'");
    }
}

/// Test that version is shown
#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("nostrkit-demo"));
}

#[test]
fn test_keygen_then_whoami() {
    let temp = TempDir::new().unwrap();
    assert!(run(temp.path(), &["keygen", "--name", "alice"]).status.success());

    let output = run(temp.path(), &["whoami", "--name", "alice"]);
    assert!(output.status.success());
    let pk = public_key(temp.path(), "alice");
    assert_eq!(pk.len(), 64);
    assert!(String::from_utf8_lossy(&output.stdout).contains(&pk));
}

#[test]
fn test_keygen_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    assert!(run(temp.path(), &["keygen", "--name", "alice"]).status.success());
    let first = public_key(temp.path(), "alice");

    assert!(!run(temp.path(), &["keygen", "--name", "alice"]).status.success());
    assert_eq!(public_key(temp.path(), "alice"), first);

    assert!(run(temp.path(), &["keygen", "--name", "alice", "--force"]).status.success());
    assert_ne!(public_key(temp.path(), "alice"), first);
}

#[test]
fn test_whoami_unknown_identity_fails() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["whoami", "--name", "ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("keygen"));
}

#[test]
fn test_send_and_open_gift_wrap() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    assert!(run(dir, &["keygen", "--name", "alice"]).status.success());
    assert!(run(dir, &["keygen", "--name", "bob"]).status.success());
    let bob = public_key(dir, "bob");
    let envelope = dir.join("envelope.json");

    let sent = run(
        dir,
        &[
            "send",
            "--from",
            "alice",
            "--to",
            &bob,
            "--level",
            "giftwrapped",
            "--delay",
            "5",
            "--output",
            envelope.to_str().unwrap(),
            "hello family",
        ],
    );
    assert!(sent.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&envelope).unwrap()).unwrap();
    assert_eq!(json["event"]["kind"], 1059);
    assert_eq!(json["metadata"]["giftWrapped"], true);

    let opened = run(dir, &["open", "--as", "bob", envelope.to_str().unwrap()]);
    assert!(opened.status.success());
    assert!(String::from_utf8_lossy(&opened.stdout).contains("hello family"));

    let inspected = run(dir, &["inspect", envelope.to_str().unwrap()]);
    assert!(inspected.status.success());
    let stdout = String::from_utf8_lossy(&inspected.stdout);
    assert!(stdout.contains("1059"));
    assert!(stdout.contains("Id matches"));
}

#[test]
fn test_send_standard_prints_json() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    assert!(run(dir, &["keygen", "--name", "alice"]).status.success());
    assert!(run(dir, &["keygen", "--name", "bob"]).status.success());
    let bob = public_key(dir, "bob");

    let sent = run(dir, &["send", "--from", "alice", "--to", &bob, "--level", "standard", "hi bob"]);
    assert!(sent.status.success());
    let json: serde_json::Value = serde_json::from_slice(&sent.stdout).unwrap();
    assert_eq!(json["event"]["kind"], 4);
    assert_eq!(json["metadata"]["requestedLevel"], "standard");
}

#[test]
fn test_unknown_level_fails() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    assert!(run(dir, &["keygen", "--name", "alice"]).status.success());
    let alice = public_key(dir, "alice");

    let output = run(dir, &["send", "--from", "alice", "--to", &alice, "--level", "bogus", "x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown privacy level"));
}

#[test]
fn test_group_send_reports_every_member() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    for name in ["alice", "bob", "carol"] {
        assert!(run(dir, &["keygen", "--name", name]).status.success());
    }
    let bob = public_key(dir, "bob");
    let carol = public_key(dir, "carol");
    let channel = "ab".repeat(32);
    let report = dir.join("delivery.json");

    let output = run(
        dir,
        &[
            "group-send",
            "--from",
            "alice",
            "--channel",
            &channel,
            "--member",
            &bob,
            "--member",
            &carol,
            "--output",
            report.to_str().unwrap(),
            "dinner at 7",
        ],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 of 2"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["deliveries"].as_array().unwrap().len(), 2);
    assert_eq!(json["groupMessage"]["kind"], 42);
}

#[test]
fn test_config_file_sets_default_level() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    std::fs::write(dir.join("config.toml"), "default_privacy_level = \"encrypted\"\n").unwrap();
    assert!(run(dir, &["keygen", "--name", "alice"]).status.success());
    let alice = public_key(dir, "alice");

    let sent = run(dir, &["send", "--from", "alice", "--to", &alice, "note to self"]);
    assert!(sent.status.success());
    let json: serde_json::Value = serde_json::from_slice(&sent.stdout).unwrap();
    assert_eq!(json["metadata"]["privacyLevel"], "encrypted");
}
