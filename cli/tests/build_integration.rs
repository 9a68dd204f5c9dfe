//! Integration tests: drive the `kaniko` binary against a stand-in
//! executor script.
//!
//! The stand-in echoes scripted output or its own arguments, which lets
//! the tests cover the full path from CLI flags to executor argv to
//! printed logs without a registry or a real kaniko installation.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Install a stand-in executor under `dir`.
fn install_executor(dir: &Path, script: &str) {
    let path = dir.join("executor");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Run the compiled binary with `args` and return its output.
fn run_kaniko(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kaniko"))
        .args(args)
        .output()
        .expect("failed to run the kaniko binary")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_version_reports_the_crate_version() {
    let output = run_kaniko(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_dry_run_prints_the_command_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let kaniko_path = dir.path().to_str().unwrap();

    let output = run_kaniko(&[
        "build",
        "--dry-run",
        "--kaniko-path",
        kaniko_path,
        "--context",
        "dir://workspace",
        "--destination",
        "gcr.io/repo/image",
        "--force",
    ]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            format!("{kaniko_path}/executor"),
            "--context=dir://workspace".to_string(),
            "--destination=gcr.io/repo/image".to_string(),
            "--force".to_string(),
        ]
    );
    // Nothing ran and no auth file appeared.
    assert!(!dir.path().join(".docker").exists());
}

#[test]
fn test_build_prints_executor_logs() {
    let dir = TempDir::new().unwrap();
    install_executor(
        dir.path(),
        "#!/bin/sh\necho pulled base image\necho pushed image\n",
    );

    let output = run_kaniko(&["build", "--kaniko-path", dir.path().to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec!["pulled base image", "pushed image"]
    );
}

#[test]
fn test_build_renders_flags_in_stable_order() {
    let dir = TempDir::new().unwrap();
    install_executor(
        dir.path(),
        "#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\"; done\n",
    );

    // Flags land in rendering order no matter how the command line orders them.
    let output = run_kaniko(&[
        "build",
        "--kaniko-path",
        dir.path().to_str().unwrap(),
        "--force",
        "--destination",
        "gcr.io/repo/image",
        "--cache",
        "--build-arg",
        "VERSION=1.0",
    ]);

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "--build-arg=VERSION=1.0",
            "--cache",
            "--destination=gcr.io/repo/image",
            "--force",
        ]
    );
}

#[test]
fn test_build_failure_propagates_the_exit_code() {
    let dir = TempDir::new().unwrap();
    install_executor(
        dir.path(),
        "#!/bin/sh\necho no space left on device\nexit 3\n",
    );

    let output = run_kaniko(&["build", "--kaniko-path", dir.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit code 3"));
    assert!(stderr.contains("no space left on device"));
}

#[test]
fn test_signal_terminated_executor_exits_one() {
    let dir = TempDir::new().unwrap();
    install_executor(dir.path(), "#!/bin/sh\necho dying\nkill -KILL $$\n");

    let output = run_kaniko(&["build", "--kaniko-path", dir.path().to_str().unwrap()]);

    // No child exit code to propagate, so the generic failure code is used.
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit code -1"));
    assert!(stderr.contains("dying"));
}

#[test]
fn test_build_writes_the_auth_file() {
    let dir = TempDir::new().unwrap();
    install_executor(dir.path(), "#!/bin/sh\nexit 0\n");

    let output = run_kaniko(&[
        "build",
        "--kaniko-path",
        dir.path().to_str().unwrap(),
        "--registry",
        "https://registry.example",
        "--username",
        "user",
        "--password",
        "pass",
    ]);

    assert!(output.status.success());
    let auth_file = dir.path().join(".docker").join("config.json");
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(auth_file).unwrap()).unwrap();
    assert_eq!(
        parsed["auths"]["https://registry.example"]["auth"],
        "dXNlcjpwYXNz"
    );
}

#[test]
fn test_build_reads_the_password_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = TempDir::new().unwrap();
    install_executor(dir.path(), "#!/bin/sh\nexit 0\n");

    let mut child = Command::new(env!("CARGO_BIN_EXE_kaniko"))
        .args([
            "build",
            "--kaniko-path",
            dir.path().to_str().unwrap(),
            "--registry",
            "https://registry.example",
            "--username",
            "user",
            "--password-stdin",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"pass\n")
        .unwrap();
    let status = child.wait().unwrap();

    assert!(status.success());
    let auth_file = dir.path().join(".docker").join("config.json");
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(auth_file).unwrap()).unwrap();
    assert_eq!(
        parsed["auths"]["https://registry.example"]["auth"],
        "dXNlcjpwYXNz"
    );
}
