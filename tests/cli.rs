use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

const PRINT_ENV: &str = r#"printf '%s %s %s\n' "$CHANNEL_ID" "$ACCESS_TOKEN" "$CONFIG_PATH""#;

fn wmlaunch_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wmlaunch"))
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("env.json");
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn wmlaunch(dir: &Path, args: &[&str]) -> Output {
    Command::new(wmlaunch_bin())
        .current_dir(dir)
        .env_remove("WMLAUNCH_CONFIG")
        .env("RUST_LOG", "wmlaunch=info")
        .args(args)
        .output()
        .expect("failed to run wmlaunch")
}

#[test]
fn test_inherited_output_reaches_stdout() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C123", "SLACK_TOKEN": "T456" }"#,
    );

    // a relative config path is resolved against the working directory
    let output = wmlaunch(
        temp_dir.path(),
        &[
            "launch",
            "--config",
            "env.json",
            "--stdio",
            "inherit",
            "--command",
            "echo hello from the monitor",
        ],
    );

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hello from the monitor"), "stdout: {}", stdout);

    // logs never mix with the child's output
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("started child process"), "stderr: {}", stderr);
    assert!(!stderr.contains("T456"), "token leaked: {}", stderr);
}

#[test]
fn test_flat_config_environment() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C123", "SLACK_TOKEN": "T456" }"#,
    );

    let output = wmlaunch(
        temp_dir.path(),
        &[
            "supervise",
            "--config",
            config.to_str().unwrap(),
            "--command",
            PRINT_ENV,
        ],
    );

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "C123 T456 config/checks.json\n"
    );
}

#[test]
fn test_nested_config_environment() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        r#"{ "slack": { "SLACK_CHANNEL": "C1", "SLACK_TOKEN": "T1" } }"#,
    );

    let output = wmlaunch(
        temp_dir.path(),
        &[
            "supervise",
            "--config",
            config.to_str().unwrap(),
            "--command",
            PRINT_ENV,
        ],
    );

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "C1 T1 config/checks.json\n"
    );
}

#[test]
fn test_config_from_environment_variable() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C9", "SLACK_TOKEN": "T9" }"#,
    );

    let output = Command::new(wmlaunch_bin())
        .current_dir(temp_dir.path())
        .env("WMLAUNCH_CONFIG", &config)
        .args(&["supervise", "--env-style", "slack", "--command"])
        .arg(r#"printf '%s/%s' "$SLACK_CHANNEL" "$SLACK_TOKEN""#)
        .output()
        .expect("failed to run wmlaunch");

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "C9/T9");
}

#[test]
fn test_missing_config_never_spawns() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("spawned");
    let command = format!("touch {}", marker.display());

    let output = wmlaunch(
        temp_dir.path(),
        &["supervise", "--config", "absent.json", "--command", &command],
    );

    assert!(!output.status.success());
    assert!(!marker.exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_never_spawns() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "SLACK_CHANNEL=C123\nSLACK_TOKEN=T456\n");
    let marker = temp_dir.path().join("spawned");
    let command = format!("touch {}", marker.display());

    let output = wmlaunch(
        temp_dir.path(),
        &["supervise", "--config", "env.json", "--command", &command],
    );

    assert!(!output.status.success());
    assert!(!marker.exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not parse config"), "stderr: {}", stderr);
}

#[test]
fn test_captured_child_outlives_launcher() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C123", "SLACK_TOKEN": "T456" }"#,
    );
    let marker = temp_dir.path().join("survived");
    let command = format!(
        "sleep 1; echo monitor-log; echo monitor-err >&2; touch {}",
        marker.display()
    );

    let output = wmlaunch(
        temp_dir.path(),
        &[
            "launch",
            "--config",
            "env.json",
            "--stdio",
            "captured",
            "--command",
            &command,
        ],
    );

    assert!(output.status.success(), "{:?}", output);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("monitor-log"));

    // the launcher is gone by now, the child writes and must still reach the touch
    let deadline = Instant::now() + Duration::from_secs(10);
    while !marker.exists() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(100));
    }
    assert!(marker.exists(), "child did not survive writing its output");
}

#[test]
fn test_launch_ignores_child_failure() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C123", "SLACK_TOKEN": "T456" }"#,
    );

    let output = wmlaunch(
        temp_dir.path(),
        &["launch", "--config", "env.json", "--command", "exit 7"],
    );

    assert!(output.status.success(), "{:?}", output);
}

#[test]
fn test_supervise_reports_child_failure() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        r#"{ "SLACK_CHANNEL": "C123", "SLACK_TOKEN": "T456" }"#,
    );

    let output = wmlaunch(
        temp_dir.path(),
        &[
            "supervise",
            "--config",
            "env.json",
            "--stdio",
            "captured",
            "--command",
            "echo discarded; exit 7",
        ],
    );

    assert!(!output.status.success());
    // captured output is drained, never forwarded
    assert!(!String::from_utf8_lossy(&output.stdout).contains("discarded"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("child exited unsuccessfully"), "stderr: {}", stderr);
}

#[test]
fn test_subcommand_required() {
    let temp_dir = TempDir::new().unwrap();
    let output = wmlaunch(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("command required"));
}
