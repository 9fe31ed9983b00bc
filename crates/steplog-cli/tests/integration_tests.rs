//! End-to-end tests driving the `steplog` binary with piped output.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A private config directory so a user's own config never leaks in.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn steplog(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_steplog");
        let mut cmd = Command::new(bin_path);
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.temp_dir.path());
        cmd.env("NO_COLOR", "1");
        for key in [
            "STEPLOG_CONFIG",
            "STEPLOG_LEVEL",
            "STEPLOG_MESSAGE_FORMAT",
            "STEPLOG_TIMESTAMP_FORMAT",
            "STEPLOG_SPINNER",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.steplog()
            .args(args)
            .output()
            .expect("failed to run steplog")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_log_line_without_color() {
    let ctx = TestContext::new();
    let output = ctx.run(&["log", "--level", "warn", "--name", "app", "careful", "now"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(!out.contains('\x1b'), "{out:?}");
    assert!(out.ends_with("   WARN [app] careful now\n"), "{out:?}");
}

#[test]
fn test_log_with_custom_format() {
    let ctx = TestContext::new();
    let output = ctx.run(&["log", "--format", "{message} <{level}>", "ready"]);
    assert_eq!(stdout(&output), "ready <   INFO>\n");

    let output = ctx.run(&["log", "--format", "{level} {when}", "ready"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid --format"));
}

#[test]
fn test_error_level_goes_to_stderr() {
    let ctx = TestContext::new();
    let output = ctx.run(&["log", "--level", "error", "--format", "{level} {message}", "broken"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
    assert_eq!(stderr(&output), "  ERROR broken\n");
}

#[test]
fn test_threshold_filters_lines() {
    let ctx = TestContext::new();
    let output = ctx.run(&["log", "--level", "debug", "hidden"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "");

    let output = ctx
        .steplog()
        .env("STEPLOG_LEVEL", "debug")
        .args(["log", "--level", "debug", "--format", "{message}", "shown"])
        .output()
        .expect("failed to run steplog");
    assert_eq!(stdout(&output), "shown\n");
}

#[test]
fn test_unknown_or_bound_level_is_rejected() {
    let ctx = TestContext::new();
    for level in ["shout", "off", "all"] {
        let output = ctx.run(&["log", "--level", level, "x"]);
        assert!(!output.status.success(), "{level}");
        assert!(stderr(&output).contains("Invalid log level"), "{level}");
    }
}

#[test]
fn test_structured_json_argument() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "log",
        "--format",
        "{message}",
        "--json",
        r#"{"id": 9007199254740993}"#,
        "payload",
    ]);
    assert_eq!(stdout(&output), "payload {\n  \"id\": \"9007199254740993\"\n}\n");
}

#[test]
fn test_config_file() {
    let ctx = TestContext::new();
    let config = ctx.path("steplog.toml");
    std::fs::write(&config, "[logger]\nlevel = \"warn\"\nmessage_format = \"{level}: {message}\"\n")
        .expect("failed to write config");

    let config = config.to_str().expect("utf-8 path");
    let output = ctx.run(&["--config", config, "log", "--level", "info", "quiet"]);
    assert_eq!(stdout(&output), "");

    let output = ctx.run(&["--config", config, "log", "--level", "warn", "loud"]);
    assert_eq!(stdout(&output), "   WARN: loud\n");

    let missing = ctx.path("missing.toml");
    let missing = missing.to_str().expect("utf-8 path");
    let output = ctx.run(&["--config", missing, "log", "x"]);
    assert!(!output.status.success());
}

#[test]
fn test_demo_with_warning() {
    let ctx = TestContext::new();
    let output = ctx.run(&["demo", "--steps", "3", "--warn-at", "2", "--delay-ms", "1"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(!out.contains('\x1b'), "{out:?}");
    assert!(out.contains("   INFO [Operation] Demo"), "{out:?}");
    assert!(out.contains("   WARN [Operation] item 2 took longer than expected"));
    assert_eq!(out.lines().last(), Some("* Done. (1 warnings)"));
}

#[test]
fn test_demo_with_error() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "demo", "--steps", "2", "--warn-at", "1", "--error-at", "2", "--delay-ms", "1",
    ]);
    assert!(output.status.success());

    assert!(stderr(&output).contains("  ERROR [Operation] item 2 failed"));
    assert_eq!(stdout(&output).lines().last(), Some("✖ Done. (1 errors)"));
}

#[test]
fn test_demo_clean_and_forced_failure() {
    let ctx = TestContext::new();
    let output = ctx.run(&["demo", "--steps", "1", "--delay-ms", "1"]);
    assert_eq!(stdout(&output).lines().last(), Some("✔ Done."));

    let output = ctx.run(&["demo", "--steps", "1", "--delay-ms", "1", "--fail"]);
    assert_eq!(stdout(&output).lines().last(), Some("✖ Done."));
}

#[test]
fn test_frames_lists_builtin_sets() {
    let ctx = TestContext::new();
    let output = ctx.run(&["frames"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for name in ["dots", "dots2", "line", "arc"] {
        assert!(out.lines().any(|line| line.starts_with(name)), "{name}");
    }
    assert!(out.contains("130ms"));
}

#[test]
fn test_diagnostics_follow_rust_log() {
    let ctx = TestContext::new();
    let output = ctx.run(&["log", "--format", "{message}", "quiet"]);
    assert_eq!(stderr(&output), "");

    let output = ctx
        .steplog()
        .env("RUST_LOG", "debug")
        .args(["log", "--format", "{message}", "chatty"])
        .output()
        .expect("failed to run steplog");
    assert_eq!(stdout(&output), "chatty\n");
    assert!(stderr(&output).contains("no config file, using defaults"), "{}", stderr(&output));
}
