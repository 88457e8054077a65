//! Integration tests for the `emersyx` binary: fatal errors, exit status and
//! the log file it writes.

use std::path::Path;
use std::process::{Command, Stdio};

const NO_PROCESSORS: &str = r#"
[[gateways]]
kind = "console"
identifier = "console"
module = "builtin/console-gateway"

[router]
module = "builtin/router"
"#;

/// Run the host with `args`, logging to `logfile`. Returns the exit code and
/// the log file contents.
fn run_host(logfile: &Path, args: &[&str]) -> (Option<i32>, String) {
    let status = Command::new(env!("CARGO_BIN_EXE_emersyx"))
        .arg("--logfile")
        .arg(logfile)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("EMERSYX_CONFIG")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    let log = std::fs::read_to_string(logfile).unwrap_or_default();
    (status.code(), log)
}

#[test]
fn test_missing_config_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("emersyx.log");

    let (code, log) = run_host(&logfile, &["--conffile", "/nonexistent.toml"]);

    assert_eq!(code, Some(1));
    assert!(log.contains("Fatal error"));
    assert!(log.contains("/nonexistent.toml"));
    assert!(log.contains("error occurred while loading the configuration"));
    assert!(!log.contains('\u{1b}'));
}

#[test]
fn test_config_without_processors_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("emersyx.log");
    let conffile = dir.path().join("emersyx.toml");
    std::fs::write(&conffile, NO_PROCESSORS).unwrap();

    let (code, log) = run_host(&logfile, &["--conffile", conffile.to_str().unwrap()]);

    assert_eq!(code, Some(1));
    assert!(log.contains("cannot create a router without any processors"));
    assert!(log.contains("error occurred while wiring components into the router"));
}

#[test]
fn test_loglevel_filters_records() {
    let dir = tempfile::tempdir().unwrap();
    let conffile = dir.path().join("emersyx.toml");
    std::fs::write(&conffile, NO_PROCESSORS).unwrap();
    let conffile = conffile.to_str().unwrap();

    let quiet = dir.path().join("quiet.log");
    let (_, log) = run_host(&quiet, &["--loglevel", "0", "--conffile", conffile]);
    assert!(log.contains("Fatal error"));
    assert!(!log.contains("Loaded configuration"));

    let verbose = dir.path().join("verbose.log");
    let (_, log) = run_host(&verbose, &["--loglevel", "2", "--conffile", conffile]);
    assert!(log.contains("Loaded configuration"));
    assert!(log.contains("Fatal error"));
}

#[test]
fn test_logfile_is_appended_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let logfile = dir.path().join("emersyx.log");

    run_host(&logfile, &["--conffile", "/nonexistent.toml"]);
    let (code, log) = run_host(&logfile, &["--conffile", "/nonexistent.toml"]);

    assert_eq!(code, Some(1));
    assert_eq!(log.matches("Fatal error").count(), 2);
}
