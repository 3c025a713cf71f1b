//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

const DAY: &str = "2026-10-19";

fn command(data_dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dayplanner"));
    cmd.args(args)
        .env("DAYPLANNER_DATA_DIR", data_dir)
        .env_remove("DAYPLANNER_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = command(data_dir, args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

fn run_with_stdin(data_dir: &Path, args: &[&str], input: &str) -> (String, i32) {
    let mut child = command(data_dir, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

/// Data dir with a `home` workspace unlocked by passcode 4711.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "workspace.passcodes.4711", "home"]);
    run_cli_success(dir.path(), &["workspace", "resolve", "4711"]);
    dir
}

fn add_standup_and_report(dir: &Path) {
    run_cli_success(
        dir,
        &["task", "add", "Standup", "-d", "15", "-c", "meeting", "--due", DAY, "--at", "09:30"],
    );
    run_cli_success(dir, &["task", "add", "Write report", "-d", "45", "--due", DAY]);
}

#[test]
fn config_defaults_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let listed = json(&run_cli_success(dir.path(), &["config", "list"]));
    assert_eq!(listed["planner"]["start_time"], "09:00");
    assert_eq!(listed["session"]["tick_interval_ms"], 100);

    run_cli_success(dir.path(), &["config", "set", "planner.buffer_minutes", "7"]);
    let value = run_cli_success(dir.path(), &["config", "get", "planner.buffer_minutes"]);
    assert_eq!(value.trim(), "7");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "planner.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn commands_need_a_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no workspace selected"));

    let (_, stderr, code) = run_cli(dir.path(), &["workspace", "resolve", "0000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("passcode not recognized"));
}

#[test]
fn workspace_resolve_and_lock() {
    let dir = workspace();
    let shown = json(&run_cli_success(dir.path(), &["workspace", "show"]));
    assert_eq!(shown["workspace"], "home");

    run_cli_success(dir.path(), &["workspace", "lock"]);
    let (_, _, code) = run_cli(dir.path(), &["workspace", "show"]);
    assert_eq!(code, 1);
}

#[test]
fn task_lifecycle() {
    let dir = workspace();
    let created = json(&run_cli_success(
        dir.path(),
        &["task", "add", "Groceries", "-d", "30", "-c", "errand", "--due", DAY],
    ));
    assert_eq!(created["workspace"], "home");
    assert_eq!(created["category"], "Errand");
    let id = created["id"].as_str().unwrap().to_string();

    let updated = json(&run_cli_success(
        dir.path(),
        &["task", "update", &id, "--at", "17:00", "--notes", "milk"],
    ));
    assert_eq!(updated["fixed_time"], "17:00");
    assert_eq!(updated["notes"], "milk");

    let listed = json(&run_cli_success(dir.path(), &["task", "list", "--day", DAY]));
    assert_eq!(listed.as_array().unwrap().len(), 1);

    run_cli_success(dir.path(), &["task", "delete", &id]);
    let listed = json(&run_cli_success(dir.path(), &["task", "list"]));
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn invalid_tasks_are_rejected() {
    let dir = workspace();
    let (_, _, code) = run_cli(dir.path(), &["task", "add", "Zero", "-d", "0"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["task", "add", "Odd", "-d", "10", "-c", "hobby"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["task", "add", "Late", "-d", "10", "--at", "25:00"]);
    assert_ne!(code, 0);
}

#[test]
fn schedule_generate_packs_around_anchor() {
    let dir = workspace();
    add_standup_and_report(dir.path());

    let schedule = json(&run_cli_success(
        dir.path(),
        &["schedule", "generate", "--day", DAY, "--start", "09:00"],
    ));
    let blocks = schedule["blocks"].as_array().unwrap();
    assert_eq!(blocks[0]["name"], "Standup");
    assert_eq!(blocks[0]["start"], "2026-10-19T09:30:00");
    assert_eq!(blocks[0]["end"], "2026-10-19T09:45:00");
    assert_eq!(blocks[1]["name"], "Write report");
    assert_eq!(blocks[1]["start"], "2026-10-19T09:50:00");
    assert_eq!(blocks[1]["end"], "2026-10-19T10:35:00");

    let shown = json(&run_cli_success(dir.path(), &["schedule", "show"]));
    assert_eq!(shown, schedule);
}

#[test]
fn schedule_move_of_fixed_block_is_a_noop() {
    let dir = workspace();
    add_standup_and_report(dir.path());
    let generated = json(&run_cli_success(dir.path(), &["schedule", "generate", "--day", DAY]));

    let (stdout, stderr, code) = run_cli(dir.path(), &["schedule", "move", "0", "1"]);
    assert_eq!(code, 0, "{stderr}");
    assert_eq!(json(&stdout), generated);
    assert!(stderr.contains("not moved"));

    let shown = json(&run_cli_success(dir.path(), &["schedule", "show"]));
    assert_eq!(shown, generated);
}

#[test]
fn schedule_export_writes_icalendar() {
    let dir = workspace();
    add_standup_and_report(dir.path());
    run_cli_success(dir.path(), &["schedule", "generate", "--day", DAY]);

    let ics = run_cli_success(dir.path(), &["schedule", "export"]);
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("SUMMARY:Write report\r\n"));
}

#[test]
fn session_run_completes_from_stdin() {
    let dir = workspace();
    add_standup_and_report(dir.path());
    run_cli_success(dir.path(), &["schedule", "generate", "--day", DAY]);

    let (stdout, code) = run_with_stdin(dir.path(), &["session", "run"], "c\nq\n");
    assert_eq!(code, 0);
    let events: Vec<serde_json::Value> = stdout.lines().map(json).collect();
    assert_eq!(events[0]["type"], "BlockStarted");
    assert!(events.iter().any(|e| e["type"] == "BlockCompleted"));

    let shown = json(&run_cli_success(dir.path(), &["schedule", "show"]));
    assert_eq!(shown["blocks"][0]["completed"], true);
    assert_eq!(shown["blocks"][1]["completed"], false);

    // The next run picks up at the first pending block and finishes.
    let (stdout, code) = run_with_stdin(dir.path(), &["session", "run"], "s\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("\"index\":1"));
    assert!(stdout.contains("SessionFinished"));
}

#[test]
fn completions_are_generated() {
    let dir = tempfile::tempdir().unwrap();
    let script = run_cli_success(dir.path(), &["completions", "bash"]);
    assert!(script.contains("dayplanner"));
}
