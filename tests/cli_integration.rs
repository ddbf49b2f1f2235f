//! CLI integration tests for taskdeps
//!
//! These tests drive the binary end to end: a project is created in a
//! temporary directory and every command runs against its task store.

use std::fs;
use std::path::Path;

use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command instance for the taskdeps binary
fn taskdeps_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskdeps"))
}

/// Command running inside `dir`, isolated from the user's global config
fn cmd_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = taskdeps_cmd();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env_remove("TASKDEPS_LOG");
    cmd
}

/// Create a temporary directory and initialize a taskdeps project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    cmd_in(dir.path()).arg("init").assert().success();
    dir
}

/// Adds tasks titled "Task 1".."Task n", which get IDs 1..n
fn add_tasks(dir: &Path, n: u64) {
    for i in 1..=n {
        cmd_in(dir)
            .args(["task", "add", &format!("Task {}", i)])
            .assert()
            .success();
    }
}

fn json_output(cmd: &mut assert_cmd::Command) -> serde_json::Value {
    let output = cmd.arg("--format").arg("json").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    cmd_in(dir.path())
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized taskdeps project"));

    assert!(dir.path().join(".taskdeps").is_dir());
    assert!(dir.path().join(".taskdeps/config.toml").is_file());
    assert!(dir.path().join(".taskdeps/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    cmd_in(dir.path()).arg("init").assert().success();
    cmd_in(dir.path()).arg("init").assert().success();
}

#[test]
fn test_not_in_project_error() {
    let dir = TempDir::new().unwrap();

    cmd_in(dir.path())
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a taskdeps project"));
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_task_add_assigns_sequential_ids() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["task", "add", "Write schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task: #1 - Write schema"));

    cmd_in(dir.path())
        .args(["task", "add", "Build API", "--depends-on", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task: #2 - Build API"));

    let stored = fs::read_to_string(dir.path().join(".taskdeps/tasks.jsonl")).unwrap();
    assert_eq!(stored.lines().count(), 2);
}

#[test]
fn test_task_add_rejects_unknown_dependency() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["task", "add", "Orphan", "--depends-on", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("#7"));

    cmd_in(dir.path())
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks"));
}

#[test]
fn test_task_list_shows_status() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path())
        .args(["task", "dep", "1", "2"])
        .assert()
        .success();

    cmd_in(dir.path())
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"))
        .stdout(predicate::str::contains("ready"));
}

#[test]
fn test_task_show_displays_details() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["task", "add", "Documented", "--description", "Some detail"])
        .assert()
        .success();

    cmd_in(dir.path())
        .args(["task", "show", "#1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Documented"))
        .stdout(predicate::str::contains("Some detail"))
        .stdout(predicate::str::contains("READY"));
}

#[test]
fn test_task_invalid_id_error() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["task", "show", "abc"])
        .assert()
        .failure();

    cmd_in(dir.path())
        .args(["task", "show", "0"])
        .assert()
        .failure();
}

// =============================================================================
// Dependency Tests
// =============================================================================

#[test]
fn test_dependency_cycle_is_rejected() {
    let dir = setup_project();
    add_tasks(dir.path(), 3);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "dep", "2", "3"]).assert().success();

    cmd_in(dir.path())
        .args(["task", "dep", "3", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("#3 → #1 → #2 → #3"));

    // The rejected edge was not stored
    let json = json_output(cmd_in(dir.path()).args(["task", "show", "3"]));
    assert_eq!(json["depends_on"], serde_json::json!([]));
}

#[test]
fn test_self_dependency_is_rejected() {
    let dir = setup_project();
    add_tasks(dir.path(), 1);

    cmd_in(dir.path())
        .args(["task", "dep", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot depend on itself"));
}

#[test]
fn test_duplicate_dependency_is_rejected() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path())
        .args(["task", "dep", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already depends on"));
}

#[test]
fn test_undep_removes_edge() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path())
        .args(["task", "undep", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 no longer depends on #2"));

    cmd_in(dir.path())
        .args(["task", "undep", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not depend on"));
}

#[test]
fn test_chain_lists_dependencies_first() {
    let dir = setup_project();
    add_tasks(dir.path(), 4);

    // 1 -> 2 -> 3, 1 -> 4
    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "dep", "2", "3"]).assert().success();
    cmd_in(dir.path()).args(["task", "dep", "1", "4"]).assert().success();

    let json = json_output(cmd_in(dir.path()).args(["task", "chain", "1"]));
    let ids: Vec<u64> = json["chain"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 4]);
}

#[test]
fn test_chain_hides_completed_when_configured() {
    let dir = setup_project();
    add_tasks(dir.path(), 3);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "dep", "1", "3"]).assert().success();
    cmd_in(dir.path()).args(["task", "done", "2"]).assert().success();

    fs::write(
        dir.path().join(".taskdeps/config.toml"),
        "hide_completed_in_chain = true\n",
    )
    .unwrap();

    let json = json_output(cmd_in(dir.path()).args(["task", "chain", "1"]));
    assert_eq!(json["chain"].as_array().unwrap().len(), 1);
    assert_eq!(json["chain"][0]["id"], 3);
}

#[test]
fn test_task_add_keeps_task_at_max_id() {
    let dir = setup_project();

    let row = r#"{"id":18446744073709551615,"title":"Precious","completed":false,"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#;
    let path = dir.path().join(".taskdeps/tasks.jsonl");
    fs::write(&path, format!("{}\n", row)).unwrap();

    cmd_in(dir.path())
        .args(["task", "add", "Newcomer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No task IDs left"));

    let stored = fs::read_to_string(&path).unwrap();
    assert_eq!(stored.lines().count(), 1);
    assert!(stored.contains("Precious"));
    assert!(!stored.contains("Newcomer"));
}

// =============================================================================
// Completion Tests
// =============================================================================

#[test]
fn test_done_is_gated_by_dependencies() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();

    cmd_in(dir.path())
        .args(["task", "done", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Task #1 is blocked by incomplete dependencies: #2",
        ));

    cmd_in(dir.path())
        .args(["task", "done", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed task: #2"));

    cmd_in(dir.path())
        .args(["task", "done", "1"])
        .assert()
        .success();
}

#[test]
fn test_reopen_task() {
    let dir = setup_project();
    add_tasks(dir.path(), 1);

    cmd_in(dir.path()).args(["task", "done", "1"]).assert().success();

    let json = json_output(cmd_in(dir.path()).args(["task", "reopen", "1"]));
    assert_eq!(json["completed"], false);
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[test]
fn test_rm_refuses_task_with_dependents() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();

    cmd_in(dir.path())
        .args(["task", "rm", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("#1"));

    cmd_in(dir.path())
        .args(["task", "rm", "2", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task: #2"));

    let json = json_output(cmd_in(dir.path()).args(["task", "show", "1"]));
    assert_eq!(json["depends_on"], serde_json::json!([]));
    assert_eq!(json["blocked"], false);
}

#[test]
fn test_rm_force_from_config() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    fs::write(dir.path().join(".taskdeps/config.toml"), "force_delete = true\n").unwrap();

    cmd_in(dir.path()).args(["task", "rm", "2"]).assert().success();
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_ready_and_blocked() {
    let dir = setup_project();
    add_tasks(dir.path(), 3);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();

    let ready = json_output(cmd_in(dir.path()).arg("ready"));
    let ready_ids: Vec<u64> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ready_ids, vec![2, 3]);

    let blocked = json_output(cmd_in(dir.path()).arg("blocked"));
    assert_eq!(blocked.as_array().unwrap().len(), 1);
    assert_eq!(blocked[0]["id"], 1);
    assert_eq!(blocked[0]["blocked_by"], serde_json::json!([2]));

    cmd_in(dir.path())
        .args(["blocked", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 is blocked by:"))
        .stdout(predicate::str::contains("Task 2"));

    cmd_in(dir.path())
        .args(["blocked", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#2 is not blocked."));
}

#[test]
fn test_order_puts_dependencies_first() {
    let dir = setup_project();
    add_tasks(dir.path(), 3);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "dep", "2", "3"]).assert().success();

    let json = json_output(cmd_in(dir.path()).arg("order"));
    let ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_check_clean_project() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);
    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();

    cmd_in(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("no issues found"));
}

#[test]
fn test_check_reports_hand_edited_cycle() {
    let dir = setup_project();

    let rows = [
        r#"{"id":1,"title":"A","completed":false,"depends_on":[2],"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
        r#"{"id":2,"title":"B","completed":false,"depends_on":[1],"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
    ];
    fs::write(
        dir.path().join(".taskdeps/tasks.jsonl"),
        format!("{}\n", rows.join("\n")),
    )
    .unwrap();

    cmd_in(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("dependency cycle between #1, #2"))
        .stderr(predicate::str::contains("1 integrity issue(s) found"));

    cmd_in(dir.path())
        .arg("order")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency"));
}

#[test]
fn test_check_warns_after_reopening_dependency() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    cmd_in(dir.path()).args(["task", "dep", "1", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "done", "2"]).assert().success();
    cmd_in(dir.path()).args(["task", "done", "1"]).assert().success();
    cmd_in(dir.path()).args(["task", "reopen", "2"]).assert().success();

    cmd_in(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "warning: #1 is completed but depends on incomplete #2",
        ));

    let json = json_output(cmd_in(dir.path()).arg("check"));
    assert_eq!(json["errors"], 0);
    assert_eq!(json["warnings"], 1);
    assert_eq!(json["issues"][0]["kind"], "completed_while_blocked");
}

// =============================================================================
// Output and Logging Tests
// =============================================================================

#[test]
fn test_json_error_envelope() {
    let dir = setup_project();

    let output = cmd_in(dir.path())
        .args(["task", "show", "9", "--format", "json"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&output.get_output().stderr);
    let json: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("#9"));
}

#[test]
fn test_text_error_keeps_prefix() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["task", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_json_success_message() {
    let dir = setup_project();
    add_tasks(dir.path(), 2);

    let json = json_output(cmd_in(dir.path()).args(["task", "dep", "1", "2"]));
    assert_eq!(json["task"], 1);
    assert_eq!(json["dependencies"], serde_json::json!([2]));
}

#[test]
fn test_default_format_from_global_config() {
    let dir = setup_project();
    add_tasks(dir.path(), 1);

    let config_dir = dir.path().join(".xdg/taskdeps");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_format = \"json\"\n").unwrap();

    let output = cmd_in(dir.path()).arg("ready").assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json[0]["id"], 1);
}

#[test]
fn test_verbose_flag_logs_to_stderr() {
    let dir = setup_project();

    cmd_in(dir.path())
        .args(["--verbose", "task", "add", "Logged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task: #1"))
        .stderr(predicate::str::contains("DEBUG"));
}
