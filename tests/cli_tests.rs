//! End-to-End CLI Tests for configlink
//!
//! These tests run the binary against throwaway projects and check both the
//! console output and the resulting file system.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn configlink_cmd() -> Command {
    let mut cmd = Command::cargo_bin("configlink").unwrap();
    cmd.env_remove("APP_CONFIG_DIR").env("NO_COLOR", "1");
    cmd
}

/// Project at `<tmp>/project` with its secrets in `<tmp>/secrets`.
fn setup_project(temp_dir: &TempDir) -> std::path::PathBuf {
    let secrets = temp_dir.path().join("secrets");
    fs::create_dir_all(&secrets).unwrap();
    fs::write(secrets.join("prod.env"), "API_KEY=prod\n").unwrap();

    let project = temp_dir.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("file-mapping.txt"), "prod.env -> app/.env.prod\n").unwrap();
    fs::write(project.join(".gitignore"), "/build\n").unwrap();
    fs::write(project.join("local.properties"), "config.dir=../secrets\n").unwrap();
    project
}

fn apply(project: &Path) -> assert_cmd::assert::Assert {
    configlink_cmd()
        .arg("apply")
        .arg("--path")
        .arg(project)
        .assert()
}

// =============================================================================
// APPLY COMMAND TESTS
// =============================================================================

#[test]
#[cfg(unix)]
fn test_cli_apply_creates_link_and_ignore_block() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);

    apply(&project)
        .success()
        .stdout(predicate::str::contains("local.properties"))
        .stdout(predicate::str::contains("Linked:"))
        .stdout(predicate::str::contains("Created: 1, Updated: 0, Unchanged: 0"));

    let target = project.join("app/.env.prod");
    assert!(target.is_symlink());
    assert_eq!(fs::read_to_string(&target).unwrap(), "API_KEY=prod\n");

    let gitignore = fs::read_to_string(project.join(".gitignore")).unwrap();
    assert_eq!(
        gitignore,
        "/build\n# === AUTO-GENERATED: DO NOT EDIT ===\napp/.env.prod\n# === END AUTO-GENERATED ==="
    );
}

#[test]
#[cfg(unix)]
fn test_cli_apply_twice_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    apply(&project).success();

    let gitignore_path = project.join(".gitignore");
    let before = fs::read(&gitignore_path).unwrap();
    let modified = fs::metadata(&gitignore_path).unwrap().modified().unwrap();

    apply(&project)
        .success()
        .stdout(predicate::str::contains("Already linked"))
        .stdout(predicate::str::contains("Created: 0, Updated: 0, Unchanged: 1"));

    assert_eq!(fs::read(&gitignore_path).unwrap(), before);
    assert_eq!(
        fs::metadata(&gitignore_path).unwrap().modified().unwrap(),
        modified
    );
}

#[test]
#[cfg(unix)]
fn test_cli_apply_conflict_leaves_file_alone() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    fs::create_dir_all(project.join("app")).unwrap();
    fs::write(project.join("app/.env.prod"), "hand written\n").unwrap();

    apply(&project)
        .failure()
        .stderr(predicate::str::contains("Target is not a symbolic link"));

    let target = project.join("app/.env.prod");
    assert!(!target.is_symlink());
    assert_eq!(fs::read_to_string(target).unwrap(), "hand written\n");
}

#[test]
#[cfg(unix)]
fn test_cli_apply_dry_run() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);

    apply_dry_run(&project)
        .success()
        .stdout(predicate::str::contains("dry-run"))
        .stdout(predicate::str::contains("Would link"));

    assert!(!project.join("app").exists());
    assert_eq!(
        fs::read_to_string(project.join(".gitignore")).unwrap(),
        "/build\n"
    );
}

fn apply_dry_run(project: &Path) -> assert_cmd::assert::Assert {
    configlink_cmd()
        .arg("apply")
        .arg("--dry-run")
        .arg("--path")
        .arg(project)
        .assert()
}

#[test]
#[cfg(unix)]
fn test_cli_config_dir_flag_overrides_properties() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    let staging = temp_dir.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    fs::write(staging.join("prod.env"), "API_KEY=staging\n").unwrap();

    configlink_cmd()
        .arg("apply")
        .arg("--path")
        .arg(&project)
        .arg("--config-dir")
        .arg(&staging)
        .env("APP_CONFIG_DIR", temp_dir.path().join("nowhere"))
        .assert()
        .success()
        .stdout(predicate::str::contains("--config-dir"));

    assert_eq!(
        fs::read_to_string(project.join("app/.env.prod")).unwrap(),
        "API_KEY=staging\n"
    );
}

#[test]
#[cfg(unix)]
fn test_cli_env_var_used_without_properties() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    fs::remove_file(project.join("local.properties")).unwrap();

    configlink_cmd()
        .arg("apply")
        .arg("--path")
        .arg(&project)
        .env("APP_CONFIG_DIR", temp_dir.path().join("secrets"))
        .assert()
        .success()
        .stdout(predicate::str::contains("$APP_CONFIG_DIR"));

    assert!(project.join("app/.env.prod").is_symlink());
}

#[test]
fn test_cli_apply_without_config_dir_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    fs::remove_file(project.join("local.properties")).unwrap();

    apply(&project)
        .failure()
        .stderr(predicate::str::contains("--config-dir"))
        .stderr(predicate::str::contains("local.properties"))
        .stderr(predicate::str::contains("APP_CONFIG_DIR"));

    // Nothing was touched.
    assert_eq!(
        fs::read_to_string(project.join(".gitignore")).unwrap(),
        "/build\n"
    );
}

#[test]
fn test_cli_apply_bad_mapping_line_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    fs::write(
        project.join("file-mapping.txt"),
        "prod.env -> app/.env.prod\nprod.env app/.env\n",
    )
    .unwrap();

    apply(&project)
        .failure()
        .stderr(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("prod.env app/.env"));
}

#[test]
fn test_cli_apply_missing_source_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    fs::write(project.join("file-mapping.txt"), "missing.env -> .env\n").unwrap();

    apply(&project)
        .failure()
        .stderr(predicate::str::contains("Source file does not exist"))
        .stderr(predicate::str::contains("missing.env"));
}

// =============================================================================
// STATUS COMMAND TESTS
// =============================================================================

#[test]
#[cfg(unix)]
fn test_cli_status_reports_problems_before_apply() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);

    configlink_cmd()
        .arg("status")
        .arg("--path")
        .arg(&project)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing: app/.env.prod"))
        .stdout(predicate::str::contains("Ignore file needs updating"));

    // Status never writes.
    assert!(!project.join("app").exists());
}

#[test]
#[cfg(unix)]
fn test_cli_status_all_good_after_apply() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    apply(&project).success();

    configlink_cmd()
        .arg("status")
        .arg("--path")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: app/.env.prod"))
        .stdout(predicate::str::contains("All good"));
}

#[test]
#[cfg(unix)]
fn test_cli_status_json() {
    let temp_dir = TempDir::new().unwrap();
    let project = setup_project(&temp_dir);
    apply(&project).success();

    let output = configlink_cmd()
        .arg("status")
        .arg("--json")
        .arg("--path")
        .arg(&project)
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["target"], "app/.env.prod");
    assert_eq!(entries[0]["state"], "linked");
    assert_eq!(parsed["ignore_file_current"], true);
}

#[test]
fn test_cli_help() {
    configlink_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("status"));
}
