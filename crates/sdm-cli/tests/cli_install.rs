use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn sdm_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sdm").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args([
            "-c",
            "user.name=sdm",
            "-c",
            "user.email=sdm@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {args:?} failed");
}

/// `<tmp>/lib` is a repository tagged `1.0.0`; `<tmp>/app` depends on it
/// through the relative location `../lib`.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("lib");
    fs::create_dir_all(&lib).unwrap();
    git(&lib, &["init", "--quiet"]);
    fs::write(lib.join("Sdm.toml"), "[package]\nname = \"lib\"\n").unwrap();
    fs::write(lib.join("lib.txt"), "hello\n").unwrap();
    git(&lib, &["add", "."]);
    git(&lib, &["commit", "--quiet", "-m", "initial"]);
    git(&lib, &["tag", "1.0.0"]);

    let app = tmp.path().join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(
        app.join("Sdm.toml"),
        "[package]\nname = \"app\"\n\n[[dependencies]]\nname = \"lib\"\nlocation = \"../lib\"\nversion = { up-to-next-major = \"1.0.0\" }\n",
    )
    .unwrap();
    tmp
}

#[test]
fn test_install_checks_out_packages() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let tmp = workspace();
    let app = tmp.path().join("app");

    sdm_cmd(&home)
        .current_dir(&app)
        .arg("install")
        .assert()
        .success()
        .stderr(predicate::str::contains("Installed"));

    let installed = app.join(".sdm").join("checkouts").join("lib");
    assert_eq!(fs::read_to_string(installed.join("lib.txt")).unwrap(), "hello\n");

    let lock = fs::read_to_string(app.join("Sdm.lock")).unwrap();
    assert!(lock.contains("name = \"lib\""));
    assert!(lock.contains("version = \"1.0.0\""));
}

#[test]
fn test_resolve_lists_packages() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let tmp = workspace();

    sdm_cmd(&home)
        .current_dir(tmp.path().join("app"))
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("lib 1.0.0"));
}

#[test]
fn test_update_after_lock_reports_no_changes() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let tmp = workspace();
    let app = tmp.path().join("app");

    sdm_cmd(&home).current_dir(&app).arg("lock").assert().success();
    sdm_cmd(&home)
        .current_dir(&app)
        .arg("update")
        .assert()
        .success()
        .stderr(predicate::str::contains("already at their latest revision"));
}

#[test]
fn test_unsatisfiable_requirement_fails() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let tmp = workspace();
    let app = tmp.path().join("app");
    fs::write(
        app.join("Sdm.toml"),
        "[package]\nname = \"app\"\n\n[[dependencies]]\nname = \"lib\"\nlocation = \"../lib\"\nversion = { exact = \"2.0.0\" }\n",
    )
    .unwrap();

    sdm_cmd(&home)
        .current_dir(&app)
        .arg("lock")
        .assert()
        .failure()
        .stderr(predicate::str::contains("lib"));
    assert!(!app.join("Sdm.lock").exists());
}

#[test]
fn test_xcode_output_format() {
    if !git_available() {
        return;
    }
    let home = TempDir::new().unwrap();
    let tmp = workspace();

    sdm_cmd(&home)
        .current_dir(tmp.path().join("app"))
        .args(["lock", "--output-format", "xcode"])
        .assert()
        .success()
        .stderr(predicate::str::contains("note: sdm: resolved lib 1.0.0"));
}
