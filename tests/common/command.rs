use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000"; // %Y-%m-%d %H:%M:%S %z

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one commit holding `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.current_dir(dir);
    cmd.env_remove("TWIG_LOG");
    cmd.envs(vec![
        ("TWIG_AUTHOR_NAME", AUTHOR_NAME),
        ("TWIG_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("TWIG_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", "-m", message])
}

/// Stage everything and commit it
pub fn commit_all(dir: &Path, message: &str) {
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, message).assert().success();
}

pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let output = run_twig_command(dir, args)
        .output()
        .expect("Failed to run twig");
    assert!(
        output.status.success(),
        "twig {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is not UTF-8")
}

/// Tip of `branch` as stored in its ref file
pub fn branch_oid(dir: &Path, branch: &str) -> String {
    std::fs::read_to_string(dir.join(".twig").join("refs").join("heads").join(branch))
        .expect("Failed to read branch ref")
        .trim()
        .to_string()
}

/// The commit's raw payload, as printed by `cat-file -p`
pub fn commit_payload(dir: &Path, commit_oid: &str) -> String {
    stdout_of(dir, &["cat-file", "-p", commit_oid])
}

pub fn parent_oids(dir: &Path, commit_oid: &str) -> Vec<String> {
    commit_payload(dir, commit_oid)
        .lines()
        .filter_map(|line| line.strip_prefix("parent "))
        .map(str::to_string)
        .collect()
}
