mod common;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{
    branch_oid, commit_all, init_repository_dir, parent_oids, repository_dir, run_twig_command,
    stdout_of, twig_commit,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn first_commit_is_a_root_commit(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n").unwrap();
    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let output = twig_commit(repository_dir.path(), "Initial commit\n\nWith a body")
        .assert()
        .success();

    let head = branch_oid(repository_dir.path(), "main");
    output.stdout(format!("[main (root-commit) {}] Initial commit\n", &head[..7]));
    assert!(parent_oids(repository_dir.path(), &head).is_empty());
}

#[rstest]
fn later_commits_point_at_their_parent(init_repository_dir: TempDir) {
    let first = branch_oid(init_repository_dir.path(), "main");
    init_repository_dir.child("1.txt").write_str("uno").unwrap();
    run_twig_command(init_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    twig_commit(init_repository_dir.path(), "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[main "))
        .stdout(predicate::str::ends_with("] Second commit\n"));

    let second = branch_oid(init_repository_dir.path(), "main");
    assert_ne!(first, second);
    assert_eq!(parent_oids(init_repository_dir.path(), &second), vec![first]);
}

#[rstest]
fn commit_without_identity_fails(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("a.txt").write_str("a").unwrap();
    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["commit", "-m", "nobody"])
        .env_remove("TWIG_AUTHOR_NAME")
        .env_remove("TWIG_AUTHOR_EMAIL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("author identity unknown"));

    repository_dir.child(".twig/refs/heads/main").assert("");
}

#[rstest]
fn commit_uses_configured_identity(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    run_twig_command(repository_dir.path(), &["config", "user.name", "Ada Lovelace"])
        .assert()
        .success();
    run_twig_command(repository_dir.path(), &["config", "user.email", "ada@example.com"])
        .assert()
        .success();
    repository_dir.child("a.txt").write_str("a").unwrap();
    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["commit", "-m", "configured"])
        .env_remove("TWIG_AUTHOR_NAME")
        .env_remove("TWIG_AUTHOR_EMAIL")
        .assert()
        .success();

    let head = branch_oid(repository_dir.path(), "main");
    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", &head]);
    assert!(payload.contains("author Ada Lovelace <ada@example.com> "));
}

#[rstest]
fn config_reads_back_values(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["config", "user.name", "Grace"])
        .assert()
        .success();

    run_twig_command(init_repository_dir.path(), &["config", "user.name"])
        .assert()
        .success()
        .stdout("Grace\n");
    run_twig_command(init_repository_dir.path(), &["config", "user.email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'user.email' is not set"));
    run_twig_command(init_repository_dir.path(), &["config", "name", "x"])
        .assert()
        .failure();
}

#[rstest]
fn log_follows_first_parents_newest_first(init_repository_dir: TempDir) {
    init_repository_dir.child("1.txt").write_str("uno").unwrap();
    commit_all(init_repository_dir.path(), "Second commit");
    let head = branch_oid(init_repository_dir.path(), "main");

    let log = stdout_of(init_repository_dir.path(), &["log"]);

    let commits = log
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .collect::<Vec<_>>();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0], head);
    assert!(log.contains("Author: fake_user <fake_email@email.com>\n"));
    assert!(log.contains("    Second commit\n"));
    assert!(log.ends_with("    Initial commit\n"));
}

#[rstest]
fn log_on_an_unborn_branch_fails(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no commits yet"));
}

#[rstest]
fn empty_messages_are_rejected(init_repository_dir: TempDir) {
    twig_commit(init_repository_dir.path(), "   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty commit message"));
}
