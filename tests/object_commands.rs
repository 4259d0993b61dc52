mod common;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{init_repository_dir, repository_dir, run_twig_command, stdout_of};
use predicates::prelude::*;
use rstest::rstest;

const HELLO_BLOB: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
const HELLO_TREE: &str = "aaa96ced2d9a1c8e72c56b253a0e2fe78393feb7";
const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[rstest]
fn hash_object_without_write_leaves_the_store_alone(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n").unwrap();

    run_twig_command(repository_dir.path(), &["hash-object", "hello.txt"])
        .assert()
        .success()
        .stdout(format!("{HELLO_BLOB}\n"));

    repository_dir
        .child(format!(".twig/objects/ce/{}", &HELLO_BLOB[2..]))
        .assert(predicate::path::missing());
}

#[rstest]
fn hash_object_with_write_stores_a_readable_blob(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("hello.txt").write_str("hello\n").unwrap();

    run_twig_command(repository_dir.path(), &["hash-object", "-w", "hello.txt"])
        .assert()
        .success()
        .stdout(format!("{HELLO_BLOB}\n"));

    repository_dir
        .child(format!(".twig/objects/ce/{}", &HELLO_BLOB[2..]))
        .assert(predicate::path::is_file());
    run_twig_command(repository_dir.path(), &["cat-file", "-p", HELLO_BLOB])
        .assert()
        .success()
        .stdout("hello\n");
    run_twig_command(repository_dir.path(), &["cat-file", "-t", HELLO_BLOB])
        .assert()
        .success()
        .stdout("blob\n");
}

#[rstest]
fn write_tree_matches_known_hashes(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{EMPTY_TREE}\n"));

    repository_dir.child("hello.txt").write_str("hello\n").unwrap();
    run_twig_command(repository_dir.path(), &["add", "hello.txt"])
        .assert()
        .success();

    run_twig_command(repository_dir.path(), &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{HELLO_TREE}\n"));
    run_twig_command(repository_dir.path(), &["cat-file", "-p", HELLO_TREE])
        .assert()
        .success()
        .stdout(format!("100644 blob {HELLO_BLOB}\thello.txt\n"));
}

#[rstest]
fn cat_file_shows_commit_headers(init_repository_dir: TempDir) {
    let head = common::command::branch_oid(init_repository_dir.path(), "main");

    let payload = stdout_of(init_repository_dir.path(), &["cat-file", "-p", &head]);

    assert!(payload.starts_with("tree "));
    assert!(payload.contains("author fake_user <fake_email@email.com> 1672574400 +0000\n"));
    assert!(payload.ends_with("\nInitial commit\n"));
    assert!(!payload.contains("parent "));
}

#[rstest]
#[case("0123456789012345678901234567890123456789", "not found")]
#[case("not-a-hash", "invalid object id")]
fn cat_file_rejects_bad_ids(
    init_repository_dir: TempDir,
    #[case] object_id: &str,
    #[case] message: &str,
) {
    run_twig_command(init_repository_dir.path(), &["cat-file", "-p", object_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
}

#[rstest]
fn cat_file_requires_a_mode(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["cat-file", HELLO_BLOB])
        .assert()
        .failure();
}
