mod common;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{init_repository_dir, repository_dir, run_twig_command};
use common::file::{delete_path, write_generated_files};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

const ONE: &str = "43dd47ea691c90a5fa7827892c70241913351963";
const TWO: &str = "64c5e5885a4b06010b3a0c20edb7900dd0311025";
const THREE: &str = "1d19714ffbc272ba0da6eb419d66123c20527174";

fn index_content(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join(".twig/index")).unwrap()
}

#[rstest]
fn add_files_from_nested_directories(init_repository_dir: TempDir) {
    assert_eq!(
        index_content(&init_repository_dir),
        format!("1.txt|{ONE}\na/2.txt|{TWO}\na/b/3.txt|{THREE}\n")
    );
}

#[rstest]
fn adding_an_unchanged_file_twice_leaves_the_index_unchanged(init_repository_dir: TempDir) {
    let before = index_content(&init_repository_dir);

    run_twig_command(init_repository_dir.path(), &["add", "1.txt", "a"])
        .assert()
        .success();

    assert_eq!(index_content(&init_repository_dir), before);
}

#[rstest]
fn adding_many_files_stages_each_one(repository_dir: TempDir) {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let files = write_generated_files(repository_dir.path(), 8);

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let index = index_content(&repository_dir);
    assert_eq!(index.lines().count(), files.len());
    for file in files {
        let name = file.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(index.contains(&format!("{name}|")), "{name} is not staged");
    }
}

#[rstest]
fn adding_a_missing_path_fails(init_repository_dir: TempDir) {
    let before = index_content(&init_repository_dir);

    run_twig_command(init_repository_dir.path(), &["add", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pathspec 'missing.txt' did not match any files",
        ));

    assert_eq!(index_content(&init_repository_dir), before);
}

#[rstest]
fn adding_a_deleted_directory_unstages_its_files(init_repository_dir: TempDir) {
    delete_path(&init_repository_dir.path().join("a").join("b"));

    run_twig_command(init_repository_dir.path(), &["add", "a"])
        .assert()
        .success();

    assert_eq!(
        index_content(&init_repository_dir),
        format!("1.txt|{ONE}\na/2.txt|{TWO}\n")
    );
}

#[rstest]
fn a_file_replacing_a_directory_replaces_its_entries(init_repository_dir: TempDir) {
    delete_path(&init_repository_dir.path().join("a"));
    init_repository_dir.child("a").write_str("two").unwrap();

    run_twig_command(init_repository_dir.path(), &["add", "."])
        .assert()
        .success();

    assert_eq!(
        index_content(&init_repository_dir),
        format!("1.txt|{ONE}\na|{TWO}\n")
    );
}

#[rstest]
fn rm_unstages_and_deletes(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["rm", "a/b/3.txt"])
        .assert()
        .success()
        .stdout("Removed a/b/3.txt\n");

    init_repository_dir
        .child("a/b")
        .assert(predicate::path::missing());
    assert_eq!(
        index_content(&init_repository_dir),
        format!("1.txt|{ONE}\na/2.txt|{TWO}\n")
    );
}

#[rstest]
fn rm_cached_keeps_the_working_file(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["rm", "--cached", "1.txt"])
        .assert()
        .success();

    init_repository_dir.child("1.txt").assert("one");
    assert!(!index_content(&init_repository_dir).contains("1.txt|"));
}

#[rstest]
fn rm_of_an_unstaged_path_fails(init_repository_dir: TempDir) {
    init_repository_dir.child("new.txt").write_str("new").unwrap();

    run_twig_command(init_repository_dir.path(), &["rm", "new.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not match any staged files"));

    init_repository_dir.child("new.txt").assert("new");
}

#[rstest]
fn corrupt_index_lines_are_reported(init_repository_dir: TempDir) {
    init_repository_dir
        .child(".twig/index")
        .write_str("1.txt|not-a-hash\n")
        .unwrap();

    run_twig_command(init_repository_dir.path(), &["write-tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}
