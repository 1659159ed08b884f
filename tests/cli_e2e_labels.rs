//! End-to-end tests for the `repo-fleet labels` and `explain` commands.

mod common;
use common::prelude::*;

#[test]
fn test_labels_lists_every_label() {
    let fixture = TestFixture::new().with_fleet();
    let output = fixture.command().arg("labels").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    insta::assert_snapshot!(stdout.trim_end(), @r"
    all (6): api-server, legacy, mobile-app, spike, web-app, worker
    backend (3): api-server, billing, worker
    deprecated (1): legacy
    frontend (3): mobile-app, spike, web-app
    poc (1): spike
    ");
}

#[test]
fn test_labels_selected_names_accept_marker() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["labels", "~poc", "deprecated", "missing"])
        .assert()
        .success()
        .stdout("deprecated (1): legacy\npoc (1): spike\n");
}

#[test]
fn test_labels_tree() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["labels", "--tree", "backend"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("labels"))
        .stdout(predicate::str::contains("backend (3)"))
        .stdout(predicate::str::contains("billing"));
}

#[test]
fn test_explain_shows_set_notation_and_selection() {
    let fixture = TestFixture::new().with_fleet();
    let output = fixture
        .command()
        .args(["explain", "~all", "!mobile-app", "+legacy"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    insta::assert_snapshot!(stdout.trim_end(), @r"
    (legacy) ∪ ((~all) ∖ (mobile-app ∪ ~deprecated ∪ ~poc))

    4 repositories selected:
      api-server
      legacy
      web-app
      worker
    ");
}

#[test]
fn test_explain_empty_filter() {
    TestFixture::new()
        .with_config(configs::TWO_PROJECTS)
        .with_inventory()
        .command()
        .arg("explain")
        .assert()
        .success()
        .stdout("∅\n\n0 repositories selected\n");
}

#[test]
fn test_complete_label_and_repository_names() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["complete", "w"])
        .assert()
        .success()
        .stdout("web-app\nworker\n");
}

#[test]
fn test_complete_keeps_leading_markers() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["complete", "!~d"])
        .assert()
        .success()
        .stdout("!~deprecated\n");
}

#[test]
fn test_complete_is_hidden_from_help() {
    TestFixture::new()
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("complete").not());
}
