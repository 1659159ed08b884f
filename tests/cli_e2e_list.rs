//! End-to-end tests for the `repo-fleet list` command.
//!
//! These tests invoke the actual CLI binary against a static inventory and
//! check the selected repository names.

mod common;
use common::prelude::*;

#[test]
fn test_list_help() {
    TestFixture::new()
        .command()
        .arg("list")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("List the repositories selected by a filter"));
}

#[test]
fn test_list_missing_config() {
    TestFixture::new()
        .command()
        .arg("list")
        .arg("~all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_list_invalid_config() {
    TestFixture::new()
        .with_config(configs::INVALID_YAML)
        .command()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_list_unknown_provider_is_fatal() {
    TestFixture::new()
        .with_config(configs::UNKNOWN_PROVIDER)
        .command()
        .arg("list")
        .arg("~all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider: statik"))
        .stderr(predicate::str::contains("Did you mean 'static'?"));
}

#[test]
fn test_list_superset_skips_unwanted_labels() {
    TestFixture::new()
        .with_fleet()
        .command()
        .arg("list")
        .arg("~all")
        .assert()
        .success()
        .stdout("api-server\nmobile-app\nweb-app\nworker\n");
}

#[test]
fn test_list_force_overrides_skip() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["list", "~all", "+legacy", "!worker"])
        .assert()
        .success()
        .stdout("api-server\nlegacy\nmobile-app\nweb-app\n");
}

#[test]
fn test_list_alias_extends_label() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["ls", "~backend"])
        .assert()
        .success()
        .stdout("api-server\nbilling\nworker\n");
}

#[test]
fn test_list_without_filter_selects_nothing() {
    TestFixture::new()
        .with_fleet()
        .command()
        .arg("list")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_list_count() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["list", "--count", "~frontend"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_list_long_format() {
    TestFixture::new()
        .with_fleet()
        .command()
        .args(["list", "--long", "web-app", "ghost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web-app  platform  main  Customer web app"))
        .stdout(predicate::str::contains("(not in catalog)"));
}

#[test]
fn test_list_json_format() {
    let fixture = TestFixture::new().with_fleet();
    let output = fixture
        .command()
        .args(["list", "--json", "api-server"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["name"], "api-server");
    assert_eq!(value[0]["default_branch"], "develop");
    assert_eq!(value[0]["labels"][0], "backend");
}

#[test]
fn test_list_qualifies_names_of_other_projects() {
    TestFixture::new()
        .with_config(configs::TWO_PROJECTS)
        .with_inventory()
        .command()
        .args(["list", "~backend"])
        .assert()
        .success()
        .stdout("api-server\ntools/api-server\ntools/linter\nworker\n");
}

#[test]
fn test_list_warns_and_continues_when_fetch_fails() {
    TestFixture::new()
        .with_config(configs::MISSING_INVENTORY)
        .command()
        .args(["list", "web-app", "~frontend"])
        .assert()
        .success()
        .stdout("web-app\n")
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains(
            "Failed to fetch repositories for project 'platform'",
        ));
}

#[test]
fn test_list_uses_cache_until_refresh() {
    let fixture = TestFixture::new().with_fleet();

    fixture
        .command()
        .args(["list", "~backend"])
        .assert()
        .success()
        .stdout("api-server\nbilling\nworker\n");
    assert!(fixture.cache_file().exists());

    // Drop `worker` from the inventory; the cached catalog still has it
    let trimmed = configs::INVENTORY.replace("  - name: worker\n    labels: [backend]\n", "");
    std::fs::write(fixture.path().join("inventory.yaml"), trimmed).unwrap();

    fixture
        .command()
        .args(["list", "~backend"])
        .assert()
        .success()
        .stdout("api-server\nbilling\nworker\n");

    fixture
        .command()
        .args(["--refresh", "list", "~backend"])
        .assert()
        .success()
        .stdout("api-server\nbilling\n");
}
