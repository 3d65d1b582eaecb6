use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn mosaic() -> Command {
    Command::cargo_bin("mosaic").expect("mosaic binary")
}

fn write_spec(dir: &std::path::Path, name: &str, dependencies: &[&str]) {
    let mut xml = format!("<plugin name=\"{name}\" version=\"1.0.0\">\n  <dependencyList>\n");
    for dependency in dependencies {
        xml.push_str(&format!("    <dependency name=\"{dependency}\"/>\n"));
    }
    xml.push_str("  </dependencyList>\n</plugin>\n");
    fs::write(dir.join(format!("{name}.spec")), xml).unwrap();
}

#[test]
fn help_shows_subcommands() {
    mosaic()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin-assembled host"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn list_shows_discovered_plugins() {
    let dir = tempdir().unwrap();
    write_spec(dir.path(), "Core", &[]);
    write_spec(dir.path(), "Editor", &["Core"]);

    mosaic()
        .arg("list")
        .arg("--plugin-dir")
        .arg(dir.path())
        .arg("--settings")
        .arg(dir.path().join("settings.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Core"))
        .stdout(predicate::str::contains("Editor"))
        .stdout(predicate::str::contains("resolved"));
}

#[test]
fn list_reports_unresolvable_dependency() {
    let dir = tempdir().unwrap();
    write_spec(dir.path(), "Editor", &["Missing"]);

    mosaic()
        .arg("list")
        .arg("--plugin-dir")
        .arg(dir.path())
        .arg("--settings")
        .arg(dir.path().join("settings.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "could not resolve dependency on Missing",
        ));
}

#[test]
fn list_with_empty_directory() {
    let dir = tempdir().unwrap();

    mosaic()
        .arg("list")
        .arg("--plugin-dir")
        .arg(dir.path())
        .arg("--settings")
        .arg(dir.path().join("settings.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no plugins found"));
}

#[test]
fn disable_and_enable_update_the_settings_file() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");

    mosaic()
        .arg("disable")
        .arg("Editor")
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("Editor disabled"));
    let contents = fs::read_to_string(&settings).unwrap();
    assert!(contents.contains("Editor"));

    mosaic()
        .arg("enable")
        .arg("Editor")
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("Editor enabled"));
    let contents = fs::read_to_string(&settings).unwrap();
    assert!(!contents.contains("Editor"));
}

#[test]
fn disabled_plugin_is_marked_in_list() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    write_spec(dir.path(), "Core", &[]);
    write_spec(dir.path(), "Editor", &["Core"]);

    mosaic()
        .arg("disable")
        .arg("Core")
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success();

    mosaic()
        .arg("list")
        .arg("--plugin-dir")
        .arg(dir.path())
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"))
        .stdout(predicate::str::contains("indirectly disabled"));
}
