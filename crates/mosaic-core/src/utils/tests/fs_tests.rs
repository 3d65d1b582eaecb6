#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::utils::fs::{find_spec_files, plugin_library_name};

fn touch(path: &Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn finds_spec_files_breadth_first() {
    let dir = tempdir().unwrap();
    let sub_a = dir.path().join("a");
    let sub_b = dir.path().join("b");
    let deep = sub_a.join("deep");
    fs::create_dir_all(&deep).unwrap();
    fs::create_dir_all(&sub_b).unwrap();

    touch(&dir.path().join("Top.spec"));
    touch(&sub_a.join("Alpha.spec"));
    touch(&sub_b.join("Beta.spec"));
    touch(&deep.join("Gamma.spec"));
    touch(&dir.path().join("README.txt"));
    touch(&sub_a.join("notes.spec.bak"));

    let found = find_spec_files(&[dir.path().to_path_buf()]);
    let names: Vec<_> = found
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    // Root level first, then first-level subdirectories, then deeper.
    assert_eq!(names, ["Top.spec", "Alpha.spec", "Beta.spec", "Gamma.spec"]);
}

#[test]
fn multiple_roots_are_walked_in_order() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    touch(&first.path().join("One.spec"));
    touch(&second.path().join("Two.spec"));

    let found = find_spec_files(&[first.path().to_path_buf(), second.path().to_path_buf()]);
    assert_eq!(found.len(), 2);
    assert!(found[0].ends_with("One.spec"));
    assert!(found[1].ends_with("Two.spec"));
}

#[test]
fn missing_root_yields_nothing() {
    let found = find_spec_files(&[PathBuf::from("/nonexistent/plugin/root")]);
    assert!(found.is_empty());
}

#[test]
fn library_name_is_rooted_at_the_spec_directory() {
    let library = plugin_library_name(Path::new("/opt/app/plugins"), "Editor");
    assert_eq!(library.parent().unwrap(), Path::new("/opt/app/plugins"));

    let file_name = library.file_name().unwrap().to_string_lossy();
    assert!(file_name.contains("Editor"));

    #[cfg(target_os = "linux")]
    assert_eq!(file_name, "libEditor.so");
}

#[test]
fn empty_path_falls_back_to_current_directory() {
    let library = plugin_library_name(Path::new(""), "Editor");
    assert_eq!(library.parent().unwrap(), Path::new("."));
}
