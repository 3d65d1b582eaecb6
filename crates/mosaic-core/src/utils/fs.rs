use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of plugin description files.
pub const SPEC_FILE_EXTENSION: &str = "spec";

/// Collects plugin description files under the given search roots.
///
/// Directories are walked breadth-first; subdirectories are descended
/// unconditionally (symlink loops are the operating system's concern).
/// Entries are visited in name order so the discovery sequence is
/// reproducible. Unreadable directories are logged and skipped.
pub fn find_spec_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut spec_files = Vec::new();
    let mut pending: VecDeque<PathBuf> = roots.iter().cloned().collect();

    while let Some(dir) = pending.pop_front() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!("cannot read plugin directory {}: {error}", dir.display());
                continue;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if path
                .extension()
                .is_some_and(|extension| extension == SPEC_FILE_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();
        subdirs.sort();

        spec_files.extend(files);
        pending.extend(subdirs);
    }

    spec_files
}

/// Platform shared-library path for the plugin `name` whose description
/// file lives in `path`.
///
/// Release builds use the platform-native naming (`NAME.dll`,
/// `libNAME.dylib`, `libNAME.so`); debug builds use the debug-suffixed
/// variants where the platform has them (`NAMEd.dll`,
/// `libNAME_debug.dylib`).
pub fn plugin_library_name(path: &Path, name: &str) -> PathBuf {
    let dir = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    dir.join(plugin_library_file_name(name))
}

fn plugin_library_file_name(name: &str) -> String {
    if cfg!(target_os = "windows") {
        if cfg!(debug_assertions) {
            format!("{name}d.dll")
        } else {
            format!("{name}.dll")
        }
    } else if cfg!(target_os = "macos") {
        if cfg!(debug_assertions) {
            format!("lib{name}_debug.dylib")
        } else {
            format!("lib{name}.dylib")
        }
    } else {
        format!("lib{name}.so")
    }
}
