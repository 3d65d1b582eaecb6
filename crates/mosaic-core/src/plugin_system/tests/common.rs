#![cfg(test)]

//! Shared fixtures: an in-memory plugin spec builder, a scripted
//! [`PluginLoader`] stand-in and the plugin instances it produces.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::spec::{PluginSpec, PluginSpecState};
use crate::plugin_system::traits::Plugin;

/// Chronological record of plugin lifecycle events, shared between a
/// test, its loader and the plugin instances.
pub(super) type EventLog = Rc<RefCell<Vec<String>>>;

pub(super) fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub(super) fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// A spec as it looks right after a successful `read`, without touching
/// the filesystem.
pub(super) fn read_spec(name: &str, dependencies: &[&str]) -> PluginSpec {
    let mut spec = PluginSpec::new();
    spec.name = name.to_string();
    spec.version = "1.0.0".to_string();
    spec.dependencies = dependencies
        .iter()
        .map(|dependency| PluginDependency::any_version(dependency))
        .collect();
    spec.file_path = PathBuf::from("/nonexistent/plugins");
    spec.file_name = format!("{name}.spec");
    spec.state = PluginSpecState::Read;
    spec.enabled = true;
    spec
}

/// Writes a description file for `name` into `dir` and returns its path.
pub(super) fn write_spec_file(dir: &Path, name: &str, dependencies: &[&str]) -> PathBuf {
    let mut xml = format!(
        "<plugin name=\"{name}\" version=\"1.0.0\">\n  \
         <description>The {name} plugin</description>\n  \
         <category>Test</category>\n  <dependencyList>\n"
    );
    for dependency in dependencies {
        xml.push_str(&format!("    <dependency name=\"{dependency}\"/>\n"));
    }
    xml.push_str("  </dependencyList>\n</plugin>\n");

    let path = dir.join(format!("{name}.spec"));
    fs::write(&path, xml).unwrap();
    path
}

pub(super) struct TestPlugin {
    name: String,
    initialize_error: Option<String>,
    shutdown_requested: bool,
    events: EventLog,
}

impl Plugin for TestPlugin {
    fn initialize(&mut self) -> Result<(), String> {
        self.events
            .borrow_mut()
            .push(format!("initialize {}", self.name));
        match &self.initialize_error {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn shutdown(&mut self) {
        self.events
            .borrow_mut()
            .push(format!("shutdown {}", self.name));
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }
}

/// Loader that fabricates [`TestPlugin`]s instead of touching dynamic
/// libraries, scripted per plugin name.
pub(super) struct StubLoader {
    pub(super) events: EventLog,
    pub(super) fail_to_load: HashSet<String>,
    pub(super) fail_to_initialize: HashMap<String, String>,
    pub(super) request_shutdown: HashSet<String>,
}

impl StubLoader {
    pub(super) fn new(events: EventLog) -> Self {
        Self {
            events,
            fail_to_load: HashSet::new(),
            fail_to_initialize: HashMap::new(),
            request_shutdown: HashSet::new(),
        }
    }
}

impl PluginLoader for StubLoader {
    fn load(&mut self, path: &Path) -> Result<Box<dyn Plugin>, PluginSystemError> {
        let name = plugin_name_from_library(path);
        if self.fail_to_load.contains(&name) {
            return Err(PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: "scripted load failure".to_string(),
            });
        }
        self.events.borrow_mut().push(format!("load {name}"));
        Ok(Box::new(TestPlugin {
            initialize_error: self.fail_to_initialize.get(&name).cloned(),
            shutdown_requested: self.request_shutdown.contains(&name),
            events: Rc::clone(&self.events),
            name,
        }))
    }

    fn unload(&mut self, path: &Path) -> bool {
        let name = plugin_name_from_library(path);
        self.events.borrow_mut().push(format!("unload {name}"));
        true
    }
}

/// Recovers the plugin name from a platform library path produced by
/// `plugin_library_name`.
fn plugin_name_from_library(path: &Path) -> String {
    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    let stem = stem.strip_suffix("_debug").unwrap_or(&stem);
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    stem.to_string()
}

/// Progress monitor recording every status it is shown.
pub(super) struct RecordingMonitor {
    pub(super) statuses: Vec<String>,
}

impl RecordingMonitor {
    pub(super) fn new() -> Self {
        Self {
            statuses: Vec::new(),
        }
    }
}

impl crate::plugin_system::traits::ProgressMonitor for RecordingMonitor {
    fn set_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }
}
