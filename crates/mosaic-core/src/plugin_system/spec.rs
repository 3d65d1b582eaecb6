use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::registry::SpecId;
use crate::plugin_system::traits::Plugin;
use crate::utils::fs::plugin_library_name;

const PLUGIN_ELEMENT: &str = "plugin";
const PLUGIN_NAME_ATTRIBUTE: &str = "name";
const PLUGIN_VERSION_ATTRIBUTE: &str = "version";
const DESCRIPTION_ELEMENT: &str = "description";
const CATEGORY_ELEMENT: &str = "category";
const DEPENDENCY_LIST_ELEMENT: &str = "dependencyList";
const DEPENDENCY_ELEMENT: &str = "dependency";
const DEPENDENCY_NAME_ATTRIBUTE: &str = "name";
const DEPENDENCY_VERSION_ATTRIBUTE: &str = "version";

/// Lifecycle state of a [`PluginSpec`].
///
/// States are totally ordered. Forward transitions happen through
/// `read`, `resolve_dependencies`, `load_plugin` and
/// `initialize_plugin` on the owning registry; `unload_plugin` reverts
/// to `Resolved`, and re-resolving reverts `Resolved` to `Read` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginSpecState {
    /// Nothing read yet, or reading the description file failed.
    #[default]
    Invalid,
    /// The description file was parsed successfully.
    Read,
    /// Declared dependencies were matched against the spec set.
    Resolved,
    /// The plugin library is loaded and an instance exists.
    Loaded,
    /// The plugin instance finished `initialize` successfully.
    Initialized,
}

impl fmt::Display for PluginSpecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginSpecState::Invalid => "invalid",
            PluginSpecState::Read => "read",
            PluginSpecState::Resolved => "resolved",
            PluginSpecState::Loaded => "loaded",
            PluginSpecState::Initialized => "initialized",
        };
        f.write_str(name)
    }
}

/// One plugin description file: its parsed contents, its position in the
/// dependency graph, and its runtime state.
///
/// Specs are owned by the
/// [`SpecRegistry`](crate::plugin_system::SpecRegistry); the graph edges
/// (`dependency_specs`, `provides_specs`) are indices into the owning
/// registry and live exactly as long as it does. Everything that walks
/// those edges is therefore a registry operation, not a spec method.
#[derive(Default)]
pub struct PluginSpec {
    // Set by read().
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) dependencies: Vec<PluginDependency>,
    pub(crate) file_path: PathBuf,
    pub(crate) file_name: String,

    // Policy flags.
    pub(crate) enabled: bool,
    pub(crate) persistent: bool,
    pub(crate) indirectly_disabled: bool,
    pub(crate) initialization_failed: bool,
    pub(crate) circular_dependency_detected: bool,

    // Graph edges, set by the registry's dependency resolution.
    pub(crate) dependency_specs: Vec<SpecId>,
    pub(crate) provides_specs: Vec<SpecId>,

    // Runtime.
    pub(crate) plugin: Option<Box<dyn Plugin>>,
    pub(crate) state: PluginSpecState,
    pub(crate) has_error: bool,
    pub(crate) error_string: String,
}

impl fmt::Debug for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSpec")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("has_error", &self.has_error)
            .finish_non_exhaustive()
    }
}

impl PluginSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the given description file.
    ///
    /// Clears every previously read field first. On success the state
    /// advances to [`PluginSpecState::Read`] and the plugin is enabled;
    /// on failure the error is recorded, the state stays
    /// [`PluginSpecState::Invalid`] and `false` is returned.
    pub fn read(&mut self, spec_file: &Path) -> bool {
        *self = Self::default();

        if !spec_file.exists() {
            return self.report_error(format!("File does not exist: {}", spec_file.display()));
        }
        let contents = match fs::read_to_string(spec_file) {
            Ok(contents) => contents,
            Err(error) => {
                return self.report_error(format!(
                    "File could not be opened for read: {}: {error}",
                    spec_file.display()
                ));
            }
        };

        self.file_path = spec_file.parent().map(Path::to_path_buf).unwrap_or_default();
        self.file_name = spec_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let document = match roxmltree::Document::parse(&contents) {
            Ok(document) => document,
            Err(error) => {
                let line = error.pos().row;
                return self.report_error(format!(
                    "Error parsing spec file {}: {error}, at line {line}",
                    self.file_name
                ));
            }
        };
        self.read_plugin_element(document.root_element());
        if self.has_error {
            return false;
        }

        self.state = PluginSpecState::Read;
        self.enabled = true;
        true
    }

    fn read_plugin_element(&mut self, element: roxmltree::Node<'_, '_>) {
        if element.tag_name().name() != PLUGIN_ELEMENT {
            self.report_error(format!(
                "Expected element '{PLUGIN_ELEMENT}' as top level element"
            ));
            return;
        }
        let name = element.attribute(PLUGIN_NAME_ATTRIBUTE).unwrap_or_default();
        if name.is_empty() {
            self.report_error(format!(
                "Expected attribute '{PLUGIN_NAME_ATTRIBUTE}' at element '{PLUGIN_ELEMENT}'"
            ));
            return;
        }
        self.name = name.to_string();
        self.version = element
            .attribute(PLUGIN_VERSION_ATTRIBUTE)
            .filter(|version| is_valid_version(version))
            .unwrap_or_default()
            .to_string();

        for child in element.children().filter(roxmltree::Node::is_element) {
            match child.tag_name().name() {
                DESCRIPTION_ELEMENT => {
                    self.description = element_text(child);
                }
                CATEGORY_ELEMENT => {
                    self.category = element_text(child);
                }
                DEPENDENCY_LIST_ELEMENT => {
                    self.read_dependencies(child);
                }
                _ => {}
            }
        }
    }

    fn read_dependencies(&mut self, list: roxmltree::Node<'_, '_>) {
        for entry in list
            .children()
            .filter(|child| child.is_element() && child.tag_name().name() == DEPENDENCY_ELEMENT)
        {
            let name = entry
                .attribute(DEPENDENCY_NAME_ATTRIBUTE)
                .unwrap_or_default();
            if name.is_empty() {
                self.report_error(format!(
                    "Expected attribute '{DEPENDENCY_NAME_ATTRIBUTE}' at element \
                     '{DEPENDENCY_ELEMENT}'"
                ));
                continue;
            }
            let version = entry
                .attribute(DEPENDENCY_VERSION_ATTRIBUTE)
                .filter(|version| is_valid_version(version))
                .unwrap_or_default();
            self.dependencies.push(PluginDependency::new(name, version));
        }
    }

    /// Appends `error` to the accumulated error string and raises
    /// `has_error`. Always returns `false` so error paths can
    /// `return self.report_error(..)`.
    pub(crate) fn report_error(&mut self, error: String) -> bool {
        if !self.error_string.is_empty() {
            self.error_string.push('\n');
        }
        self.error_string.push_str(&error);
        self.has_error = true;
        false
    }

    /// Absolute path of the plugin's shared library, derived from the
    /// description file location and the plugin name.
    pub fn library_path(&self) -> PathBuf {
        plugin_library_name(&self.file_path, &self.name)
    }

    // --- accessors ---

    /// The plugin name. Valid once [`PluginSpecState::Read`] is reached.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The plugin version. Valid once [`PluginSpecState::Read`] is
    /// reached; empty when the description file declared none (or an
    /// invalid one).
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The category grouping this plugin in the UI; empty when the
    /// plugin belongs to no category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The declared dependencies. Valid once [`PluginSpecState::Read`]
    /// is reached.
    pub fn dependencies(&self) -> &[PluginDependency] {
        &self.dependencies
    }

    /// Directory of the description file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// File name of the description file, without its path.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Enables or disables loading the plugin at startup. Disabling a
    /// persistent plugin is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.persistent && !enabled {
            return;
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled || self.persistent
    }

    /// Marks the plugin as one the user cannot disable. Setting this
    /// also enables the plugin.
    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
        if persistent {
            self.enabled = true;
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Whether loading was skipped because a plugin this one needs is
    /// unavailable, disabled or broken.
    pub fn is_indirectly_disabled(&self) -> bool {
        self.indirectly_disabled
    }

    pub fn initialization_failed(&self) -> bool {
        self.initialization_failed
    }

    pub fn circular_dependency_detected(&self) -> bool {
        self.circular_dependency_detected
    }

    /// Dependencies resolved to specs in the owning registry. Valid once
    /// [`PluginSpecState::Resolved`] is reached.
    pub fn dependency_specs(&self) -> &[SpecId] {
        &self.dependency_specs
    }

    /// Specs that depend on this one.
    pub fn provides_specs(&self) -> &[SpecId] {
        &self.provides_specs
    }

    /// The loaded plugin instance, present from
    /// [`PluginSpecState::Loaded`] on.
    pub fn plugin(&self) -> Option<&dyn Plugin> {
        self.plugin.as_deref()
    }

    pub fn is_plugin_loaded(&self) -> bool {
        self.plugin.is_some()
    }

    pub fn state(&self) -> PluginSpecState {
        self.state
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Accumulated, possibly multi-line, user-readable error
    /// description. Cleared only by a subsequent successful
    /// [`read`](Self::read).
    pub fn error_string(&self) -> &str {
        &self.error_string
    }
}

/// Plugin and dependency version attributes must look like
/// `1`, `1.2`, `1.2.3` or `1.2.3_4`; anything else is treated as
/// unspecified.
fn is_valid_version(version: &str) -> bool {
    static VERSION_FORMAT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^([0-9]+)(\.[0-9]+)?(\.[0-9]+)?(_[0-9]+)?$").expect("plugin version regex")
    });
    VERSION_FORMAT.is_match(version)
}

fn element_text(node: roxmltree::Node<'_, '_>) -> String {
    node.text().unwrap_or_default().trim().to_string()
}
