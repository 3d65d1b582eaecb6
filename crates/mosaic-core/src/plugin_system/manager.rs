use std::path::{Path, PathBuf};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::registry::SpecRegistry;
use crate::plugin_system::spec::{PluginSpec, PluginSpecState};
use crate::plugin_system::traits::ProgressMonitor;
use crate::storage::SettingsStore;
use crate::utils::fs::find_spec_files;

/// Settings key holding the names of the plugins the user disabled.
pub const DISABLED_PLUGINS_KEY: &str = "PluginManager/PluginSpec.DisabledPlugins";

/// Drives every discovered plugin through its lifecycle: discovery,
/// description parsing, dependency resolution, library loading,
/// initialization and unloading.
///
/// The manager owns the spec registry, the dynamic loader service and
/// the settings store. All methods run on the host's main thread;
/// long-running plugin `initialize` callbacks block it by design,
/// because initialization order is semantically significant.
pub struct PluginManager {
    registry: SpecRegistry,
    loader: Box<dyn PluginLoader>,
    settings: SettingsStore,
    disabled_plugins: Vec<String>,
    shutdown_requesting_plugin: Option<String>,
    plugins_initialized: Option<Box<dyn FnMut()>>,
}

impl PluginManager {
    /// Creates a manager restoring the disabled-plugin list from
    /// `settings`.
    pub fn new(settings: SettingsStore, loader: Box<dyn PluginLoader>) -> Self {
        let disabled_plugins = settings.get_string_list(DISABLED_PLUGINS_KEY);
        log::debug!(
            "plugin manager: settings restored, {} disabled plugin(s)",
            disabled_plugins.len()
        );
        Self {
            registry: SpecRegistry::new(),
            loader,
            settings,
            disabled_plugins,
            shutdown_requesting_plugin: None,
            plugins_initialized: None,
        }
    }

    /// Registers the callback fired after each
    /// [`initialize_plugins`](Self::initialize_plugins) pass.
    pub fn on_plugins_initialized(&mut self, callback: impl FnMut() + 'static) {
        self.plugins_initialized = Some(Box::new(callback));
    }

    /// The default place to search for plugins: the `plugins` directory
    /// next to the directory holding the running executable.
    pub fn default_plugin_paths() -> Vec<PathBuf> {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf));
        vec![root.unwrap_or_default().join("plugins")]
    }

    /// Searches `paths` for plugin description files, resolves the
    /// dependencies among them and loads the plugins in dependency
    /// order.
    ///
    /// Specs whose description file cannot be read stay registered in an
    /// [`PluginSpecState::Invalid`] state so their errors remain
    /// reportable. Plugins named by the persisted disabled list are
    /// disabled before resolution.
    pub fn load_plugins(&mut self, paths: &[PathBuf]) -> Result<(), PluginSystemError> {
        assert!(!paths.is_empty(), "load_plugins: no search paths");
        if !self.registry.is_empty() {
            return Err(PluginSystemError::AlreadyLoaded);
        }

        for spec_file in find_spec_files(paths) {
            let mut spec = PluginSpec::new();
            spec.read(&spec_file);
            self.registry.insert(spec);
        }

        for id in self.registry.ids().collect::<Vec<_>>() {
            let spec = self.registry.get_mut(id);
            if self.disabled_plugins.iter().any(|name| name == spec.name()) {
                spec.set_enabled(false);
            }
        }
        self.registry.resolve_all();

        for id in self.registry.load_queue_all() {
            self.registry.load_plugin(id, &mut *self.loader);
        }
        Ok(())
    }

    /// Initializes every loaded plugin in load-queue order, notifying
    /// `monitor` with the plugin name before each one.
    ///
    /// When an initialization fails, the failing plugin's transitive
    /// dependents are unloaded and marked indirectly disabled, and the
    /// pass continues — unless the plugin requests application shutdown,
    /// in which case its name is recorded and the pass aborts.
    ///
    /// Returns `true` iff every loaded plugin reached
    /// [`PluginSpecState::Initialized`].
    pub fn initialize_plugins(&mut self, monitor: &mut dyn ProgressMonitor) -> bool {
        let queue = self.registry.load_queue_all();
        let mut all_initialized = true;
        self.shutdown_requesting_plugin = None;

        for id in queue {
            if self.registry.get(id).state() != PluginSpecState::Loaded {
                continue;
            }
            let name = self.registry.get(id).name().to_string();
            monitor.set_status(&name);

            if self.registry.initialize_plugin(id) {
                continue;
            }
            all_initialized = false;

            let requested_shutdown = self
                .registry
                .get(id)
                .plugin()
                .is_some_and(|plugin| plugin.is_shutdown_requested());
            if requested_shutdown {
                // Too critical to continue: unloading and terminating is
                // up to the host now.
                self.shutdown_requesting_plugin = Some(name);
                return false;
            }

            let mut unload = Vec::new();
            let mut cycle_check = Vec::new();
            self.registry.unload_queue(id, &mut unload, &mut cycle_check);
            for &dependent in &unload {
                self.registry.unload_plugin(dependent, &mut *self.loader);
            }
            let mut stack = Vec::new();
            self.registry.resolve_indirectly_disabled(id, true, &mut stack);
        }

        if let Some(callback) = self.plugins_initialized.as_mut() {
            callback();
        }
        all_initialized
    }

    /// Unloads every loaded plugin, dependents first. Initialized
    /// plugins are shut down before their library is released.
    pub fn unload_plugins(&mut self) {
        for id in self.registry.unload_queue_all() {
            self.registry.unload_plugin(id, &mut *self.loader);
        }
    }

    /// Name of the plugin that requested application shutdown during the
    /// last initialization pass, if any.
    pub fn shutdown_requesting_plugin(&self) -> Option<&str> {
        self.shutdown_requesting_plugin.as_deref()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requesting_plugin.is_some()
    }

    /// Names of the plugins whose library is currently loaded.
    pub fn loaded_plugin_names(&self) -> Vec<&str> {
        self.registry
            .iter()
            .filter(|(_, spec)| spec.is_plugin_loaded())
            .map(|(_, spec)| spec.name())
            .collect()
    }

    pub fn is_plugin_loaded(&self, plugin_name: &str) -> bool {
        self.registry
            .iter()
            .any(|(_, spec)| spec.is_plugin_loaded() && spec.name() == plugin_name)
    }

    /// Every known spec, including the ones whose description file
    /// failed to read.
    pub fn specs(&self) -> impl Iterator<Item = &PluginSpec> {
        self.registry.iter().map(|(_, spec)| spec)
    }

    pub fn spec(&self, plugin_name: &str) -> Option<&PluginSpec> {
        self.registry
            .find_by_name(plugin_name)
            .map(|id| self.registry.get(id))
    }

    /// The spec registry, for hosts that need the graph-level view.
    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SpecRegistry {
        &mut self.registry
    }

    fn save_settings(&mut self) {
        let mut disabled: Vec<String> = self
            .registry
            .iter()
            .filter(|(_, spec)| !spec.is_enabled())
            .map(|(_, spec)| spec.name().to_string())
            .collect();
        disabled.sort();
        disabled.dedup();

        if let Err(error) = self.settings.set_string_list(DISABLED_PLUGINS_KEY, disabled) {
            log::warn!("plugin manager: could not record disabled plugins: {error}");
            return;
        }
        match self.settings.save() {
            Ok(()) => log::debug!("plugin manager: settings saved"),
            Err(error) => log::warn!("plugin manager: could not save settings: {error}"),
        }
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        let still_loaded: Vec<&str> = self.loaded_plugin_names();
        if !still_loaded.is_empty() {
            log::warn!(
                "{} unloaded plugin(s) left in memory: {}",
                still_loaded.len(),
                still_loaded.join(", ")
            );
        }
        self.save_settings();
    }
}
