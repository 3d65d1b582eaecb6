use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::spec::{PluginSpec, PluginSpecState};

/// Handle to a [`PluginSpec`] inside its owning [`SpecRegistry`].
///
/// Handles are plain indices: they never own the spec and stay valid for
/// the registry's whole lifetime (specs are only ever removed en masse
/// by dropping the registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecId(usize);

/// The single owning collection of [`PluginSpec`]s, and every operation
/// that walks the dependency edges between them.
///
/// The specs form a graph with edges in both directions
/// (`dependency_specs` forward, `provides_specs` reverse), so no spec
/// can own another; the registry owns them all and the edges are
/// [`SpecId`] indices.
#[derive(Debug, Default)]
pub struct SpecRegistry {
    specs: Vec<PluginSpec>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: PluginSpec) -> SpecId {
        let id = SpecId(self.specs.len());
        self.specs.push(spec);
        id
    }

    pub fn get(&self, id: SpecId) -> &PluginSpec {
        &self.specs[id.0]
    }

    pub fn get_mut(&mut self, id: SpecId) -> &mut PluginSpec {
        &mut self.specs[id.0]
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SpecId> {
        (0..self.specs.len()).map(SpecId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpecId, &PluginSpec)> {
        self.specs
            .iter()
            .enumerate()
            .map(|(index, spec)| (SpecId(index), spec))
    }

    /// First spec with the given name, if any.
    pub fn find_by_name(&self, name: &str) -> Option<SpecId> {
        self.specs
            .iter()
            .position(|spec| spec.name == name)
            .map(SpecId)
    }

    /// Matches the spec's declared dependencies against the registry and
    /// establishes the graph edges in both directions.
    ///
    /// Every unresolvable dependency is reported (not just the first);
    /// the spec then keeps its error and stays at
    /// [`PluginSpecState::Read`]. On success the state advances to
    /// [`PluginSpecState::Resolved`]. A `Resolved` spec is reverted to
    /// `Read` first — with its previous edges retracted from both sides
    /// — so re-resolution is idempotent.
    pub fn resolve_dependencies(&mut self, id: SpecId) -> bool {
        if self.specs[id.0].has_error {
            return false;
        }

        if self.specs[id.0].state == PluginSpecState::Resolved {
            // Go back, so we just re-resolve the dependencies.
            self.specs[id.0].state = PluginSpecState::Read;
            let previous = std::mem::take(&mut self.specs[id.0].dependency_specs);
            for dependency in previous {
                self.specs[dependency.0]
                    .provides_specs
                    .retain(|&dependent| dependent != id);
            }
        }
        debug_assert_eq!(self.specs[id.0].state, PluginSpecState::Read);

        let declared = self.specs[id.0].dependencies.clone();
        for dependency in &declared {
            match self.find_by_name(&dependency.name) {
                Some(found) => {
                    self.specs[id.0].dependency_specs.push(found);
                    self.specs[found.0].provides_specs.push(id);
                }
                None => {
                    let name = self.specs[id.0].name.clone();
                    self.specs[id.0].report_error(format!(
                        "Plugin {name} - could not resolve dependency on {}.",
                        dependency.name
                    ));
                }
            }
        }
        if self.specs[id.0].has_error {
            return false;
        }

        self.specs[id.0].state = PluginSpecState::Resolved;
        true
    }

    /// Recomputes the spec's `indirectly_disabled` flag and propagates
    /// the result upward through its dependents.
    ///
    /// `stack` is the traversal stack used for cycle detection; callers
    /// start with an empty one. Finding itself on the stack means the
    /// spec sits on a dependency cycle: it is marked
    /// (`indirectly_disabled` + `circular_dependency_detected`), the
    /// cycle is reported on it, and the marking spreads to every cycle
    /// member through the dependents walk — the
    /// `circular_dependency_detected` early-out terminates that
    /// recursion.
    pub fn resolve_indirectly_disabled(
        &mut self,
        id: SpecId,
        force: bool,
        stack: &mut Vec<SpecId>,
    ) {
        if self.specs[id.0].circular_dependency_detected {
            return;
        }

        if stack.contains(&id) {
            self.specs[id.0].indirectly_disabled = true;
            self.specs[id.0].circular_dependency_detected = true;

            let mut plugin_order = self.specs[id.0].name.clone();
            for &member in stack.iter().rev() {
                plugin_order.push_str(" -> ");
                plugin_order.push_str(&self.specs[member.0].name);
                if member == id {
                    break;
                }
            }

            let dependents = self.specs[id.0].provides_specs.clone();
            for dependent in dependents {
                self.resolve_indirectly_disabled(dependent, true, stack);
            }
            self.specs[id.0]
                .report_error(format!("Circular dependency detected: {plugin_order}"));
            return;
        }

        if force {
            self.specs[id.0].indirectly_disabled = false;
        } else if self.specs[id.0].indirectly_disabled {
            return;
        }

        stack.push(id);

        let dependencies = self.specs[id.0].dependency_specs.clone();
        for dependency in dependencies {
            let required = &self.specs[dependency.0];
            if required.has_error
                || required.indirectly_disabled
                || !required.is_enabled()
                || required.initialization_failed
            {
                self.specs[id.0].indirectly_disabled = true;
                break;
            }
        }
        if self.specs[id.0].indirectly_disabled || force {
            // Resolve again the plugins which depend on me.
            let dependents = self.specs[id.0].provides_specs.clone();
            for dependent in dependents {
                self.resolve_indirectly_disabled(dependent, force, stack);
            }
        }

        let popped = stack.pop();
        debug_assert_eq!(popped, Some(id));
    }

    /// Appends this spec and (depth-first, first) everything it depends
    /// on to `queue`. Dependencies come out before dependents.
    ///
    /// Returns `false` when the spec cannot be loaded: it is disabled,
    /// indirectly disabled, sits on a cycle, or one of its dependencies
    /// failed to queue — the failure is recorded on the spec.
    pub fn load_queue(
        &mut self,
        id: SpecId,
        queue: &mut Vec<SpecId>,
        cycle_check: &mut Vec<SpecId>,
    ) -> bool {
        assert!(self.specs[id.0].state >= PluginSpecState::Resolved);

        if !self.specs[id.0].is_enabled() || self.specs[id.0].indirectly_disabled {
            return false;
        }
        if queue.contains(&id) {
            return true;
        }
        if cycle_check.contains(&id) {
            let plugin_order = self.plugin_order(cycle_check, id);
            self.specs[id.0]
                .report_error(format!("Circular dependency detected: {plugin_order}"));
            return false;
        }
        cycle_check.push(id);

        let dependencies = self.specs[id.0].dependency_specs.clone();
        for dependency in dependencies {
            if !self.load_queue(dependency, queue, cycle_check) {
                let name = self.specs[id.0].name.clone();
                let dependency_name = self.specs[dependency.0].name.clone();
                self.specs[id.0].report_error(format!(
                    "Plugin {name} cannot be loaded because dependency {dependency_name} failed."
                ));
                return false;
            }
        }

        queue.push(id);
        true
    }

    /// Appends this spec and (depth-first, first) everything that
    /// depends on it to `queue`. Dependents come out before the
    /// depended-on.
    ///
    /// A disabled spec whose plugin is still loaded is included, so its
    /// resources get released.
    pub fn unload_queue(
        &mut self,
        id: SpecId,
        queue: &mut Vec<SpecId>,
        cycle_check: &mut Vec<SpecId>,
    ) -> bool {
        assert!(self.specs[id.0].state >= PluginSpecState::Resolved);

        if (!self.specs[id.0].is_enabled() || self.specs[id.0].indirectly_disabled)
            && self.specs[id.0].state < PluginSpecState::Loaded
        {
            return false;
        }
        if queue.contains(&id) {
            return true;
        }
        if cycle_check.contains(&id) {
            let plugin_order = self.plugin_order(cycle_check, id);
            self.specs[id.0]
                .report_error(format!("Circular dependency detected: {plugin_order}"));
            return false;
        }
        cycle_check.push(id);

        let dependents = self.specs[id.0].provides_specs.clone();
        for dependent in dependents {
            self.unload_queue(dependent, queue, cycle_check);
        }

        queue.push(id);
        true
    }

    fn plugin_order(&self, cycle_check: &[SpecId], last: SpecId) -> String {
        let mut order = String::new();
        for &member in cycle_check {
            if !order.is_empty() {
                order.push_str(" -> ");
            }
            order.push_str(&self.specs[member.0].name);
        }
        order.push_str(" -> ");
        order.push_str(&self.specs[last.0].name);
        order
    }

    /// Loads the plugin library and creates the plugin instance,
    /// advancing the spec to [`PluginSpecState::Loaded`].
    ///
    /// Returns `false` without touching the loader when some dependency
    /// has no instance yet — the caller is expected to have ordered the
    /// calls through a load queue.
    pub fn load_plugin(&mut self, id: SpecId, loader: &mut dyn PluginLoader) -> bool {
        assert_eq!(self.specs[id.0].state, PluginSpecState::Resolved);

        let dependencies = self.specs[id.0].dependency_specs.clone();
        for dependency in dependencies {
            if self.specs[dependency.0].plugin.is_none() {
                // A plugin I depend on should be loaded before me and is not.
                return false;
            }
        }

        let library = self.specs[id.0].library_path();
        match loader.load(&library) {
            Ok(plugin) => {
                self.specs[id.0].plugin = Some(plugin);
                self.specs[id.0].state = PluginSpecState::Loaded;
                log::debug!("plugin loaded: {}", library.display());
                true
            }
            Err(error) => {
                log::warn!("{error}");
                self.specs[id.0].report_error(error.to_string());
                false
            }
        }
    }

    /// Runs the plugin's `initialize`, advancing the spec to
    /// [`PluginSpecState::Initialized`]. On failure the spec keeps
    /// state [`PluginSpecState::Loaded`] with `initialization_failed`
    /// raised and the error recorded.
    pub fn initialize_plugin(&mut self, id: SpecId) -> bool {
        let spec = &mut self.specs[id.0];
        assert_eq!(spec.state, PluginSpecState::Loaded);
        let plugin = spec
            .plugin
            .as_mut()
            .expect("initialize_plugin: no plugin instance in Loaded state");

        match plugin.initialize() {
            Ok(()) => {
                spec.initialization_failed = false;
                spec.state = PluginSpecState::Initialized;
                log::debug!(
                    "plugin initialized: {}, version={}, category={}",
                    spec.name,
                    spec.version,
                    spec.category
                );
                true
            }
            Err(message) => {
                log::warn!("Initialization of '{}' plugin failed: {message}", spec.name);
                let name = spec.name.clone();
                spec.report_error(format!(
                    "Initialization of '{name}' plugin failed: {message}"
                ));
                spec.initialization_failed = true;
                false
            }
        }
    }

    /// Shuts the plugin down (when it was initialized), unloads its
    /// library and reverts the spec to [`PluginSpecState::Resolved`].
    pub fn unload_plugin(&mut self, id: SpecId, loader: &mut dyn PluginLoader) {
        let spec = &mut self.specs[id.0];
        let Some(mut plugin) = spec.plugin.take() else {
            return;
        };
        if spec.state >= PluginSpecState::Initialized {
            plugin.shutdown();
        }
        // The instance must not outlive its library code.
        drop(plugin);

        let library = spec.library_path();
        if !loader.unload(&library) {
            log::warn!(
                "Plugin {} could not be unloaded: library still referenced",
                spec.name
            );
        } else {
            log::debug!("plugin unloaded: {}", spec.name);
        }
        spec.state = PluginSpecState::Resolved;
    }

    /// Resolves dependencies of every spec, then recomputes
    /// `indirectly_disabled` over the whole set so propagation reaches
    /// every node at least once.
    pub fn resolve_all(&mut self) {
        for id in self.ids().collect::<Vec<_>>() {
            self.resolve_dependencies(id);
        }
        for id in self.ids().collect::<Vec<_>>() {
            let mut stack = Vec::new();
            self.resolve_indirectly_disabled(id, true, &mut stack);
        }
    }

    /// The order in which plugins must be loaded.
    ///
    /// Specs contribute in ascending name order, each with a fresh
    /// cycle-check list, so the sequence is reproducible across runs for
    /// a given input.
    pub fn load_queue_all(&mut self) -> Vec<SpecId> {
        let mut by_name: Vec<SpecId> = self.ids().collect();
        by_name.sort_by(|a, b| self.specs[a.0].name.cmp(&self.specs[b.0].name));

        let mut queue = Vec::new();
        for id in by_name {
            if self.specs[id.0].state >= PluginSpecState::Resolved {
                let mut cycle_check = Vec::new();
                self.load_queue(id, &mut queue, &mut cycle_check);
            }
        }
        queue
    }

    /// The order in which plugins must be unloaded: dependents first.
    ///
    /// Specs contribute in descending name order, mirroring
    /// [`load_queue_all`](Self::load_queue_all), so unloading everything
    /// reverses the load sequence.
    pub fn unload_queue_all(&mut self) -> Vec<SpecId> {
        let mut by_name: Vec<SpecId> = self.ids().collect();
        by_name.sort_by(|a, b| self.specs[b.0].name.cmp(&self.specs[a.0].name));

        let mut queue = Vec::new();
        for id in by_name {
            if self.specs[id.0].state >= PluginSpecState::Loaded {
                let mut cycle_check = Vec::new();
                self.unload_queue(id, &mut queue, &mut cycle_check);
            }
        }
        queue
    }
}
