//! # Mosaic Plugin System
//!
//! Infrastructure for extending the host application through dynamically
//! loaded plugins: discovery of description files, dependency
//! resolution, load/unload ordering, the plugin lifecycle state machine
//! and enable/disable propagation.
//!
//! ## Key submodules and responsibilities:
//!
//! - **[`spec`]**: one parsed plugin description file and its lifecycle
//!   state ([`PluginSpec`], [`PluginSpecState`]).
//! - **[`dependency`]**: a dependency as declared in a description file
//!   ([`PluginDependency`]).
//! - **[`registry`]**: the owning collection of specs and everything
//!   that walks the dependency graph — resolution, indirect-disable
//!   propagation, load and unload queues ([`SpecRegistry`]).
//! - **[`loader`]**: the opaque dynamic loader service
//!   ([`PluginLoader`]) and its `libloading` implementation.
//! - **[`manager`]**: the orchestrator driving specs through the whole
//!   lifecycle and persisting the disabled-plugin list
//!   ([`PluginManager`]).
//! - **[`traits`]**: the contract plugin libraries implement
//!   ([`Plugin`]) and the progress monitor the host provides.
//! - **[`error`]**: plugin system error types.

pub mod dependency;
pub mod error;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod spec;
pub mod traits;

pub use dependency::PluginDependency;
pub use error::PluginSystemError;
pub use loader::{DynamicLibraryLoader, PluginLoader};
pub use manager::{PluginManager, DISABLED_PLUGINS_KEY};
pub use registry::{SpecId, SpecRegistry};
pub use spec::{PluginSpec, PluginSpecState};
pub use traits::{Plugin, ProgressMonitor};

#[cfg(test)]
mod tests;
