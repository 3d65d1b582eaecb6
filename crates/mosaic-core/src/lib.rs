//! Core library of the Mosaic host application.
//!
//! Mosaic assembles its functionality from plugins; this crate contains
//! everything the host needs to manage them: the
//! [`plugin_system`] (discovery, dependency resolution, lifecycle), the
//! generic [`graph`] sorting kernel it orders plugins with, the
//! [`configuration`] predicate language for resource requirements, and
//! the [`storage`] layer persisting host settings.

pub mod configuration;
pub mod graph;
pub mod plugin_system;
pub mod storage;
pub mod utils;

pub use configuration::{Configuration, Resource, ResourceId, Version};
pub use plugin_system::{
    DynamicLibraryLoader, Plugin, PluginDependency, PluginLoader, PluginManager, PluginSpec,
    PluginSpecState, ProgressMonitor, SpecRegistry,
};
pub use storage::SettingsStore;
