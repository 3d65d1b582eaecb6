use std::collections::HashMap;
use std::panic;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;

/// Symbol a plugin library exports to hand its [`Plugin`] implementation
/// to the host.
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"mosaic_plugin_create\0";

// Note: using *mut dyn Plugin directly keeps the entry point simple at
// the cost of an FFI-safety warning in the plugin crate; host and
// plugins are built with the same toolchain.
type PluginCreateFn = unsafe extern "C" fn() -> *mut dyn Plugin;

/// The dynamic loader service: loads a library and produces the plugin
/// instance it contains, and releases a library on request.
///
/// The plugin system only talks to this trait; tests substitute their
/// own implementation.
pub trait PluginLoader {
    /// Loads the library at `path` and creates its plugin instance.
    fn load(&mut self, path: &Path) -> Result<Box<dyn Plugin>, PluginSystemError>;

    /// Releases the library at `path`. Returns `false` when the library
    /// stays in memory — unknown to this loader or still referenced.
    fn unload(&mut self, path: &Path) -> bool;
}

/// [`PluginLoader`] backed by `libloading`.
///
/// Keeps the loaded [`Library`] handles keyed by path; `unload` drops
/// the handle, which unmaps the library. The plugin instance obtained
/// from [`load`](PluginLoader::load) must be dropped before its library
/// is unloaded.
#[derive(Default)]
pub struct DynamicLibraryLoader {
    libraries: HashMap<PathBuf, Library>,
}

impl DynamicLibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PluginLoader for DynamicLibraryLoader {
    fn load(&mut self, path: &Path) -> Result<Box<dyn Plugin>, PluginSystemError> {
        let library =
            unsafe { Library::new(path) }.map_err(|error| PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        let create: Symbol<'_, PluginCreateFn> = unsafe { library.get(PLUGIN_ENTRY_SYMBOL) }
            .map_err(|_| PluginSystemError::IncompatibleLibrary {
                path: path.to_path_buf(),
            })?;
        let create_fn: PluginCreateFn = *create;

        // Panics must not cross the FFI boundary.
        let raw = panic::catch_unwind(|| unsafe { create_fn() }).map_err(|payload| {
            let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
                (*message).to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "plugin entry point panicked".to_string()
            };
            PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message,
            }
        })?;
        if raw.is_null() {
            return Err(PluginSystemError::IncompatibleLibrary {
                path: path.to_path_buf(),
            });
        }

        let plugin = unsafe { Box::from_raw(raw) };
        self.libraries.insert(path.to_path_buf(), library);
        Ok(plugin)
    }

    fn unload(&mut self, path: &Path) -> bool {
        self.libraries.remove(path).is_some()
    }
}
