//! Error types of the plugin system.
//!
//! Most failures in the plugin lifecycle are not surfaced as `Result`s:
//! they accumulate as the owning [`PluginSpec`](super::spec::PluginSpec)'s
//! error string, because a broken spec is state to report, not a reason
//! to stop the manager. The enum below covers the cases that do travel
//! through `Result`: the dynamic loader service and manager
//! preconditions.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Loading library '{path}' failed: {message}")]
    LoadingError { path: PathBuf, message: String },

    #[error("The file '{path}' is not a compatible plugin")]
    IncompatibleLibrary { path: PathBuf },

    #[error("Plugins are already loaded")]
    AlreadyLoaded,
}
