/// The general API a plugin library implements.
///
/// A plugin consists of two parts: a description file, and a dynamic
/// library containing at least an implementation of this trait.
pub trait Plugin {
    /// Allocate resources and set up internal state.
    ///
    /// The `initialize` of every plugin this plugin depends on has
    /// completed successfully before this is called. On failure, return
    /// a user-readable message describing the reason.
    fn initialize(&mut self) -> Result<(), String>;

    /// Store internal state and release all allocated resources.
    ///
    /// Shutdown runs in reverse initialization order.
    fn shutdown(&mut self);

    /// When initialization fails, the plugin may request shutdown of the
    /// whole application.
    fn is_shutdown_requested(&self) -> bool {
        false
    }
}

/// Receives progress notifications while the manager drives plugins
/// through initialization. Implementations are synchronous callbacks on
/// the manager's thread and must not call back into the manager.
pub trait ProgressMonitor {
    /// The current status of progress, in verbal form.
    fn set_status(&mut self, status: &str);
}
