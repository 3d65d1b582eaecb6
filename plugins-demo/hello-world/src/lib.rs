//! Minimal example plugin: logs on initialize and shutdown.
//!
//! Build it and drop the library next to `hello_world.spec` in a plugin
//! directory to see the host pick it up.

use mosaic_core::plugin_system::Plugin;

struct HelloWorldPlugin {
    greeted: bool,
}

impl Plugin for HelloWorldPlugin {
    fn initialize(&mut self) -> Result<(), String> {
        log::info!("hello from the hello_world plugin");
        self.greeted = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.greeted {
            log::info!("goodbye from the hello_world plugin");
        }
    }
}

/// Entry point the host resolves via its dynamic loader service.
#[no_mangle]
#[allow(improper_ctypes_definitions)] // fat pointer is fine: host and plugin share a toolchain
pub extern "C" fn mosaic_plugin_create() -> *mut dyn Plugin {
    Box::into_raw(Box::new(HelloWorldPlugin { greeted: false }))
}
