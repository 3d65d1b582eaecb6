use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mosaic: a plugin-assembled host application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory to search for plugins; repeatable. Defaults to the
    /// `plugins` directory of the installation.
    #[arg(long = "plugin-dir", global = true, value_name = "DIR")]
    pub plugin_dirs: Vec<PathBuf>,

    /// Settings file holding the disabled-plugin list
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = "mosaic-settings.json"
    )]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load all plugins, initialize them in dependency order, then shut
    /// them down again
    Run,
    /// List discovered plugins with their state, without loading any
    /// libraries
    List,
    /// Let a plugin load at startup again
    Enable {
        /// The name of the plugin to enable
        name: String,
    },
    /// Keep a plugin from loading at startup
    Disable {
        /// The name of the plugin to disable
        name: String,
    },
}
