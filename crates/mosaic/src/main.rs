mod cli;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use mosaic_core::plugin_system::{
    DynamicLibraryLoader, PluginManager, PluginSpec, ProgressMonitor, SpecRegistry,
    DISABLED_PLUGINS_KEY,
};
use mosaic_core::storage::SettingsStore;
use mosaic_core::utils::fs::find_spec_files;

/// Forwards initialization progress to the log.
struct ConsoleMonitor;

impl ProgressMonitor for ConsoleMonitor {
    fn set_status(&mut self, status: &str) {
        info!("initializing plugin: {status}");
    }
}

fn main() {
    env_logger::init();
    let args = cli::CliArgs::parse();

    let exit_code = match dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn dispatch(args: cli::CliArgs) -> Result<i32, Box<dyn Error>> {
    let plugin_dirs = if args.plugin_dirs.is_empty() {
        PluginManager::default_plugin_paths()
    } else {
        args.plugin_dirs.clone()
    };

    match args.command {
        cli::Commands::Run => run_plugins(&plugin_dirs, &args.settings),
        cli::Commands::List => list_plugins(&plugin_dirs, &args.settings),
        cli::Commands::Enable { name } => set_plugin_enabled(&args.settings, &name, true),
        cli::Commands::Disable { name } => set_plugin_enabled(&args.settings, &name, false),
    }
}

fn run_plugins(plugin_dirs: &[PathBuf], settings_file: &Path) -> Result<i32, Box<dyn Error>> {
    let settings = SettingsStore::load(settings_file)?;
    let mut manager = PluginManager::new(settings, Box::new(DynamicLibraryLoader::new()));
    manager.load_plugins(plugin_dirs)?;

    let mut monitor = ConsoleMonitor;
    let all_initialized = manager.initialize_plugins(&mut monitor);

    if let Some(name) = manager.shutdown_requesting_plugin() {
        eprintln!("plugin '{name}' requested application shutdown");
        manager.unload_plugins();
        return Ok(1);
    }

    for spec in manager.specs().filter(|spec| spec.has_error()) {
        let name = if spec.name().is_empty() {
            spec.file_name()
        } else {
            spec.name()
        };
        eprintln!("{name}: {}", spec.error_string());
    }
    println!(
        "{} plugin(s) initialized",
        manager.loaded_plugin_names().len()
    );

    manager.unload_plugins();
    Ok(if all_initialized { 0 } else { 1 })
}

fn list_plugins(plugin_dirs: &[PathBuf], settings_file: &Path) -> Result<i32, Box<dyn Error>> {
    let settings = SettingsStore::load(settings_file)?;
    let disabled = settings.get_string_list(DISABLED_PLUGINS_KEY);

    // Read and resolve only: listing must not run plugin code.
    let mut registry = SpecRegistry::new();
    for spec_file in find_spec_files(plugin_dirs) {
        let mut spec = PluginSpec::new();
        spec.read(&spec_file);
        registry.insert(spec);
    }
    for id in registry.ids().collect::<Vec<_>>() {
        let spec = registry.get_mut(id);
        if disabled.iter().any(|name| name == spec.name()) {
            spec.set_enabled(false);
        }
    }
    registry.resolve_all();

    if registry.is_empty() {
        println!("no plugins found");
        return Ok(0);
    }
    println!("{:<24} {:<10} {:<10} {}", "NAME", "VERSION", "STATE", "NOTES");
    for (_, spec) in registry.iter() {
        let name = if spec.name().is_empty() {
            spec.file_name()
        } else {
            spec.name()
        };
        let mut notes = Vec::new();
        if !spec.is_enabled() {
            notes.push("disabled".to_string());
        }
        if spec.is_indirectly_disabled() {
            notes.push("indirectly disabled".to_string());
        }
        if spec.has_error() {
            notes.push(spec.error_string().replace('\n', "; "));
        }
        println!(
            "{name:<24} {:<10} {:<10} {}",
            spec.version(),
            spec.state().to_string(),
            notes.join(", ")
        );
    }
    Ok(0)
}

fn set_plugin_enabled(
    settings_file: &Path,
    plugin_name: &str,
    enabled: bool,
) -> Result<i32, Box<dyn Error>> {
    let mut settings = SettingsStore::load(settings_file)?;
    let mut disabled = settings.get_string_list(DISABLED_PLUGINS_KEY);

    if enabled {
        disabled.retain(|name| name != plugin_name);
    } else if !disabled.iter().any(|name| name == plugin_name) {
        disabled.push(plugin_name.to_string());
    }

    settings.set_string_list(DISABLED_PLUGINS_KEY, disabled)?;
    settings.save()?;
    println!(
        "{plugin_name} {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(0)
}
