/*
 * Path helpers shared by the core: where the tool keeps its own settings, and
 * where a given interface's config (or dry-run output) lives inside the
 * configuration directory.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_EXTENSION: &str = "conf";

/*
 * Retrieves the application's local configuration directory, creating it if
 * necessary (e.g. `~/.config/<app_name>` on Linux).
 *
 * Args:
 *   app_name: The name of the application, used to derive the directory path.
 *
 * Returns:
 *   The directory path, or `None` if it could not be determined or created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Attempting to get base app config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathUtils: Failed to create base app config directory {config_path:?}: {e}"
                );
                return None;
            }
            log::debug!("PathUtils: Created base app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}

/// Path of an interface's config file: `<config_dir>/<interface>.conf`.
pub fn interface_config_path(config_dir: &Path, interface: &str) -> PathBuf {
    config_dir.join(format!("{interface}.{CONFIG_FILE_EXTENSION}"))
}

/// Dry-run target for a config file: the live path with `suffix` appended.
pub fn dry_run_path(live_path: &Path, suffix: &str) -> PathBuf {
    let mut path = live_path.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}
