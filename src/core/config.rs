/*
 * Manages the tool's own settings: which directory holds the interface configs,
 * which prefixes mark metadata and disabled lines, extra metadata attribute
 * names, and the log level. Settings are persisted as JSON in the platform-local
 * configuration directory; a missing file yields the defaults.
 *
 * It uses a trait-based approach (`SettingsManagerOperations`) so callers and
 * tests can substitute the storage location. The concrete implementation
 * (`CoreSettingsManager`) resolves the directory through `path_utils`.
 */
use crate::core::line_classifier::{DEFAULT_DISABLED_PREFIX, DEFAULT_METADATA_PREFIX};
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "wg-meta";
const SETTINGS_FILENAME: &str = "settings.json";
const DEFAULT_CONFIG_DIR: &str = "/etc/wireguard";
const DEFAULT_FILE_PATTERN: &str = "*.conf";
const DEFAULT_DRY_RUN_SUFFIX: &str = ".dryrun";

#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for SettingsError {
    fn from(err: io::Error) -> Self {
        SettingsError::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Serde(err)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Settings I/O error: {e}"),
            SettingsError::Serde(e) => write!(f, "Settings file format error: {e}"),
            SettingsError::NoConfigDirectory => {
                write!(f, "Could not determine the settings directory")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Serde(e) => Some(e),
            SettingsError::NoConfigDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub config_dir: PathBuf,
    pub metadata_prefix: String,
    pub disabled_prefix: String,
    // Merged with Name, Alias and Disabled.
    pub extra_metadata_attributes: Vec<String>,
    pub file_pattern: String,
    pub dry_run_suffix: String,
    pub log_level: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            disabled_prefix: DEFAULT_DISABLED_PREFIX.to_string(),
            extra_metadata_attributes: Vec::new(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            dry_run_suffix: DEFAULT_DRY_RUN_SUFFIX.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl StoreSettings {
    /// Log level filter; unknown names fall back to `Info`.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub trait SettingsManagerOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<StoreSettings>;
    fn save_settings(&self, app_name: &str, settings: &StoreSettings) -> Result<()>;
}

pub struct CoreSettingsManager {}

impl CoreSettingsManager {
    pub fn new() -> Self {
        CoreSettingsManager {}
    }
}

impl Default for CoreSettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

fn load_settings_from(file_path: &Path) -> Result<StoreSettings> {
    if !file_path.exists() {
        log::debug!("CoreSettingsManager: Settings file {file_path:?} does not exist, using defaults.");
        return Ok(StoreSettings::default());
    }
    let reader = BufReader::new(File::open(file_path)?);
    let settings: StoreSettings = serde_json::from_reader(reader)?;
    log::debug!("CoreSettingsManager: Loaded settings from {file_path:?}.");
    Ok(settings)
}

fn save_settings_to(file_path: &Path, settings: &StoreSettings) -> Result<()> {
    let writer = BufWriter::new(File::create(file_path)?);
    serde_json::to_writer_pretty(writer, settings)?;
    log::debug!("CoreSettingsManager: Saved settings to {file_path:?}.");
    Ok(())
}

impl SettingsManagerOperations for CoreSettingsManager {
    fn load_settings(&self, app_name: &str) -> Result<StoreSettings> {
        log::trace!("CoreSettingsManager: Loading settings for app '{app_name}'");
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(SettingsError::NoConfigDirectory)?;
        load_settings_from(&config_dir.join(SETTINGS_FILENAME))
    }

    fn save_settings(&self, app_name: &str, settings: &StoreSettings) -> Result<()> {
        log::trace!("CoreSettingsManager: Saving settings for app '{app_name}'");
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(SettingsError::NoConfigDirectory)?;
        save_settings_to(&config_dir.join(SETTINGS_FILENAME), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // Settings manager rooted in a caller-chosen directory.
    struct TestSettingsManager {
        mock_config_dir: PathBuf,
    }

    impl SettingsManagerOperations for TestSettingsManager {
        fn load_settings(&self, _app_name: &str) -> Result<StoreSettings> {
            load_settings_from(&self.mock_config_dir.join(SETTINGS_FILENAME))
        }

        fn save_settings(&self, _app_name: &str, settings: &StoreSettings) -> Result<()> {
            save_settings_to(&self.mock_config_dir.join(SETTINGS_FILENAME), settings)
        }
    }

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = TestSettingsManager {
            mock_config_dir: dir.path().to_path_buf(),
        };

        // Act
        let settings = manager.load_settings(APP_NAME).unwrap();

        // Assert
        assert_eq!(settings, StoreSettings::default());
        assert_eq!(settings.metadata_prefix, "#+");
        assert_eq!(settings.disabled_prefix, "#-");
        assert_eq!(settings.config_dir, PathBuf::from("/etc/wireguard"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        // Arrange
        let dir = tempdir().unwrap();
        let manager = TestSettingsManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        let settings = StoreSettings {
            config_dir: PathBuf::from("/srv/wg"),
            extra_metadata_attributes: vec!["Owner".to_string()],
            log_level: "debug".to_string(),
            ..StoreSettings::default()
        };

        // Act
        manager.save_settings(APP_NAME, &settings).unwrap();
        let loaded = manager.load_settings(APP_NAME).unwrap();

        // Assert
        assert_eq!(loaded, settings);
        assert_eq!(loaded.log_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{ "metadata_prefix": ";+" }"#,
        )
        .unwrap();
        let manager = TestSettingsManager {
            mock_config_dir: dir.path().to_path_buf(),
        };

        let loaded = manager.load_settings(APP_NAME).unwrap();

        assert_eq!(loaded.metadata_prefix, ";+");
        assert_eq!(loaded.disabled_prefix, "#-");
        assert_eq!(loaded.dry_run_suffix, ".dryrun");
    }

    #[test]
    fn test_malformed_settings_file_is_serde_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), "{ not json").unwrap();
        let manager = TestSettingsManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            manager.load_settings(APP_NAME),
            Err(SettingsError::Serde(_))
        ));
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let settings = StoreSettings {
            log_level: "chatty".to_string(),
            ..StoreSettings::default()
        };
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Info);
    }
}
