use glob::glob;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/*
 * This module provides the file system access the config store needs: listing the
 * interface files in a config directory, reading one, and writing one back. It
 * defines errors specific to these operations, a trait `ConfigFileOperations`
 * for abstracting them (so the store can run against an in-memory mock in
 * tests), and the concrete implementation `CoreConfigFiles`.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Pattern(glob::PatternError),
    Glob(glob::GlobError),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<glob::PatternError> for FileSystemError {
    fn from(err: glob::PatternError) -> Self {
        FileSystemError::Pattern(err)
    }
}

impl From<glob::GlobError> for FileSystemError {
    fn from(err: glob::GlobError) -> Self {
        FileSystemError::Glob(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Pattern(e) => write!(f, "Invalid file pattern: {e}"),
            FileSystemError::Glob(e) => write!(f, "Directory listing error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Invalid path: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Pattern(e) => Some(e),
            FileSystemError::Glob(e) => Some(e),
            FileSystemError::InvalidPath(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Defines the file operations the config store depends on. Implementations must
 * make `write_config` appear atomic to readers: a reader sees either the old or
 * the new content, never a partial file.
 */
pub trait ConfigFileOperations: Send + Sync {
    /*
     * Lists files directly inside `config_dir` whose names match `file_pattern`
     * (e.g. `*.conf`). The result is sorted by path.
     */
    fn list_config_files(&self, config_dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>>;
    fn read_config(&self, path: &Path) -> Result<String>;
    fn write_config(&self, path: &Path, contents: &str) -> Result<()>;
}

pub struct CoreConfigFiles {}

impl CoreConfigFiles {
    pub fn new() -> Self {
        CoreConfigFiles {}
    }
}

impl Default for CoreConfigFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFileOperations for CoreConfigFiles {
    fn list_config_files(&self, config_dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
        if !config_dir.is_dir() {
            return Err(FileSystemError::InvalidPath(config_dir.to_path_buf()));
        }
        let escaped_dir = glob::Pattern::escape(&config_dir.to_string_lossy());
        let pattern = format!("{escaped_dir}/{file_pattern}");
        log::debug!("CoreConfigFiles: Listing config files matching {pattern:?}");

        let mut paths = Vec::new();
        for entry in glob(&pattern)? {
            let path = entry?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        log::debug!(
            "CoreConfigFiles: Found {} config files in {config_dir:?}.",
            paths.len()
        );
        Ok(paths)
    }

    fn read_config(&self, path: &Path) -> Result<String> {
        log::trace!("CoreConfigFiles: Reading {path:?}");
        Ok(fs::read_to_string(path)?)
    }

    /*
     * Writes `contents` to a temporary file in the destination directory and then
     * renames it over `path`, so the destination is replaced in one step.
     */
    fn write_config(&self, path: &Path, contents: &str) -> Result<()> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(parent)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        log::debug!(
            "CoreConfigFiles: Wrote {} bytes to {path:?}.",
            contents.len()
        );
        Ok(())
    }
}

/// Interface name for a config file: its file name without extension.
pub fn interface_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
