//! Config file I/O: reading the layer source and writing rendered configs.

use std::path::{Path, PathBuf};

use crate::error::{CodecError, FileError};

/// Read a config file. Every failure, including a missing file, is a
/// [`FileError::Read`]: a path that was asked for and is not there is worth
/// reporting.
pub fn read_config_file(path: &Path) -> Result<String, FileError> {
    std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file that may not exist yet. `Ok(None)` when missing.
pub fn read_existing(path: &Path) -> Result<Option<String>, CodecError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CodecError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<(), CodecError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| CodecError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `{platform config dir}/{file_name}` for `app_name`, e.g.
/// `~/.config/myapp/myapp.toml` on Linux. `None` when the platform has no
/// home directory.
pub fn platform_config_path(app_name: &str, file_name: &str) -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", app_name)?;
    Some(dirs.config_dir().join(file_name))
}
