use crate::error::{Error, Result};
use crate::utils::io;
use std::env;
use std::path::PathBuf;

/// Base fabhand config directory: `~/.config/fabhand` (`%APPDATA%\fabhand`
/// on Windows).
pub fn fabhand() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA")
            .map_err(|_| Error::internal_io("APPDATA is not set", Some("resolve config dir".to_string())))?;
        Ok(PathBuf::from(appdata).join("fabhand"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME")
            .map_err(|_| Error::internal_io("HOME is not set", Some("resolve config dir".to_string())))?;
        Ok(PathBuf::from(home).join(".config").join("fabhand"))
    }
}

/// Global config.json file path
pub fn config_json() -> Result<PathBuf> {
    Ok(fabhand()?.join("config.json"))
}

/// Working directory for transient generated artifacts.
///
/// Created lazily, shared across runs. Artifacts are deleted after a
/// successful upload and otherwise left behind for diagnosis.
pub fn work_dir() -> Result<PathBuf> {
    let dir = fabhand()?.join("work");
    io::ensure_dir(&dir, "create work dir")?;
    Ok(dir)
}
