//! File I/O primitives with consistent error handling.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

fn io_err(err: std::io::Error, operation: &str) -> Error {
    Error::internal_io(err.to_string(), Some(operation.to_string()))
}

/// Read a file to a string.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_err(e, operation))
}

/// Write a string to a file, truncating any previous content.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| io_err(e, operation))
}

/// Write through a sibling `.tmp` file and rename over the target.
///
/// Used for in-place rewrites (BOM normalization, STEP tagging) so a crash
/// mid-write never leaves a half-transformed artifact behind.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).map_err(|e| io_err(e, &format!("{} (temp write)", operation)))?;
    fs::rename(&tmp, path).map_err(|e| io_err(e, &format!("{} (rename)", operation)))
}

/// Create a directory and all missing parents.
pub fn ensure_dir(path: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| io_err(e, operation))
}

pub fn copy_file(from: &Path, to: &Path, operation: &str) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| io_err(e, operation))
}

pub fn remove_file(path: &Path, operation: &str) -> Result<()> {
    fs::remove_file(path).map_err(|e| io_err(e, operation))
}

pub fn remove_dir_all(path: &Path, operation: &str) -> Result<()> {
    fs::remove_dir_all(path).map_err(|e| io_err(e, operation))
}

/// True when the path names an existing file with at least one byte.
pub fn non_empty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_file_round_trips_written_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        write_file(&path, "{\"ok\":true}", "seed").unwrap();
        assert_eq!(read_file(&path, "test read").unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn read_file_returns_error_for_missing_file() {
        let err = read_file(Path::new("/nonexistent/brd.kicad_pcb"), "test read").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io");
    }

    #[test]
    fn write_file_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.csv");
        write_file(&path, "old", "seed").unwrap();

        write_file_atomic(&path, "new", "test write").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("bom.csv.tmp").exists());
    }

    #[test]
    fn non_empty_file_rejects_missing_empty_and_dirs() {
        let dir = TempDir::new().unwrap();
        assert!(!non_empty_file(&dir.path().join("missing.step")));
        assert!(!non_empty_file(dir.path()));

        let empty = dir.path().join("empty.step");
        write_file(&empty, "", "seed").unwrap();
        assert!(!non_empty_file(&empty));

        let full = dir.path().join("full.step");
        write_file(&full, "ISO-10303-21;", "seed").unwrap();
        assert!(non_empty_file(&full));
    }
}
