//! Zip packaging for artifact bundles.
//!
//! Archives carry file entries only, named relative to the bundle root with
//! forward slashes, so they unpack the same way everywhere.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

fn package_error(dest: &Path, detail: impl ToString) -> Error {
    Error::package_failed(dest.display().to_string(), detail.to_string())
}

/// Zip the given files flat into `dest`, entries named by file name.
pub fn zip_files(dest: &Path, files: &[PathBuf]) -> Result<()> {
    let out = File::create(dest).map_err(|e| package_error(dest, e))?;
    let mut zip = ZipWriter::new(out);
    let options = FileOptions::default();

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| package_error(dest, format!("unusable file name: {}", path.display())))?;
        append_file(&mut zip, path, name, options).map_err(|e| package_error(dest, e))?;
    }

    zip.finish().map_err(|e| package_error(dest, e))?;
    Ok(())
}

/// Zip a directory tree into `dest`, entry paths relative to `root`.
pub fn zip_dir(dest: &Path, root: &Path) -> Result<()> {
    let mut files = Vec::new();
    collect_files(root, &mut files).map_err(|e| package_error(dest, e))?;

    if files.is_empty() {
        return Err(package_error(dest, format!("nothing to pack under {}", root.display())));
    }

    let out = File::create(dest).map_err(|e| package_error(dest, e))?;
    let mut zip = ZipWriter::new(out);
    let options = FileOptions::default();

    for path in files {
        let name = relative_name(root, &path)
            .ok_or_else(|| package_error(dest, format!("file escaped the root: {}", path.display())))?;
        append_file(&mut zip, &path, &name, options).map_err(|e| package_error(dest, e))?;
    }

    zip.finish().map_err(|e| package_error(dest, e))?;
    Ok(())
}

fn append_file(
    zip: &mut ZipWriter<File>,
    path: &Path,
    name: &str,
    options: FileOptions,
) -> std::result::Result<(), String> {
    zip.start_file(name, options).map_err(|e| e.to_string())?;

    let mut src = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut buffer = Vec::new();
    src.read_to_end(&mut buffer)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    zip.write_all(&buffer).map_err(|e| e.to_string())?;
    Ok(())
}

/// Depth-first walk in sorted order, files only.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::result::Result<(), String> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| format!("{}: {}", dir.display(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn zips_a_tree_with_relative_entry_names() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("bundle");
        std::fs::create_dir_all(root.join("gerbers")).unwrap();
        std::fs::write(root.join("bom.csv"), "a,b").unwrap();
        std::fs::write(root.join("gerbers/F_Cu.gbr"), "gerber").unwrap();

        let dest = dir.path().join("bundle.zip");
        zip_dir(&dest, &root).unwrap();

        assert_eq!(entry_names(&dest), vec!["bom.csv", "gerbers/F_Cu.gbr"]);
    }

    #[test]
    fn empty_tree_is_an_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("empty");
        std::fs::create_dir_all(&root).unwrap();

        let err = zip_dir(&dir.path().join("out.zip"), &root).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::PackageFailed);
    }

    #[test]
    fn flat_zip_uses_file_names() {
        let dir = TempDir::new().unwrap();
        let front = dir.path().join("front.pos");
        let back = dir.path().join("back.pos");
        std::fs::write(&front, "front").unwrap();
        std::fs::write(&back, "back").unwrap();

        let dest = dir.path().join("position_files.zip");
        zip_files(&dest, &[front, back]).unwrap();

        assert_eq!(entry_names(&dest), vec!["back.pos", "front.pos"]);
    }

    #[test]
    fn archive_round_trips_content() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tree");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("data.txt"), "payload").unwrap();

        let dest = dir.path().join("tree.zip");
        zip_dir(&dest, &root).unwrap();

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut entry = archive.by_name("data.txt").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "payload");
    }
}
