//! Input file discovery for one design: the board layout plus the schematic
//! expected beside it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

pub const LAYOUT_EXTENSION: &str = "kicad_pcb";
pub const SCHEMATIC_EXTENSION: &str = "kicad_sch";

/// Resolved source files for a run. The layout is required; the schematic is
/// looked up next to it and may be absent, in which case schematic-derived
/// artifacts fail individually instead of blocking the run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFiles {
    pub layout: PathBuf,
    pub schematic: Option<PathBuf>,
}

impl DesignFiles {
    /// Validate the layout path and probe for `<stem>.kicad_sch` beside it.
    pub fn discover(layout: impl AsRef<Path>) -> Result<Self> {
        let layout = layout.as_ref();

        if !layout.is_file() {
            return Err(Error::validation_invalid_argument(
                "layout",
                format!("no such file: {}", layout.display()),
            ));
        }
        if layout.extension().and_then(|e| e.to_str()) != Some(LAYOUT_EXTENSION) {
            return Err(Error::validation_invalid_argument(
                "layout",
                format!("expected a .{} file: {}", LAYOUT_EXTENSION, layout.display()),
            ));
        }

        let schematic = layout.with_extension(SCHEMATIC_EXTENSION);
        let schematic = schematic.is_file().then_some(schematic);

        Ok(Self {
            layout: layout.to_path_buf(),
            schematic,
        })
    }

    /// Replace the discovered schematic with an explicitly named one.
    pub fn with_schematic(mut self, schematic: impl AsRef<Path>) -> Result<Self> {
        let schematic = schematic.as_ref();

        if !schematic.is_file() {
            return Err(Error::validation_invalid_argument(
                "schematic",
                format!("no such file: {}", schematic.display()),
            ));
        }
        if schematic.extension().and_then(|e| e.to_str()) != Some(SCHEMATIC_EXTENSION) {
            return Err(Error::validation_invalid_argument(
                "schematic",
                format!(
                    "expected a .{} file: {}",
                    SCHEMATIC_EXTENSION,
                    schematic.display()
                ),
            ));
        }

        self.schematic = Some(schematic.to_path_buf());
        Ok(self)
    }

    /// Directory holding the layout file. Durable artifact copies land here.
    pub fn project_dir(&self) -> &Path {
        self.layout.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Schematic path or a per-artifact error for schematic-derived outputs.
    pub fn require_schematic(&self) -> Result<&Path> {
        self.schematic.as_deref().ok_or_else(|| {
            Error::validation_invalid_argument(
                "schematic",
                format!(
                    "no {} found beside {}",
                    SCHEMATIC_EXTENSION,
                    self.layout.display()
                ),
            )
            .with_hint("Schematic-derived artifacts need <layout stem>.kicad_sch in the same directory")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discovers_schematic_beside_layout() {
        let dir = TempDir::new().unwrap();
        let layout = dir.path().join("board.kicad_pcb");
        let schematic = dir.path().join("board.kicad_sch");
        std::fs::write(&layout, "pcb").unwrap();
        std::fs::write(&schematic, "sch").unwrap();

        let files = DesignFiles::discover(&layout).unwrap();
        assert_eq!(files.schematic.as_deref(), Some(schematic.as_path()));
        assert_eq!(files.project_dir(), dir.path());
    }

    #[test]
    fn missing_schematic_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let layout = dir.path().join("board.kicad_pcb");
        std::fs::write(&layout, "pcb").unwrap();

        let files = DesignFiles::discover(&layout).unwrap();
        assert!(files.schematic.is_none());
        assert!(files.require_schematic().is_err());
    }

    #[test]
    fn explicit_schematic_overrides_discovery() {
        let dir = TempDir::new().unwrap();
        let layout = dir.path().join("board.kicad_pcb");
        let elsewhere = dir.path().join("shared.kicad_sch");
        std::fs::write(&layout, "pcb").unwrap();
        std::fs::write(&elsewhere, "sch").unwrap();

        let files = DesignFiles::discover(&layout)
            .unwrap()
            .with_schematic(&elsewhere)
            .unwrap();
        assert_eq!(files.schematic.as_deref(), Some(elsewhere.as_path()));
    }

    #[test]
    fn explicit_schematic_must_exist() {
        let dir = TempDir::new().unwrap();
        let layout = dir.path().join("board.kicad_pcb");
        std::fs::write(&layout, "pcb").unwrap();

        let files = DesignFiles::discover(&layout).unwrap();
        assert!(files.with_schematic("/nonexistent/shared.kicad_sch").is_err());
    }

    #[test]
    fn rejects_missing_layout() {
        let err = DesignFiles::discover("/nonexistent/board.kicad_pcb").unwrap_err();
        assert!(err.message.contains("Invalid argument"));
    }

    #[test]
    fn rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.kicad_sch");
        std::fs::write(&path, "sch").unwrap();
        assert!(DesignFiles::discover(&path).is_err());
    }
}
