//! Gerber and drill exports.
//!
//! Layers are exported one chain call each; a failed layer is logged and
//! skipped without failing the batch. Drill success is judged purely on the
//! plated and non-plated output files existing, whatever the exporter's
//! exit code claims.

use std::fs;
use std::path::{Path, PathBuf};

use super::{fresh_dir, path_arg, wrote, ArtifactKind, GenerateContext, GeneratedArtifact, EXPORT_TIMEOUT};
use crate::core::chain::{self, CommandVariant};
use crate::core::package;
use crate::error::Result;
use crate::log_status;
use crate::utils::io;

const LAYERS: [&str; 11] = [
    "F.Cu", "B.Cu",
    "F.SilkS", "B.SilkS",
    "F.Mask", "B.Mask",
    "F.Paste", "B.Paste",
    "Edge.Cuts",
    "F.Fab", "B.Fab",
];

/// Export every board layer into `dir` as `<layer>.gbr`.
pub(super) fn export_layers(ctx: &GenerateContext<'_>, dir: &Path) -> Result<()> {
    for layer in LAYERS {
        let output = dir.join(format!("{}.gbr", layer));
        let variant = CommandVariant::new(
            layer,
            vec![
                "pcb".to_string(),
                "export".to_string(),
                "gerbers".to_string(),
                "--output".to_string(),
                path_arg(&output),
                "--layers".to_string(),
                layer.to_string(),
                path_arg(&ctx.files.layout),
            ],
            EXPORT_TIMEOUT,
        );

        let result = chain::run("gerber layer", ctx.program, &[variant], |invocation| {
            wrote(invocation, &output)
        });
        if result.is_err() {
            log_status!("gerber", "Layer {} failed, continuing", layer);
        }
    }
    Ok(())
}

/// Export plated and non-plated drill files into `dir`.
pub(super) fn export_drill(ctx: &GenerateContext<'_>, dir: &Path) -> Result<()> {
    let variant = CommandVariant::new(
        "excellon separate-th",
        vec![
            "pcb".to_string(),
            "export".to_string(),
            "drill".to_string(),
            "--output".to_string(),
            path_arg(dir),
            "--format".to_string(),
            "excellon".to_string(),
            "--excellon-separate-th".to_string(),
            path_arg(&ctx.files.layout),
        ],
        EXPORT_TIMEOUT,
    );

    chain::run("drill", ctx.program, &[variant], |_| {
        drill_outputs_present(dir)
    })?;
    Ok(())
}

/// Both a plated (`*PTH*.drl`) and a non-plated (`*NPTH*.drl`) file exist.
fn drill_outputs_present(dir: &Path) -> bool {
    let names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => return false,
    };

    // "NPTH" contains "PTH", so the plated match must rule it out.
    let plated = names
        .iter()
        .any(|n| n.ends_with(".drl") && n.contains("PTH") && !n.contains("NPTH"));
    let non_plated = names
        .iter()
        .any(|n| n.ends_with(".drl") && n.contains("NPTH"));
    plated && non_plated
}

/// Full gerber+drill bundle: export into `<stem>_Gerber/`, zip it, drop the
/// directory.
pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let stem = ctx
        .files
        .layout
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "board".to_string());

    let bundle_dir = ctx.work_dir.join(format!("{}_Gerber", stem));
    fresh_dir(&bundle_dir, "prepare gerber dir")?;

    export_layers(ctx, &bundle_dir)?;
    export_drill(ctx, &bundle_dir)?;

    let archive: PathBuf = ctx.work_dir.join(format!("{}_Gerber.zip", stem));
    package::zip_dir(&archive, &bundle_dir)?;
    io::remove_dir_all(&bundle_dir, "clean gerber dir")?;

    Ok(GeneratedArtifact {
        kind: ArtifactKind::GerberDrill,
        path: archive,
        display_name: format!("{}_gerber", ctx.identity.base_name()),
        gerber_bundle: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn drill_check_needs_both_hole_classes() {
        let dir = TempDir::new().unwrap();
        assert!(!drill_outputs_present(dir.path()));

        touch(dir.path(), "board-NPTH.drl");
        assert!(!drill_outputs_present(dir.path()));

        touch(dir.path(), "board-PTH.drl");
        assert!(drill_outputs_present(dir.path()));
    }

    #[test]
    fn drill_check_ignores_non_drill_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "board-PTH.txt");
        touch(dir.path(), "board-NPTH.gbr");
        assert!(!drill_outputs_present(dir.path()));
    }

    #[test]
    fn drill_check_fails_for_missing_directory() {
        assert!(!drill_outputs_present(Path::new("/nonexistent/drill")));
    }

    #[test]
    fn layer_set_covers_both_sides_and_the_outline() {
        assert!(LAYERS.contains(&"F.Cu"));
        assert!(LAYERS.contains(&"B.Cu"));
        assert!(LAYERS.contains(&"Edge.Cuts"));
        assert_eq!(LAYERS.len(), 11);
    }
}
