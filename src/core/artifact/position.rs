//! Component placement exports, front and back.

use std::path::{Path, PathBuf};

use super::{path_arg, wrote, ArtifactKind, GenerateContext, GeneratedArtifact, EXPORT_TIMEOUT};
use crate::core::chain::{self, CommandVariant};
use crate::core::package;
use crate::error::Result;
use crate::utils::io;

fn export_side(ctx: &GenerateContext<'_>, side: &str, output: &Path) -> Result<()> {
    let variant = CommandVariant::new(
        side,
        vec![
            "pcb".to_string(),
            "export".to_string(),
            "pos".to_string(),
            "--output".to_string(),
            path_arg(output),
            "--side".to_string(),
            side.to_string(),
            "--use-drill-file-origin".to_string(),
            "--exclude-dnp".to_string(),
            "--smd-only".to_string(),
            "--units".to_string(),
            "mm".to_string(),
            path_arg(&ctx.files.layout),
        ],
        EXPORT_TIMEOUT,
    );

    chain::run("position", ctx.program, &[variant], |invocation| {
        wrote(invocation, output)
    })?;
    Ok(())
}

fn export_side_csv(ctx: &GenerateContext<'_>, side: &str, output: &Path) -> Result<()> {
    let variant = CommandVariant::new(
        side,
        vec![
            "pcb".to_string(),
            "export".to_string(),
            "pos".to_string(),
            "--output".to_string(),
            path_arg(output),
            "--format".to_string(),
            "csv".to_string(),
            "--side".to_string(),
            side.to_string(),
            path_arg(&ctx.files.layout),
        ],
        EXPORT_TIMEOUT,
    );

    chain::run("position csv", ctx.program, &[variant], |invocation| {
        wrote(invocation, output)
    })?;
    Ok(())
}

/// CSV pair for the production tree: `position_front.csv`, `position_back.csv`.
pub(super) fn export_csv_pair(ctx: &GenerateContext<'_>, dir: &Path) -> Result<()> {
    export_side_csv(ctx, "front", &dir.join("position_front.csv"))?;
    export_side_csv(ctx, "back", &dir.join("position_back.csv"))
}

/// Both `.pos` sides zipped into `position_files.zip`, originals removed.
pub(super) fn generate(ctx: &GenerateContext<'_>) -> Result<GeneratedArtifact> {
    let front = ctx.work_dir.join("position_front.pos");
    let back = ctx.work_dir.join("position_back.pos");

    export_side(ctx, "front", &front)?;
    export_side(ctx, "back", &back)?;

    let archive: PathBuf = ctx.work_dir.join("position_files.zip");
    package::zip_files(&archive, &[front.clone(), back.clone()])?;
    io::remove_file(&front, "clean position front")?;
    io::remove_file(&back, "clean position back")?;

    Ok(GeneratedArtifact {
        kind: ArtifactKind::Position,
        path: archive,
        display_name: format!("{}_position", ctx.identity.base_name()),
        gerber_bundle: false,
    })
}
